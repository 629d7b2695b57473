//! Broker admin interface backed by the `rabbitmqctl` and `rabbitmq-plugins`
//! command-line tools.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod output;

pub use error::Error;

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};
use warren_broker::{BrokerAdmin, ClusterView, Policy, QualifiedIdentity};

/// Default upper bound on a single admin command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Options for configuring `RabbitmqCtl`.
#[derive(Clone, Debug)]
pub struct RabbitmqCtlOptions {
    /// Per-command timeout.
    pub command_timeout: Duration,

    /// Path to `rabbitmqctl`. Looked up on `PATH` if `None`.
    pub ctl_path: Option<PathBuf>,

    /// Path to `rabbitmq-plugins`. Looked up on `PATH` if `None`.
    pub plugins_path: Option<PathBuf>,
}

impl Default for RabbitmqCtlOptions {
    fn default() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            ctl_path: None,
            plugins_path: None,
        }
    }
}

/// Drives the local broker node through its command-line admin tools.
#[derive(Clone, Debug)]
pub struct RabbitmqCtl {
    command_timeout: Duration,
    ctl_path: PathBuf,
    plugins_path: PathBuf,
}

impl RabbitmqCtl {
    /// Creates a new `RabbitmqCtl` with the specified options.
    ///
    /// # Errors
    ///
    /// Returns `Error::BinaryNotFound` if a tool path is not given and cannot
    /// be found on `PATH`.
    pub fn new(
        RabbitmqCtlOptions {
            command_timeout,
            ctl_path,
            plugins_path,
        }: RabbitmqCtlOptions,
    ) -> Result<Self, Error> {
        let ctl_path = match ctl_path {
            Some(path) => path,
            None => which::which("rabbitmqctl").map_err(|_| Error::BinaryNotFound("rabbitmqctl"))?,
        };

        let plugins_path = match plugins_path {
            Some(path) => path,
            None => which::which("rabbitmq-plugins")
                .map_err(|_| Error::BinaryNotFound("rabbitmq-plugins"))?,
        };

        Ok(Self {
            command_timeout,
            ctl_path,
            plugins_path,
        })
    }

    /// Path of the `rabbitmqctl` executable in use.
    #[must_use]
    pub fn ctl_path(&self) -> &Path {
        &self.ctl_path
    }

    async fn ctl(&self, command: &str, args: &[&str]) -> Result<Output, Error> {
        self.run(&self.ctl_path, command, args).await
    }

    async fn plugins(&self, command: &str, args: &[&str]) -> Result<Output, Error> {
        self.run(&self.plugins_path, command, args).await
    }

    /// Run one admin command. Only `command` is logged; `args` may hold secrets.
    async fn run(&self, program: &Path, command: &str, args: &[&str]) -> Result<Output, Error> {
        debug!("running {} {}", program.display(), command);

        let child = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.command_timeout, child)
            .await
            .map_err(|_| Error::Timeout {
                command: command.to_string(),
                timeout: self.command_timeout,
            })?
            .map_err(|source| Error::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
            warn!(target: "rabbitmqctl", "{}", line);
        }

        if !output.status.success() {
            return Err(Error::NonZeroExitCode {
                command: command.to_string(),
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output)
    }

    async fn run_and_relay(&self, command: &str, args: &[&str]) -> Result<(), Error> {
        let output = self.ctl(command, args).await?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(target: "rabbitmqctl", "{}", line);
        }

        Ok(())
    }
}

#[async_trait]
impl BrokerAdmin for RabbitmqCtl {
    type Error = Error;

    async fn node_health_check(&self, node: &QualifiedIdentity) -> Result<bool, Self::Error> {
        let node = node.to_string();

        match self
            .ctl("node_health_check", &["-n", &node, "node_health_check"])
            .await
        {
            Ok(_) => Ok(true),
            Err(e @ (Error::NonZeroExitCode { .. } | Error::Timeout { .. })) => {
                debug!("health check of {} failed: {}", node, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn cluster_status(&self, node: &QualifiedIdentity) -> Result<ClusterView, Self::Error> {
        let node = node.to_string();

        let output = self
            .ctl(
                "cluster_status",
                &["-n", &node, "cluster_status", "--formatter", "json"],
            )
            .await?;

        output::parse_cluster_status(&output.stdout)
    }

    async fn stop_app(&self) -> Result<(), Self::Error> {
        self.run_and_relay("stop_app", &["stop_app"]).await
    }

    async fn reset(&self) -> Result<(), Self::Error> {
        self.run_and_relay("reset", &["reset"]).await
    }

    async fn join_cluster(&self, seed: &QualifiedIdentity) -> Result<(), Self::Error> {
        let seed = seed.to_string();

        self.run_and_relay("join_cluster", &["join_cluster", &seed])
            .await
    }

    async fn start_app(&self) -> Result<(), Self::Error> {
        self.run_and_relay("start_app", &["start_app"]).await
    }

    async fn list_users(&self) -> Result<(), Self::Error> {
        self.ctl("list_users", &["list_users"]).await.map(|_| ())
    }

    async fn change_password(&self, username: &str, password: &str) -> Result<(), Self::Error> {
        self.ctl("change_password", &["change_password", username, password])
            .await?;

        info!("password set for user {}", username);

        Ok(())
    }

    async fn set_policy(&self, policy: &Policy) -> Result<(), Self::Error> {
        let definition = serde_json::to_string(&policy.definition).map_err(Error::EncodePolicy)?;

        self.run_and_relay(
            "set_policy",
            &["set_policy", &policy.name, &policy.pattern, &definition],
        )
        .await?;

        info!("policy {} set to {}", policy.name, definition);

        Ok(())
    }

    async fn list_enabled_plugins(&self) -> Result<Vec<String>, Self::Error> {
        let output = self.plugins("list", &["list", "-m", "-e"]).await?;

        Ok(output::parse_enabled_plugins(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn enable_plugin(&self, plugin: &str) -> Result<(), Self::Error> {
        let output = self.plugins("enable", &["enable", plugin]).await?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(target: "rabbitmq-plugins", "{}", line);
        }

        info!("enabled plugin {}", plugin);

        Ok(())
    }
}
