//! Bootstraps a broker node into its fleet's broker cluster: installs the
//! cluster secret, enables plugins, joins a healthy peer's cluster unless
//! this is the initial node, waits for the broker to answer, then sets
//! credentials and the HA policy.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod cluster_secret;
mod config;
mod credentials;
mod error;
mod health;
mod join;
mod plugins;
mod policy;
mod readiness;
mod selector;

pub use cluster_secret::{ClusterSecretInstaller, SecretInstall};
pub use config::{
    BootstrapConfig, DEFAULT_COOKIE_PATH, DEFAULT_PLUGIN, DEFAULT_READINESS_ATTEMPTS,
    DEFAULT_READINESS_INTERVAL,
};
pub use credentials::CredentialRotator;
pub use error::Error;
pub use health::{Health, HealthProbe};
pub use join::{ClusterJoinOrchestrator, JoinFailure, JoinOutcome, JoinState, JoinStep};
pub use plugins::PluginEnabler;
pub use policy::{apply_policy, select_policy};
pub use readiness::{Readiness, ReadinessWaiter};
pub use selector::PeerSelector;

use std::fmt::{self, Debug};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use warren_broker::{BrokerAdmin, NodeNaming, Policy};
use warren_fleet::{FleetRegistry, PeerDirectory, PeerIdentity};
use warren_secrets::{SecretStore, SecretStoreError};

/// Options for creating a `Bootstrapper`.
pub struct BootstrapperOptions<R, A, S> {
    /// Admin interface to the local broker.
    pub admin: Arc<A>,

    /// Node configuration.
    pub config: BootstrapConfig,

    /// Fleet membership source.
    pub registry: Arc<R>,

    /// Source of credentials and the cluster secret.
    pub secret_store: Arc<S>,
}

/// What a bootstrap run did.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BootstrapReport {
    /// Whether the cookie file changed.
    pub cluster_secret: SecretInstall,

    /// Fleet size the policy was computed from.
    pub fleet_size: usize,

    /// Join outcome; `None` on the initial node.
    pub join: Option<JoinOutcome>,

    /// Plugins newly enabled by this run.
    pub plugins_enabled: Vec<String>,

    /// Policy applied.
    pub policy: Policy,

    /// Readiness gate result.
    pub readiness: Readiness,

    /// The broker still runs with the previous cluster secret and must be
    /// restarted before it can authenticate with its peers.
    pub restart_required: bool,
}

/// Runs the per-node bootstrap sequence.
pub struct Bootstrapper<R, A, S>
where
    R: FleetRegistry,
    A: BrokerAdmin,
    S: SecretStore,
{
    admin: Arc<A>,
    config: BootstrapConfig,
    directory: PeerDirectory<R>,
    naming: NodeNaming,
    secret_store: Arc<S>,
}

impl<R, A, S> Bootstrapper<R, A, S>
where
    R: FleetRegistry,
    A: BrokerAdmin,
    S: SecretStore,
{
    /// Creates a new `Bootstrapper`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedIdentity` if the configured service name cannot
    /// be used in node names.
    pub fn new(
        BootstrapperOptions {
            admin,
            config,
            registry,
            secret_store,
        }: BootstrapperOptions<R, A, S>,
    ) -> Result<Self, Error> {
        let naming = NodeNaming::new(config.service_name.clone())?;
        let directory = PeerDirectory::new(registry, config.role);

        Ok(Self {
            admin,
            config,
            directory,
            naming,
            secret_store,
        })
    }

    /// Run the whole sequence. The first failure aborts the remaining steps.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub async fn run(&self) -> Result<BootstrapReport, Error> {
        info!(
            "bootstrapping {} in region {}",
            self.config.hostname, self.config.region
        );

        let secrets = self
            .secret_store
            .get_config(&self.config.region)
            .await
            .map_err(|e| Error::Secrets {
                kind: e.kind(),
                message: e.to_string(),
            })?;

        let cluster_secret = ClusterSecretInstaller::new(&self.config.cookie_path)
            .install(&secrets.cluster_secret)
            .await?;
        let restart_required = cluster_secret == SecretInstall::Written;
        if restart_required {
            warn!("cluster secret changed; the broker must be restarted to use it");
        }

        let plugins_enabled = PluginEnabler::new(self.admin.clone())
            .ensure_enabled(&self.config.plugins)
            .await?;

        let join = if self.directory.is_initial_node().await? {
            info!("{} is the initial node; not joining", self.config.hostname);
            None
        } else {
            Some(self.join(restart_required).await?)
        };

        let readiness = self.wait_ready().await?;

        CredentialRotator::new(self.admin.clone())
            .set_password(&secrets.username, &secrets.password)
            .await?;

        let fleet_size = self.directory.fleet_size().await?;
        let policy = apply_policy(self.admin.as_ref(), fleet_size).await?;

        info!("bootstrap of {} complete", self.config.hostname);

        Ok(BootstrapReport {
            cluster_secret,
            fleet_size,
            join,
            plugins_enabled,
            policy,
            readiness,
            restart_required,
        })
    }

    async fn join(&self, restart_required: bool) -> Result<JoinOutcome, Error> {
        let self_id = PeerIdentity::new(&self.config.hostname);
        let peers = self.directory.list_peers(&self_id).await?;

        let selector = PeerSelector::new(HealthProbe::new(self.admin.clone(), self.naming.clone()));
        let orchestrator = ClusterJoinOrchestrator::new(
            self.admin.clone(),
            self.naming.clone(),
            selector,
            self_id,
        );

        match orchestrator.join(&peers).await? {
            JoinOutcome::NoHealthySeed => Err(Error::NoHealthySeed {
                candidates: peers.len(),
            }),
            JoinOutcome::JoinFailed(mut failure) => {
                if restart_required {
                    failure.message.push_str(
                        " (cluster secret was just installed; restart the broker before retrying)",
                    );
                }
                Err(Error::JoinFailed(failure))
            }
            outcome => Ok(outcome),
        }
    }

    async fn wait_ready(&self) -> Result<Readiness, Error> {
        let waiter =
            ReadinessWaiter::new(self.config.readiness_attempts, self.config.readiness_interval);

        match waiter.wait_ready(|| self.admin.list_users()).await {
            Readiness::TimedOut { attempts } => Err(Error::TimedOut { attempts }),
            ready => Ok(ready),
        }
    }
}

impl<R, A, S> Debug for Bootstrapper<R, A, S>
where
    R: FleetRegistry,
    A: BrokerAdmin,
    S: SecretStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("config", &self.config)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
