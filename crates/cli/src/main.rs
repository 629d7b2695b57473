//! CLI binary to bootstrap a broker node into its fleet's cluster.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use warren_bootstrap::{
    BootstrapConfig, Bootstrapper, BootstrapperOptions, DEFAULT_COOKIE_PATH, apply_policy,
    select_policy,
};
use warren_broker::{DEFAULT_SERVICE_NAME, Policy};
use warren_fleet::{FleetRole, PeerDirectory};
use warren_fleet_mock::MockFleetRegistry;
use warren_rabbitmqctl::{RabbitmqCtl, RabbitmqCtlOptions};
use warren_secrets::{BrokerSecrets, FileSecretStore};

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bootstrap error
    #[error(transparent)]
    Bootstrap(#[from] warren_bootstrap::Error),

    /// Fleet discovery error
    #[error(transparent)]
    Discovery(#[from] warren_fleet::Error),

    /// Fleet file error
    #[error("fleet error: {0}")]
    Fleet(#[from] warren_fleet_mock::Error),

    /// Report serialization error
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// Admin tool error
    #[error("admin tool error: {0}")]
    RabbitmqCtl(#[from] warren_rabbitmqctl::Error),

    /// Secrets error
    #[error("secrets error: {0}")]
    Secrets(#[from] warren_secrets::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log at debug level regardless of `RUST_LOG`
    #[arg(long, env = "WARREN_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Bootstrap this node into the fleet's broker cluster
    Bootstrap(BootstrapArgs),

    /// Write a fresh secrets file for a region
    GenerateSecrets(GenerateSecretsArgs),

    /// Show (and optionally apply) the HA policy for the current fleet
    Policy(PolicyArgs),
}

#[derive(Clone, Debug, ClapArgs)]
struct FleetArgs {
    /// Fleet file listing the members of every role
    #[arg(long, env = "WARREN_FLEET_FILE")]
    fleet_file: PathBuf,

    /// This node's hostname as listed in the fleet file
    #[arg(long, env = "WARREN_HOSTNAME")]
    hostname: String,

    /// Fleet role whose members form the broker cluster
    #[arg(long, default_value = "headnode", env = "WARREN_ROLE")]
    role: FleetRole,
}

#[derive(Clone, Debug, ClapArgs)]
struct AdminArgs {
    /// Per-command timeout for the admin tools, in seconds
    #[arg(long, default_value_t = 60, env = "WARREN_COMMAND_TIMEOUT_SECS")]
    command_timeout_secs: u64,

    /// Path to rabbitmqctl (looked up on PATH if unset)
    #[arg(long, env = "WARREN_RABBITMQCTL")]
    rabbitmqctl: Option<PathBuf>,

    /// Path to rabbitmq-plugins (looked up on PATH if unset)
    #[arg(long, env = "WARREN_RABBITMQ_PLUGINS")]
    rabbitmq_plugins: Option<PathBuf>,
}

impl AdminArgs {
    fn rabbitmqctl(&self) -> Result<RabbitmqCtl, Error> {
        Ok(RabbitmqCtl::new(RabbitmqCtlOptions {
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            ctl_path: self.rabbitmqctl.clone(),
            plugins_path: self.rabbitmq_plugins.clone(),
        })?)
    }
}

#[derive(Clone, Debug, ClapArgs)]
struct BootstrapArgs {
    #[command(flatten)]
    admin: AdminArgs,

    /// File the broker reads its cluster secret from
    #[arg(long, default_value = DEFAULT_COOKIE_PATH, env = "WARREN_COOKIE_PATH")]
    cookie_path: PathBuf,

    #[command(flatten)]
    fleet: FleetArgs,

    /// Broker plugins that must be enabled
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "rabbitmq_management",
        env = "WARREN_PLUGINS"
    )]
    plugins: Vec<String>,

    /// Readiness attempts before giving up
    #[arg(long, default_value_t = 30, env = "WARREN_READINESS_ATTEMPTS")]
    readiness_attempts: u32,

    /// Pause between readiness attempts, in seconds
    #[arg(long, default_value_t = 2, env = "WARREN_READINESS_INTERVAL_SECS")]
    readiness_interval_secs: u64,

    /// Region whose secrets are used
    #[arg(long, env = "WARREN_REGION")]
    region: String,

    /// Secrets file
    #[arg(long, env = "WARREN_SECRETS_FILE")]
    secrets_file: PathBuf,

    /// Service prefix of broker node names
    #[arg(long, default_value = DEFAULT_SERVICE_NAME, env = "WARREN_SERVICE_NAME")]
    service_name: String,
}

#[derive(Clone, Debug, ClapArgs)]
struct GenerateSecretsArgs {
    /// Overwrite an existing secrets file
    #[arg(long)]
    force: bool,

    /// Region to generate secrets for
    #[arg(long, env = "WARREN_REGION")]
    region: String,

    /// Secrets file to write
    #[arg(long, env = "WARREN_SECRETS_FILE")]
    secrets_file: PathBuf,
}

#[derive(Clone, Debug, ClapArgs)]
struct PolicyArgs {
    #[command(flatten)]
    admin: AdminArgs,

    /// Register the policy with the local broker instead of only printing it
    #[arg(long)]
    apply: bool,

    #[command(flatten)]
    fleet: FleetArgs,
}

async fn bootstrap(args: BootstrapArgs) -> Result<(), Error> {
    let BootstrapArgs {
        admin,
        cookie_path,
        fleet,
        plugins,
        readiness_attempts,
        readiness_interval_secs,
        region,
        secrets_file,
        service_name,
    } = args;

    let registry = MockFleetRegistry::from_fleet_file(&fleet.fleet_file, fleet.hostname.clone())?;

    let config = BootstrapConfig {
        cookie_path,
        hostname: fleet.hostname,
        plugins,
        readiness_attempts,
        readiness_interval: Duration::from_secs(readiness_interval_secs),
        region,
        role: fleet.role,
        service_name,
    };

    let bootstrapper = Bootstrapper::new(BootstrapperOptions {
        admin: Arc::new(admin.rabbitmqctl()?),
        config,
        registry: Arc::new(registry),
        secret_store: Arc::new(FileSecretStore::new(secrets_file)),
    })?;

    let report = bootstrapper.run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn generate_secrets(args: GenerateSecretsArgs) -> Result<(), Error> {
    let secrets = BrokerSecrets::generate();

    let store = FileSecretStore::create(&args.secrets_file, &args.region, &secrets, args.force)
        .await?;
    info!("secrets for {} written to {}", args.region, store.path().display());

    Ok(())
}

async fn policy(args: PolicyArgs) -> Result<(), Error> {
    let registry = MockFleetRegistry::from_fleet_file(&args.fleet.fleet_file, args.fleet.hostname)?;
    let fleet_size = PeerDirectory::new(Arc::new(registry), args.fleet.role)
        .fleet_size()
        .await?;

    let policy = if args.apply {
        apply_policy(&args.admin.rabbitmqctl()?, fleet_size).await?
    } else {
        Policy::ha(select_policy(fleet_size))
    };

    println!("{}", serde_json::to_string_pretty(&policy)?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match args.command {
        Command::Bootstrap(args) => bootstrap(args).await,
        Command::GenerateSecrets(args) => generate_secrets(args).await,
        Command::Policy(args) => policy(args).await,
    };

    if let Err(e) = &result {
        error!("{}", e);
    }

    result
}
