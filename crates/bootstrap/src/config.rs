use std::path::PathBuf;
use std::time::Duration;

use warren_broker::DEFAULT_SERVICE_NAME;
use warren_fleet::FleetRole;

/// Attempts made by the readiness gate before giving up.
pub const DEFAULT_READINESS_ATTEMPTS: u32 = 30;

/// Pause between readiness attempts.
pub const DEFAULT_READINESS_INTERVAL: Duration = Duration::from_secs(2);

/// Where the broker reads its shared cluster secret from.
pub const DEFAULT_COOKIE_PATH: &str = "/var/lib/rabbitmq/.erlang.cookie";

/// Plugin enabled on every node.
pub const DEFAULT_PLUGIN: &str = "rabbitmq_management";

/// Per-node bootstrap configuration.
#[derive(Clone, Debug)]
pub struct BootstrapConfig {
    /// File holding the broker's shared cluster secret.
    pub cookie_path: PathBuf,

    /// This node's hostname, as listed by the fleet registry.
    pub hostname: String,

    /// Broker plugins that must be enabled.
    pub plugins: Vec<String>,

    /// Readiness attempts before `TimedOut`.
    pub readiness_attempts: u32,

    /// Pause between failed readiness attempts.
    pub readiness_interval: Duration,

    /// Region whose secrets are used.
    pub region: String,

    /// Fleet role whose members form the broker cluster.
    pub role: FleetRole,

    /// Service prefix of broker node names.
    pub service_name: String,
}

impl BootstrapConfig {
    /// Configuration for `hostname` in `region`, with defaults for everything
    /// else.
    pub fn new(hostname: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            cookie_path: PathBuf::from(DEFAULT_COOKIE_PATH),
            hostname: hostname.into(),
            plugins: vec![DEFAULT_PLUGIN.to_string()],
            readiness_attempts: DEFAULT_READINESS_ATTEMPTS,
            readiness_interval: DEFAULT_READINESS_INTERVAL,
            region: region.into(),
            role: FleetRole::Headnode,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}
