use thiserror::Error;
use warren_broker::BrokerAdminErrorKind;
use warren_secrets::SecretStoreErrorKind;

use crate::JoinFailure;

/// Errors that can occur while bootstrapping a node.
#[derive(Debug, Error)]
pub enum Error {
    /// The fleet registry could not be queried.
    #[error(transparent)]
    Discovery(#[from] warren_fleet::Error),

    /// No candidate peer passed its health check.
    #[error("no healthy seed among {candidates} candidate peers")]
    NoHealthySeed {
        /// Number of peers probed.
        candidates: usize,
    },

    /// The join sequence failed part-way.
    #[error("cluster join failed: {0}")]
    JoinFailed(JoinFailure),

    /// The local broker never became responsive.
    #[error("broker not ready after {attempts} attempts")]
    TimedOut {
        /// Attempts made.
        attempts: u32,
    },

    /// The HA policy could not be applied.
    #[error("failed to apply policy ({kind}): {message}")]
    PolicyApplyFailed {
        /// Kind of admin failure.
        kind: BrokerAdminErrorKind,
        /// Admin error message.
        message: String,
    },

    /// The administrative password could not be set.
    #[error("failed to set password ({kind}): {message}")]
    CredentialSetFailed {
        /// Kind of admin failure.
        kind: BrokerAdminErrorKind,
        /// Admin error message.
        message: String,
    },

    /// A health check could not be attempted.
    #[error("health probe unusable ({kind}): {message}")]
    HealthProbe {
        /// Kind of admin failure.
        kind: BrokerAdminErrorKind,
        /// Admin error message.
        message: String,
    },

    /// A hostname or service name cannot form a broker node name.
    #[error(transparent)]
    MalformedIdentity(#[from] warren_broker::Error),

    /// Secrets could not be fetched.
    #[error("failed to fetch secrets ({kind}): {message}")]
    Secrets {
        /// Kind of store failure.
        kind: SecretStoreErrorKind,
        /// Store error message.
        message: String,
    },

    /// The cluster secret file could not be installed.
    #[error("{0}: {1}")]
    ClusterSecret(&'static str, #[source] std::io::Error),

    /// A plugin could not be listed or enabled.
    #[error("plugin operation failed ({kind}): {message}")]
    Plugin {
        /// Kind of admin failure.
        kind: BrokerAdminErrorKind,
        /// Admin error message.
        message: String,
    },
}
