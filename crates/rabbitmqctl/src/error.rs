use std::time::Duration;

use thiserror::Error;
use warren_broker::{BrokerAdminError, BrokerAdminErrorKind};

/// Errors that can occur when driving the broker's admin tools.
#[derive(Debug, Error)]
pub enum Error {
    /// The admin tool could not be found on `PATH`.
    #[error("{0} binary not found")]
    BinaryNotFound(&'static str),

    /// The policy definition could not be encoded.
    #[error("failed to encode policy definition: {0}")]
    EncodePolicy(serde_json::Error),

    /// The command exited unsuccessfully.
    #[error("{command} exited with {status}: {stderr}")]
    NonZeroExitCode {
        /// Subcommand that failed.
        command: String,
        /// Exit status.
        status: std::process::ExitStatus,
        /// Trimmed standard error.
        stderr: String,
    },

    /// `cluster_status` output was not the expected JSON document.
    #[error("failed to parse cluster_status output: {0}")]
    OutputParse(serde_json::Error),

    /// The admin tool could not be spawned.
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        /// Subcommand being run.
        command: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The command did not finish within the configured timeout.
    #[error("{command} timed out after {timeout:?}")]
    Timeout {
        /// Subcommand that timed out.
        command: String,
        /// Configured per-command timeout.
        timeout: Duration,
    },
}

impl BrokerAdminError for Error {
    fn kind(&self) -> BrokerAdminErrorKind {
        match self {
            Self::BinaryNotFound(_) | Self::Spawn { .. } => BrokerAdminErrorKind::Unavailable,
            Self::EncodePolicy(_) => BrokerAdminErrorKind::Other,
            Self::NonZeroExitCode { .. } => BrokerAdminErrorKind::CommandFailed,
            Self::OutputParse(_) => BrokerAdminErrorKind::Output,
            Self::Timeout { .. } => BrokerAdminErrorKind::Timeout,
        }
    }
}
