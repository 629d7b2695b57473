//! Error types for the mock broker admin.

use thiserror::Error;
use warren_broker::{BrokerAdminError, BrokerAdminErrorKind};

use crate::Operation;

/// Error type for the mock broker admin.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation was scripted to fail.
    #[error("{0} failed")]
    CommandFailed(Operation),

    /// The mock was scripted to behave as if the admin tool were missing.
    #[error("admin tool unavailable")]
    Unavailable,
}

impl BrokerAdminError for Error {
    fn kind(&self) -> BrokerAdminErrorKind {
        match self {
            Self::CommandFailed(_) => BrokerAdminErrorKind::CommandFailed,
            Self::Unavailable => BrokerAdminErrorKind::Unavailable,
        }
    }
}
