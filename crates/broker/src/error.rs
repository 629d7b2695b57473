use std::error::Error as StdError;
use std::fmt::{self, Debug};

use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A hostname or service name cannot be used in a qualified node name.
    #[error("malformed node identity '{0}'")]
    MalformedIdentity(String),
}

/// Marker trait for `BrokerAdmin` errors
pub trait BrokerAdminError: Debug + StdError + Send + Sync {
    /// Returns the kind of this error
    fn kind(&self) -> BrokerAdminErrorKind;
}

/// The kind of broker admin error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BrokerAdminErrorKind {
    /// The command ran and reported failure
    CommandFailed,

    /// The admin tool could not be run at all
    Unavailable,

    /// The command did not finish in time
    Timeout,

    /// The command's output could not be understood
    Output,

    /// Other/unknown error
    Other,
}

impl fmt::Display for BrokerAdminErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
