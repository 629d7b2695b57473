use std::error::Error as StdError;
use std::fmt::{self, Debug};
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Refused to overwrite an existing secrets file.
    #[error("{0} exists; will not overwrite without force")]
    AlreadyExists(PathBuf),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// No secrets are stored for the region.
    #[error("no secrets for region '{0}'")]
    MissingRegion(String),

    /// The secrets document could not be parsed.
    #[error("failed to parse secrets file: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The secrets document could not be serialized.
    #[error("failed to serialize secrets: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Marker trait for `SecretStore` errors
pub trait SecretStoreError: Debug + StdError + Send + Sync {
    /// Returns the kind of this error
    fn kind(&self) -> SecretStoreErrorKind;
}

/// The kind of secret store error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SecretStoreErrorKind {
    /// Nothing is stored for the requested region
    NotFound,

    /// The backing storage could not be read or written
    Io,

    /// Stored data is malformed
    Format,

    /// Other/unknown error
    Other,
}

impl fmt::Display for SecretStoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl SecretStoreError for Error {
    fn kind(&self) -> SecretStoreErrorKind {
        match self {
            Self::AlreadyExists(_) => SecretStoreErrorKind::Other,
            Self::Io(..) => SecretStoreErrorKind::Io,
            Self::MissingRegion(_) => SecretStoreErrorKind::NotFound,
            Self::Parse(_) | Self::Serialize(_) => SecretStoreErrorKind::Format,
        }
    }
}
