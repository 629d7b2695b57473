//! Error types for fleet discovery.

use std::error::Error as StdError;
use std::fmt::{self, Debug};

use thiserror::Error;

/// Errors surfaced by the peer directory.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The fleet membership source could not be queried. There is no fallback list.
    #[error("fleet registry unavailable ({kind}): {message}")]
    Discovery {
        /// Classification reported by the registry.
        kind: FleetRegistryErrorKind,

        /// Rendered registry error.
        message: String,
    },
}

impl Error {
    pub(crate) fn discovery<E: FleetRegistryError>(error: &E) -> Self {
        Self::Discovery {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Marker trait for `FleetRegistry` errors
pub trait FleetRegistryError: Debug + StdError + Send + Sync {
    /// Returns the kind of this error
    fn kind(&self) -> FleetRegistryErrorKind;
}

/// The kind of fleet registry error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FleetRegistryErrorKind {
    /// The registry backend could not be reached
    Unavailable,

    /// The registry is reachable but its contents are invalid
    Configuration,

    /// Other/unknown error
    Other,
}

impl fmt::Display for FleetRegistryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
