//! Error types for the mock fleet registry.

use thiserror::Error;
use warren_fleet::{FleetRegistryError, FleetRegistryErrorKind};

/// Error type for the mock fleet registry.
#[derive(Debug, Error)]
pub enum Error {
    /// Error when loading or parsing the fleet file.
    #[error("Fleet file error: {0}")]
    FleetFile(String),

    /// The registry was constructed to simulate an outage.
    #[error("Fleet registry unavailable")]
    Unavailable,
}

impl FleetRegistryError for Error {
    fn kind(&self) -> FleetRegistryErrorKind {
        match self {
            Self::FleetFile(_) => FleetRegistryErrorKind::Configuration,
            Self::Unavailable => FleetRegistryErrorKind::Unavailable,
        }
    }
}
