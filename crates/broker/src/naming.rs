//! Broker node naming.

use std::fmt;

use warren_fleet::PeerIdentity;

use crate::Error;

/// Service prefix used by the broker's node names unless configured otherwise.
pub const DEFAULT_SERVICE_NAME: &str = "rabbit";

/// A broker node name: `<service>@<hostname>`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct QualifiedIdentity {
    hostname: String,
    service: String,
}

impl QualifiedIdentity {
    /// The hostname part.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The service part.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for QualifiedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.service, self.hostname)
    }
}

/// The broker's node-naming scheme.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeNaming {
    service: String,
}

impl NodeNaming {
    /// Create a naming scheme for `service`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedIdentity` if the service name is empty or
    /// contains whitespace or `@`.
    pub fn new(service: impl Into<String>) -> Result<Self, Error> {
        let service = service.into();
        validate(&service)?;

        Ok(Self { service })
    }

    /// The service prefix.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Qualify a fleet identity into a broker node name.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedIdentity` if the hostname is empty or contains
    /// whitespace or `@`.
    pub fn qualify(&self, peer: &PeerIdentity) -> Result<QualifiedIdentity, Error> {
        validate(peer.hostname())?;

        Ok(QualifiedIdentity {
            hostname: peer.hostname().to_string(),
            service: self.service.clone(),
        })
    }
}

impl Default for NodeNaming {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

fn validate(part: &str) -> Result<(), Error> {
    if part.is_empty() || part.contains('@') || part.chars().any(char::is_whitespace) {
        return Err(Error::MalformedIdentity(part.to_string()));
    }

    Ok(())
}
