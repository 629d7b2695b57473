//! Identity types for fleet members.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable, hostname-derived identifier for one fleet member.
///
/// Identities are supplied by the fleet registry and never generated here.
/// They are not validated on construction; qualifying one for the broker
/// (see `warren-broker`) is where a malformed hostname is rejected.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerIdentity(String);

impl PeerIdentity {
    /// Create a peer identity from a hostname.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self(hostname.into())
    }

    /// The bare hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerIdentity {
    fn from(hostname: &str) -> Self {
        Self::new(hostname)
    }
}

impl From<String> for PeerIdentity {
    fn from(hostname: String) -> Self {
        Self(hostname)
    }
}

/// The role a machine plays in the fleet.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FleetRole {
    /// Control-plane node eligible to run the broker cluster.
    Headnode,

    /// Compute node.
    Worknode,

    /// Storage node.
    Storagenode,
}

impl fmt::Display for FleetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Headnode => f.write_str("headnode"),
            Self::Worknode => f.write_str("worknode"),
            Self::Storagenode => f.write_str("storagenode"),
        }
    }
}

impl FromStr for FleetRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "headnode" => Ok(Self::Headnode),
            "worknode" => Ok(Self::Worknode),
            "storagenode" => Ok(Self::Storagenode),
            other => Err(format!("unknown fleet role '{other}'")),
        }
    }
}

/// A machine as reported by the fleet registry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FleetMember {
    /// Hostname of the member.
    pub hostname: String,

    /// Role of the member.
    pub role: FleetRole,
}

impl FleetMember {
    /// Create a new member.
    #[must_use]
    pub fn new(hostname: impl Into<String>, role: FleetRole) -> Self {
        Self {
            hostname: hostname.into(),
            role,
        }
    }

    /// The member's peer identity.
    #[must_use]
    pub fn identity(&self) -> PeerIdentity {
        PeerIdentity::new(self.hostname.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        for role in [FleetRole::Headnode, FleetRole::Worknode, FleetRole::Storagenode] {
            assert_eq!(role.to_string().parse::<FleetRole>(), Ok(role));
        }

        assert!("bastion".parse::<FleetRole>().is_err());
    }

    #[test]
    fn test_member_deserializes_lowercase_role() {
        let member: FleetMember =
            serde_json::from_str(r#"{"hostname":"head-1","role":"headnode"}"#).unwrap();

        assert_eq!(member, FleetMember::new("head-1", FleetRole::Headnode));
        assert_eq!(member.identity(), PeerIdentity::from("head-1"));
    }
}
