//! Static implementation of the fleet registry, backed by a fleet file.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod error;

use config::Config;
pub use error::Error;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use warren_fleet::{FleetMember, FleetRegistry, FleetRole};

/// Static fleet registry.
///
/// The initial node is the one named explicitly, or else the first member
/// listed.
#[derive(Debug, Clone)]
pub struct MockFleetRegistry {
    initial_node: Option<String>,
    local_hostname: String,
    members: Vec<FleetMember>,
    unavailable: bool,
}

impl MockFleetRegistry {
    /// Create a registry with the given members, seen from `local_hostname`.
    #[must_use]
    pub fn new(
        local_hostname: impl Into<String>,
        members: Vec<FleetMember>,
        initial_node: Option<String>,
    ) -> Self {
        Self {
            initial_node,
            local_hostname: local_hostname.into(),
            members,
            unavailable: false,
        }
    }

    /// Create a registry of headnodes from bare hostnames.
    #[must_use]
    pub fn for_headnodes(local_hostname: impl Into<String>, hostnames: &[&str]) -> Self {
        let members = hostnames
            .iter()
            .map(|hostname| FleetMember::new(*hostname, FleetRole::Headnode))
            .collect();

        Self::new(local_hostname, members, None)
    }

    /// Create a registry whose every query fails.
    #[must_use]
    pub fn unavailable(local_hostname: impl Into<String>) -> Self {
        Self {
            initial_node: None,
            local_hostname: local_hostname.into(),
            members: Vec::new(),
            unavailable: true,
        }
    }

    /// Create a registry from a fleet file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The fleet file cannot be read
    /// - The fleet file contains invalid JSON
    pub fn from_fleet_file<P: AsRef<Path>>(
        fleet_file_path: P,
        local_hostname: impl Into<String>,
    ) -> Result<Self, Error> {
        let mut file = File::open(fleet_file_path)
            .map_err(|e| Error::FleetFile(format!("Failed to open fleet file: {e}")))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::FleetFile(format!("Failed to read fleet file: {e}")))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::FleetFile(format!("Failed to parse fleet file: {e}")))?;

        Ok(Self::new(local_hostname, config.members, config.initial_node))
    }
}

#[async_trait]
impl FleetRegistry for MockFleetRegistry {
    type Error = Error;

    async fn list_fleet_members(&self, role: FleetRole) -> Result<Vec<FleetMember>, Self::Error> {
        if self.unavailable {
            return Err(Error::Unavailable);
        }

        Ok(self
            .members
            .iter()
            .filter(|member| member.role == role)
            .cloned()
            .collect())
    }

    async fn am_initial_node(&self) -> Result<bool, Self::Error> {
        if self.unavailable {
            return Err(Error::Unavailable);
        }

        let initial = self
            .initial_node
            .as_deref()
            .or_else(|| self.members.first().map(|member| member.hostname.as_str()));

        Ok(initial == Some(self.local_hostname.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_filters_members_by_role() {
        let registry = MockFleetRegistry::new(
            "head-1",
            vec![
                FleetMember::new("head-1", FleetRole::Headnode),
                FleetMember::new("work-1", FleetRole::Worknode),
                FleetMember::new("head-2", FleetRole::Headnode),
            ],
            None,
        );

        let heads = registry
            .list_fleet_members(FleetRole::Headnode)
            .await
            .unwrap();

        assert_eq!(
            heads
                .iter()
                .map(|m| m.hostname.as_str())
                .collect::<Vec<_>>(),
            vec!["head-1", "head-2"]
        );
    }

    #[tokio::test]
    async fn test_initial_node_defaults_to_first_member() {
        let first = MockFleetRegistry::for_headnodes("head-1", &["head-1", "head-2"]);
        let second = MockFleetRegistry::for_headnodes("head-2", &["head-1", "head-2"]);

        assert!(first.am_initial_node().await.unwrap());
        assert!(!second.am_initial_node().await.unwrap());
    }

    #[tokio::test]
    async fn test_explicit_initial_node_wins() {
        let registry = MockFleetRegistry::new(
            "head-2",
            vec![
                FleetMember::new("head-1", FleetRole::Headnode),
                FleetMember::new("head-2", FleetRole::Headnode),
            ],
            Some("head-2".to_string()),
        );

        assert!(registry.am_initial_node().await.unwrap());
    }

    #[tokio::test]
    async fn test_unavailable_registry_fails_every_query() {
        let registry = MockFleetRegistry::unavailable("head-1");

        assert!(matches!(
            registry.list_fleet_members(FleetRole::Headnode).await,
            Err(Error::Unavailable)
        ));
        assert!(matches!(
            registry.am_initial_node().await,
            Err(Error::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_loads_fleet_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "initial_node": "head-3",
                "members": [
                    {{ "hostname": "head-1", "role": "headnode" }},
                    {{ "hostname": "head-3", "role": "headnode" }}
                ]
            }}"#
        )
        .unwrap();

        let registry = MockFleetRegistry::from_fleet_file(file.path(), "head-3").unwrap();

        assert_eq!(
            registry
                .list_fleet_members(FleetRole::Headnode)
                .await
                .unwrap()
                .len(),
            2
        );
        assert!(registry.am_initial_node().await.unwrap());
    }

    #[test]
    fn test_rejects_malformed_fleet_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = MockFleetRegistry::from_fleet_file(file.path(), "head-1");

        assert!(matches!(result, Err(Error::FleetFile(_))));
    }
}
