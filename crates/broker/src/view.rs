//! Cluster membership as reported by a broker node.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::QualifiedIdentity;

/// Snapshot of a broker node's view of its cluster.
///
/// Always fetched fresh for the decision it informs; holding one across
/// orchestration steps would make membership checks stale.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClusterView {
    running_nodes: BTreeSet<String>,
}

impl ClusterView {
    /// Build a view from running node names.
    pub fn new<I, S>(running_nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            running_nodes: running_nodes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the admin tool's JSON status document. Only `running_nodes` is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not JSON or lacks `running_nodes`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether `node` is currently running in the cluster.
    #[must_use]
    pub fn contains(&self, node: &QualifiedIdentity) -> bool {
        self.running_nodes.contains(&node.to_string())
    }

    /// Running node names, sorted.
    pub fn running_nodes(&self) -> impl Iterator<Item = &str> {
        self.running_nodes.iter().map(String::as_str)
    }

    /// Number of running nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running_nodes.len()
    }

    /// Whether no node is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running_nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use warren_fleet::PeerIdentity;

    use super::*;
    use crate::NodeNaming;

    const STATUS_JSON: &str = r#"{
        "alarms": [],
        "cluster_name": "rabbit@head-1",
        "disk_nodes": ["rabbit@head-1", "rabbit@head-2", "rabbit@head-3"],
        "running_nodes": ["rabbit@head-1", "rabbit@head-2"],
        "versions": {}
    }"#;

    #[test]
    fn test_parses_running_nodes_and_ignores_the_rest() {
        let view = ClusterView::from_json(STATUS_JSON).unwrap();

        assert_eq!(
            view.running_nodes().collect::<Vec<_>>(),
            vec!["rabbit@head-1", "rabbit@head-2"]
        );
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_membership_uses_qualified_identity() {
        let view = ClusterView::from_json(STATUS_JSON).unwrap();
        let naming = NodeNaming::default();

        assert!(view.contains(&naming.qualify(&PeerIdentity::from("head-2")).unwrap()));
        // Stopped members are not running members.
        assert!(!view.contains(&naming.qualify(&PeerIdentity::from("head-3")).unwrap()));
        // Bare hostnames never match.
        assert!(!ClusterView::new(["head-1"])
            .contains(&naming.qualify(&PeerIdentity::from("head-1")).unwrap()));
    }

    #[test]
    fn test_rejects_documents_without_running_nodes() {
        assert!(ClusterView::from_json(r#"{"disk_nodes": []}"#).is_err());
        assert!(ClusterView::from_json("Error: unable to perform an operation").is_err());
    }
}
