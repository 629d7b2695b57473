use std::sync::Arc;

use assert_matches::assert_matches;
use warren_fleet::{
    Error, FleetMember, FleetRegistryErrorKind, FleetRole, PeerDirectory, PeerIdentity,
};
use warren_fleet_mock::MockFleetRegistry;

fn directory(local: &str, hostnames: &[&str]) -> PeerDirectory<MockFleetRegistry> {
    PeerDirectory::new(
        Arc::new(MockFleetRegistry::for_headnodes(local, hostnames)),
        FleetRole::Headnode,
    )
}

#[tokio::test]
async fn test_list_peers_excludes_self_and_keeps_order() {
    let directory = directory("head-2", &["head-1", "head-2", "head-3"]);

    let peers = directory
        .list_peers(&PeerIdentity::from("head-2"))
        .await
        .unwrap();

    assert_eq!(
        peers,
        vec![PeerIdentity::from("head-1"), PeerIdentity::from("head-3")]
    );
}

#[tokio::test]
async fn test_list_peers_for_single_node_fleet_is_empty() {
    let directory = directory("head-1", &["head-1"]);

    let peers = directory
        .list_peers(&PeerIdentity::from("head-1"))
        .await
        .unwrap();

    assert!(peers.is_empty());
}

#[tokio::test]
async fn test_list_peers_ignores_other_roles() {
    let registry = MockFleetRegistry::new(
        "head-1",
        vec![
            FleetMember::new("head-1", FleetRole::Headnode),
            FleetMember::new("work-1", FleetRole::Worknode),
            FleetMember::new("head-2", FleetRole::Headnode),
        ],
        None,
    );
    let directory = PeerDirectory::new(Arc::new(registry), FleetRole::Headnode);

    let peers = directory
        .list_peers(&PeerIdentity::from("head-1"))
        .await
        .unwrap();

    assert_eq!(peers, vec![PeerIdentity::from("head-2")]);
    assert_eq!(directory.fleet_size().await.unwrap(), 2);
}

#[tokio::test]
async fn test_fleet_size_counts_self() {
    let directory = directory("head-1", &["head-1", "head-2", "head-3", "head-4"]);

    assert_eq!(directory.fleet_size().await.unwrap(), 4);
}

#[tokio::test]
async fn test_is_initial_node_delegates_to_registry() {
    assert!(
        directory("head-1", &["head-1", "head-2"])
            .is_initial_node()
            .await
            .unwrap()
    );
    assert!(
        !directory("head-2", &["head-1", "head-2"])
            .is_initial_node()
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_unavailable_registry_is_a_discovery_error() {
    let directory = PeerDirectory::new(
        Arc::new(MockFleetRegistry::unavailable("head-1")),
        FleetRole::Headnode,
    );

    assert_matches!(
        directory.list_peers(&PeerIdentity::from("head-1")).await,
        Err(Error::Discovery {
            kind: FleetRegistryErrorKind::Unavailable,
            ..
        })
    );
    assert_matches!(directory.fleet_size().await, Err(Error::Discovery { .. }));
    assert_matches!(
        directory.is_initial_node().await,
        Err(Error::Discovery { .. })
    );
}
