//! Abstract interface to the fleet membership source.

use async_trait::async_trait;

use crate::{FleetMember, FleetRegistryError, FleetRole};

/// Abstract interface for enumerating fleet members.
#[async_trait]
pub trait FleetRegistry
where
    Self: Send + Sync + 'static,
{
    /// The error type for this registry.
    type Error: FleetRegistryError;

    /// List every member holding `role`, in fleet enumeration order.
    async fn list_fleet_members(&self, role: FleetRole) -> Result<Vec<FleetMember>, Self::Error>;

    /// Whether the local machine is the founding node of the cluster.
    async fn am_initial_node(&self) -> Result<bool, Self::Error>;
}
