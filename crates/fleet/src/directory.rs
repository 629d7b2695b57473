//! Resolution of join candidates from the fleet registry.

use std::fmt::{self, Debug};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{Error, FleetRegistry, FleetRole, PeerIdentity};

/// Resolves the candidate peers for this node.
///
/// Every call goes to the registry; nothing is cached, so a later call sees
/// fleet changes made in between.
pub struct PeerDirectory<R>
where
    R: FleetRegistry,
{
    registry: Arc<R>,
    role: FleetRole,
}

impl<R> PeerDirectory<R>
where
    R: FleetRegistry,
{
    /// Create a directory over members holding `role`.
    pub const fn new(registry: Arc<R>, role: FleetRole) -> Self {
        Self { registry, role }
    }

    /// The role this directory enumerates.
    pub const fn role(&self) -> FleetRole {
        self.role
    }

    /// List every member except `self_id`, in fleet enumeration order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Discovery` if the registry cannot be queried.
    pub async fn list_peers(&self, self_id: &PeerIdentity) -> Result<Vec<PeerIdentity>, Error> {
        let members = self
            .registry
            .list_fleet_members(self.role)
            .await
            .map_err(|e| {
                error!("Failed to list {} members: {}", self.role, e);
                Error::discovery(&e)
            })?;

        let peers: Vec<PeerIdentity> = members
            .iter()
            .map(crate::FleetMember::identity)
            .filter(|peer| peer != self_id)
            .collect();

        info!(
            "Resolved {} {} peers (excluding {})",
            peers.len(),
            self.role,
            self_id
        );
        for peer in &peers {
            debug!("  - {}", peer);
        }

        Ok(peers)
    }

    /// Number of members holding the role, including this node.
    ///
    /// # Errors
    ///
    /// Returns `Error::Discovery` if the registry cannot be queried.
    pub async fn fleet_size(&self) -> Result<usize, Error> {
        let members = self
            .registry
            .list_fleet_members(self.role)
            .await
            .map_err(|e| Error::discovery(&e))?;

        Ok(members.len())
    }

    /// Whether this node founds the cluster rather than joining it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Discovery` if the registry cannot be queried.
    pub async fn is_initial_node(&self) -> Result<bool, Error> {
        self.registry
            .am_initial_node()
            .await
            .map_err(|e| Error::discovery(&e))
    }
}

impl<R> Debug for PeerDirectory<R>
where
    R: FleetRegistry,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerDirectory")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
