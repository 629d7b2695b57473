//! Abstract interface to a broker node's administrative tool.

use async_trait::async_trait;

use crate::{BrokerAdminError, ClusterView, Policy, QualifiedIdentity};

/// Command-style administrative interface to the local broker node.
///
/// Operations without a node argument act on the local node.
#[async_trait]
pub trait BrokerAdmin
where
    Self: Send + Sync + 'static,
{
    /// The error type for this admin interface.
    type Error: BrokerAdminError;

    /// Run the health check against `node`.
    ///
    /// A failed check is `Ok(false)`. `Err` means the check could not be
    /// attempted at all.
    async fn node_health_check(&self, node: &QualifiedIdentity) -> Result<bool, Self::Error>;

    /// Fetch `node`'s view of its cluster.
    async fn cluster_status(&self, node: &QualifiedIdentity) -> Result<ClusterView, Self::Error>;

    /// Stop the broker application, leaving the runtime up.
    async fn stop_app(&self) -> Result<(), Self::Error>;

    /// Discard the node's persisted cluster identity and state.
    async fn reset(&self) -> Result<(), Self::Error>;

    /// Join the cluster `seed` belongs to.
    async fn join_cluster(&self, seed: &QualifiedIdentity) -> Result<(), Self::Error>;

    /// Start the broker application.
    async fn start_app(&self) -> Result<(), Self::Error>;

    /// List users. Used as the readiness probe.
    async fn list_users(&self) -> Result<(), Self::Error>;

    /// Set `username`'s password.
    async fn change_password(&self, username: &str, password: &str) -> Result<(), Self::Error>;

    /// Register (or overwrite) a policy.
    async fn set_policy(&self, policy: &Policy) -> Result<(), Self::Error>;

    /// Plugins that are explicitly enabled.
    async fn list_enabled_plugins(&self) -> Result<Vec<String>, Self::Error>;

    /// Enable a plugin.
    async fn enable_plugin(&self, plugin: &str) -> Result<(), Self::Error>;
}
