use std::sync::Arc;

use tracing::debug;
use warren_broker::{BrokerAdmin, BrokerAdminError, NodeNaming};
use warren_fleet::PeerIdentity;

use crate::Error;

/// Result of a single health check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Health {
    /// The peer's broker answered its health check.
    Healthy,

    /// The health check failed or timed out.
    Unhealthy,
}

/// Checks a single peer's broker through the admin interface.
#[derive(Debug)]
pub struct HealthProbe<A> {
    admin: Arc<A>,
    naming: NodeNaming,
}

impl<A> HealthProbe<A>
where
    A: BrokerAdmin,
{
    /// Creates a probe issuing checks through `admin`.
    pub const fn new(admin: Arc<A>, naming: NodeNaming) -> Self {
        Self { admin, naming }
    }

    /// Check `peer`.
    ///
    /// # Errors
    ///
    /// Returns an error only on misconfiguration: a malformed peer identity,
    /// or an admin tool that cannot be run.
    pub async fn check(&self, peer: &PeerIdentity) -> Result<Health, Error> {
        let node = self.naming.qualify(peer)?;

        let healthy = self
            .admin
            .node_health_check(&node)
            .await
            .map_err(|e| Error::HealthProbe {
                kind: e.kind(),
                message: e.to_string(),
            })?;

        let health = if healthy {
            Health::Healthy
        } else {
            Health::Unhealthy
        };
        debug!("{} is {:?}", node, health);

        Ok(health)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use warren_broker::BrokerAdminErrorKind;
    use warren_broker_mock::MockBrokerAdmin;

    use super::*;

    #[tokio::test]
    async fn test_check() {
        let admin = MockBrokerAdmin::new("rabbit@head-1").with_healthy("rabbit@head-2");
        let probe = HealthProbe::new(Arc::new(admin), NodeNaming::default());

        assert_eq!(
            probe.check(&PeerIdentity::from("head-2")).await.unwrap(),
            Health::Healthy
        );
        assert_eq!(
            probe.check(&PeerIdentity::from("head-3")).await.unwrap(),
            Health::Unhealthy
        );
    }

    #[tokio::test]
    async fn test_misconfiguration_is_an_error() {
        let probe = HealthProbe::new(
            Arc::new(MockBrokerAdmin::new("rabbit@head-1")),
            NodeNaming::default(),
        );
        assert_matches!(
            probe.check(&PeerIdentity::from("bad host")).await,
            Err(Error::MalformedIdentity(_))
        );

        let probe = HealthProbe::new(
            Arc::new(MockBrokerAdmin::new("rabbit@head-1").unavailable()),
            NodeNaming::default(),
        );
        assert_matches!(
            probe.check(&PeerIdentity::from("head-2")).await,
            Err(Error::HealthProbe {
                kind: BrokerAdminErrorKind::Unavailable,
                ..
            })
        );
    }
}
