use tracing::{info, warn};
use warren_broker::BrokerAdmin;
use warren_fleet::PeerIdentity;

use crate::{Error, Health, HealthProbe};

/// Picks the first healthy peer, in fleet order.
#[derive(Debug)]
pub struct PeerSelector<A> {
    probe: HealthProbe<A>,
}

impl<A> PeerSelector<A>
where
    A: BrokerAdmin,
{
    /// Creates a selector probing through `probe`.
    pub const fn new(probe: HealthProbe<A>) -> Self {
        Self { probe }
    }

    /// One ordered sweep over `peers`, stopping at the first healthy one.
    ///
    /// # Errors
    ///
    /// Propagates probe misconfiguration errors.
    pub async fn select_seed(&self, peers: &[PeerIdentity]) -> Result<Option<PeerIdentity>, Error> {
        for peer in peers {
            if self.probe.check(peer).await? == Health::Healthy {
                info!("selected {} as seed", peer);
                return Ok(Some(peer.clone()));
            }
        }

        warn!("none of {} peers is healthy", peers.len());

        Ok(None)
    }
}
