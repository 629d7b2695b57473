use tracing::info;
use warren_broker::{BrokerAdmin, BrokerAdminError, HaPolicy, Policy};

use crate::Error;

/// Smallest fleet that gets a quorum-sized mirror count instead of `All`.
const QUORUM_MIN_FLEET_SIZE: usize = 3;

/// Desired HA policy for a fleet of `fleet_size` nodes: mirror to a majority
/// (`n / 2 + 1`) once there are at least three nodes, otherwise everywhere.
#[must_use]
pub const fn select_policy(fleet_size: usize) -> HaPolicy {
    if fleet_size >= QUORUM_MIN_FLEET_SIZE {
        HaPolicy::Exactly(fleet_size / 2 + 1)
    } else {
        HaPolicy::All
    }
}

/// Register the HA policy for `fleet_size` nodes with the broker.
///
/// # Errors
///
/// Returns `Error::PolicyApplyFailed` if the broker rejects the policy.
pub async fn apply_policy<A>(admin: &A, fleet_size: usize) -> Result<Policy, Error>
where
    A: BrokerAdmin,
{
    let policy = Policy::ha(select_policy(fleet_size));

    admin
        .set_policy(&policy)
        .await
        .map_err(|e| Error::PolicyApplyFailed {
            kind: e.kind(),
            message: e.to_string(),
        })?;

    info!(
        "applied {} policy {:?} for {} node(s)",
        policy.name, policy.definition, fleet_size
    );

    Ok(policy)
}
