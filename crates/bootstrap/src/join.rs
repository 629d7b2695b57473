use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};
use warren_broker::{BrokerAdmin, NodeNaming, QualifiedIdentity};
use warren_fleet::PeerIdentity;

use crate::{Error, PeerSelector};

/// Mutating steps of a join, in the order they are issued.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStep {
    /// Stop the local broker application.
    StopApp,
    /// Reset the local node.
    Reset,
    /// Join the seed's cluster.
    JoinCluster,
    /// Start the local broker application.
    StartApp,
}

impl JoinStep {
    /// The step following `last_completed`, or `None` once every step is done.
    #[must_use]
    pub const fn after(last_completed: Option<Self>) -> Option<Self> {
        match last_completed {
            None => Some(Self::StopApp),
            Some(Self::StopApp) => Some(Self::Reset),
            Some(Self::Reset) => Some(Self::JoinCluster),
            Some(Self::JoinCluster) => Some(Self::StartApp),
            Some(Self::StartApp) => None,
        }
    }
}

impl fmt::Display for JoinStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StopApp => "stop_app",
            Self::Reset => "reset",
            Self::JoinCluster => "join_cluster",
            Self::StartApp => "start_app",
        };

        f.write_str(name)
    }
}

/// Why a join attempt stopped.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct JoinFailure {
    /// Step that failed; `None` when the membership check itself failed.
    pub step: Option<JoinStep>,

    /// Last step that completed before the failure.
    pub last_completed: Option<JoinStep>,

    /// Error reported by the admin interface.
    pub message: String,
}

impl fmt::Display for JoinFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "{step}: {}", self.message),
            None => write!(f, "membership check: {}", self.message),
        }
    }
}

/// Progress of one orchestration run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JoinState {
    /// No seed chosen yet.
    Unjoined,

    /// Asking `seed` whether this node is already a member.
    Checking {
        /// Chosen seed.
        seed: PeerIdentity,
    },

    /// Issuing the join sequence against the local node.
    Joining {
        /// Chosen seed.
        seed: PeerIdentity,
        /// Last step that succeeded.
        last_completed: Option<JoinStep>,
    },

    /// This node was already running in the seed's cluster.
    AlreadyMember,

    /// This node joined the seed's cluster.
    Joined {
        /// Seed joined through.
        seed: PeerIdentity,
    },

    /// The run stopped on an error.
    Failed(JoinFailure),
}

impl JoinState {
    /// Whether the run is over.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AlreadyMember | Self::Joined { .. } | Self::Failed(_)
        )
    }
}

/// Result of an orchestration run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    /// Already running in the cluster; nothing was changed.
    AlreadyMember,

    /// Joined through the given seed.
    Joined(PeerIdentity),

    /// No peer passed its health check; nothing was changed.
    NoHealthySeed,

    /// The join stopped part-way.
    JoinFailed(JoinFailure),
}

/// Drives the local node into the cluster of the first healthy peer, unless
/// it is already a running member there.
#[derive(Debug)]
pub struct ClusterJoinOrchestrator<A> {
    admin: Arc<A>,
    naming: NodeNaming,
    selector: PeerSelector<A>,
    self_id: PeerIdentity,
}

impl<A> ClusterJoinOrchestrator<A>
where
    A: BrokerAdmin,
{
    /// Creates an orchestrator for the node `self_id`.
    pub const fn new(
        admin: Arc<A>,
        naming: NodeNaming,
        selector: PeerSelector<A>,
        self_id: PeerIdentity,
    ) -> Self {
        Self {
            admin,
            naming,
            selector,
            self_id,
        }
    }

    /// Run the state machine to completion against `peers`.
    ///
    /// Membership is always re-checked before mutating, so a run after a
    /// crash mid-sequence converges.
    ///
    /// # Errors
    ///
    /// Returns an error only on misconfiguration (malformed identities, or an
    /// unusable health probe). Operational failures are outcomes.
    pub async fn join(&self, peers: &[PeerIdentity]) -> Result<JoinOutcome, Error> {
        let self_node = self.naming.qualify(&self.self_id)?;
        let mut state = JoinState::Unjoined;

        loop {
            debug!("join state: {:?}", state);

            state = match state {
                JoinState::Unjoined => match self.selector.select_seed(peers).await? {
                    Some(seed) => JoinState::Checking { seed },
                    None => return Ok(JoinOutcome::NoHealthySeed),
                },
                JoinState::Checking { seed } => self.check_membership(&self_node, seed).await?,
                JoinState::Joining {
                    seed,
                    last_completed,
                } => match JoinStep::after(last_completed) {
                    Some(step) => self.advance(seed, step, last_completed).await?,
                    None => JoinState::Joined { seed },
                },
                JoinState::AlreadyMember => {
                    info!("{} is already a member of the cluster", self_node);
                    return Ok(JoinOutcome::AlreadyMember);
                }
                JoinState::Joined { seed } => {
                    info!("{} joined the cluster through {}", self_node, seed);
                    return Ok(JoinOutcome::Joined(seed));
                }
                JoinState::Failed(failure) => {
                    error!("{} failed to join the cluster: {}", self_node, failure);
                    return Ok(JoinOutcome::JoinFailed(failure));
                }
            };
        }
    }

    async fn check_membership(
        &self,
        self_node: &QualifiedIdentity,
        seed: PeerIdentity,
    ) -> Result<JoinState, Error> {
        let seed_node = self.naming.qualify(&seed)?;

        Ok(match self.admin.cluster_status(&seed_node).await {
            Ok(view) if view.contains(self_node) => JoinState::AlreadyMember,
            Ok(_) => JoinState::Joining {
                seed,
                last_completed: None,
            },
            Err(e) => JoinState::Failed(JoinFailure {
                step: None,
                last_completed: None,
                message: e.to_string(),
            }),
        })
    }

    async fn advance(
        &self,
        seed: PeerIdentity,
        step: JoinStep,
        last_completed: Option<JoinStep>,
    ) -> Result<JoinState, Error> {
        let seed_node = self.naming.qualify(&seed)?;

        info!("join step {}", step);
        let result = match step {
            JoinStep::StopApp => self.admin.stop_app().await,
            JoinStep::Reset => self.admin.reset().await,
            JoinStep::JoinCluster => self.admin.join_cluster(&seed_node).await,
            JoinStep::StartApp => self.admin.start_app().await,
        };

        Ok(match result {
            Ok(()) => JoinState::Joining {
                seed,
                last_completed: Some(step),
            },
            Err(e) => JoinState::Failed(JoinFailure {
                step: Some(step),
                last_completed,
                message: e.to_string(),
            }),
        })
    }
}
