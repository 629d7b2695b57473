//! Scripted, recording implementation of the broker admin interface for
//! testing purposes.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use warren_broker::{BrokerAdmin, ClusterView, Policy, QualifiedIdentity};

/// Admin operations, for scripting failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    /// `cluster_status`
    ClusterStatus,
    /// `stop_app`
    StopApp,
    /// `reset`
    Reset,
    /// `join_cluster`
    JoinCluster,
    /// `start_app`
    StartApp,
    /// `change_password`
    ChangePassword,
    /// `set_policy`
    SetPolicy,
    /// `list_enabled_plugins`
    ListEnabledPlugins,
    /// `enable_plugin`
    EnablePlugin,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClusterStatus => "cluster_status",
            Self::StopApp => "stop_app",
            Self::Reset => "reset",
            Self::JoinCluster => "join_cluster",
            Self::StartApp => "start_app",
            Self::ChangePassword => "change_password",
            Self::SetPolicy => "set_policy",
            Self::ListEnabledPlugins => "list_enabled_plugins",
            Self::EnablePlugin => "enable_plugin",
        };

        f.write_str(name)
    }
}

/// A call received by the mock, in order of arrival.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    /// `node_health_check(node)`
    NodeHealthCheck(String),
    /// `cluster_status(node)`
    ClusterStatus(String),
    /// `stop_app()`
    StopApp,
    /// `reset()`
    Reset,
    /// `join_cluster(seed)`
    JoinCluster(String),
    /// `start_app()`
    StartApp,
    /// `list_users()`
    ListUsers,
    /// `change_password(username, password)`
    ChangePassword {
        /// Target user.
        username: String,
        /// Password sent.
        password: String,
    },
    /// `set_policy(policy)`
    SetPolicy(Policy),
    /// `list_enabled_plugins()`
    ListEnabledPlugins,
    /// `enable_plugin(plugin)`
    EnablePlugin(String),
}

impl Call {
    /// Whether this call belongs to the join sequence (stop, reset, join, start).
    #[must_use]
    pub const fn is_join_sequence(&self) -> bool {
        matches!(
            self,
            Self::StopApp | Self::Reset | Self::JoinCluster(_) | Self::StartApp
        )
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    enabled_plugins: Vec<String>,
    failing: HashSet<Operation>,
    failing_times: HashMap<Operation, usize>,
    healthy: HashSet<String>,
    list_users_failures: usize,
    pending_seed: Option<String>,
    unavailable: bool,
    views: HashMap<String, ClusterView>,
}

/// Scripted broker admin that records every call.
///
/// Nodes are unhealthy unless marked healthy, and have no cluster view unless
/// one is provided. `stop_app` takes the local node out of every view it runs
/// in. After a successful `join_cluster` the node is a stopped member: only
/// the following `start_app` adds it to the seed's running nodes, so a run
/// that fails in between is seen as not joined by the next run.
#[derive(Clone)]
pub struct MockBrokerAdmin {
    local_node: String,
    state: Arc<Mutex<State>>,
}

impl MockBrokerAdmin {
    /// Create a mock for the local node named `local_node` (e.g. `rabbit@head-2`).
    #[must_use]
    pub fn new(local_node: impl Into<String>) -> Self {
        Self {
            local_node: local_node.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `node` as passing health checks.
    #[must_use]
    pub fn with_healthy(self, node: impl Into<String>) -> Self {
        self.state().healthy.insert(node.into());
        self
    }

    /// Set the cluster view `node` reports.
    #[must_use]
    pub fn with_cluster_view(self, node: impl Into<String>, view: ClusterView) -> Self {
        self.state().views.insert(node.into(), view);
        self
    }

    /// Make every invocation of `operation` fail.
    #[must_use]
    pub fn failing(self, operation: Operation) -> Self {
        self.state().failing.insert(operation);
        self
    }

    /// Make the next `times` invocations of `operation` fail.
    #[must_use]
    pub fn failing_times(self, operation: Operation, times: usize) -> Self {
        self.state().failing_times.insert(operation, times);
        self
    }

    /// Make the first `failures` calls to `list_users` fail.
    #[must_use]
    pub fn with_list_users_failures(self, failures: usize) -> Self {
        self.state().list_users_failures = failures;
        self
    }

    /// Set the plugins reported as explicitly enabled.
    #[must_use]
    pub fn with_enabled_plugins(self, plugins: &[&str]) -> Self {
        self.state().enabled_plugins = plugins.iter().map(ToString::to_string).collect();
        self
    }

    /// Behave as if the admin tool could not be run at all.
    #[must_use]
    pub fn unavailable(self) -> Self {
        self.state().unavailable = true;
        self
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls belonging to the join sequence.
    #[must_use]
    pub fn join_sequence_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_join_sequence)
            .collect()
    }

    /// Number of `list_users` calls received.
    #[must_use]
    pub fn list_users_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == Call::ListUsers)
            .count()
    }

    /// Whether any call other than health checks and status queries mutated state.
    #[must_use]
    pub fn has_mutations(&self) -> bool {
        self.calls().iter().any(|call| {
            !matches!(
                call,
                Call::NodeHealthCheck(_)
                    | Call::ClusterStatus(_)
                    | Call::ListUsers
                    | Call::ListEnabledPlugins
            )
        })
    }

    fn record(&self, call: Call, operation: Option<Operation>) -> Result<(), Error> {
        let mut state = self.state();
        state.calls.push(call);

        if state.unavailable {
            return Err(Error::Unavailable);
        }

        let Some(operation) = operation else {
            return Ok(());
        };

        if state.failing.contains(&operation) {
            return Err(Error::CommandFailed(operation));
        }

        if let Some(remaining) = state.failing_times.get_mut(&operation) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::CommandFailed(operation));
            }
        }

        Ok(())
    }
}

impl State {
    fn set_running(&mut self, node: &str, running: bool, seed: Option<&str>) {
        let mut keys: Vec<String> = self
            .views
            .iter()
            .filter(|(_, view)| view.running_nodes().any(|n| n == node))
            .map(|(key, _)| key.clone())
            .collect();
        if let Some(seed) = seed {
            keys.push(seed.to_string());
        }

        for key in keys {
            let mut nodes: Vec<String> = self
                .views
                .get(&key)
                .map(|view| {
                    view.running_nodes()
                        .filter(|n| *n != node)
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default();
            if running {
                nodes.push(node.to_string());
            }
            self.views.insert(key, ClusterView::new(nodes));
        }
    }
}

impl fmt::Debug for MockBrokerAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBrokerAdmin")
            .field("local_node", &self.local_node)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BrokerAdmin for MockBrokerAdmin {
    type Error = Error;

    async fn node_health_check(&self, node: &QualifiedIdentity) -> Result<bool, Self::Error> {
        let node = node.to_string();
        self.record(Call::NodeHealthCheck(node.clone()), None)?;

        Ok(self.state().healthy.contains(&node))
    }

    async fn cluster_status(&self, node: &QualifiedIdentity) -> Result<ClusterView, Self::Error> {
        let node = node.to_string();
        self.record(Call::ClusterStatus(node.clone()), Some(Operation::ClusterStatus))?;

        self.state()
            .views
            .get(&node)
            .cloned()
            .ok_or(Error::CommandFailed(Operation::ClusterStatus))
    }

    async fn stop_app(&self) -> Result<(), Self::Error> {
        self.record(Call::StopApp, Some(Operation::StopApp))?;

        let local_node = self.local_node.clone();
        self.state().set_running(&local_node, false, None);

        Ok(())
    }

    async fn reset(&self) -> Result<(), Self::Error> {
        self.record(Call::Reset, Some(Operation::Reset))?;

        self.state().pending_seed = None;

        Ok(())
    }

    async fn join_cluster(&self, seed: &QualifiedIdentity) -> Result<(), Self::Error> {
        let seed = seed.to_string();
        self.record(Call::JoinCluster(seed.clone()), Some(Operation::JoinCluster))?;

        self.state().pending_seed = Some(seed);

        Ok(())
    }

    async fn start_app(&self) -> Result<(), Self::Error> {
        self.record(Call::StartApp, Some(Operation::StartApp))?;

        let mut state = self.state();
        if let Some(seed) = state.pending_seed.clone() {
            state.set_running(&self.local_node, true, Some(&seed));

            let view = state.views.get(&seed).cloned().unwrap_or_default();
            state.views.insert(self.local_node.clone(), view);
        }

        Ok(())
    }

    async fn list_users(&self) -> Result<(), Self::Error> {
        self.record(Call::ListUsers, None)?;

        let mut state = self.state();
        if state.list_users_failures > 0 {
            state.list_users_failures -= 1;
            return Err(Error::Unavailable);
        }

        Ok(())
    }

    async fn change_password(&self, username: &str, password: &str) -> Result<(), Self::Error> {
        self.record(
            Call::ChangePassword {
                username: username.to_string(),
                password: password.to_string(),
            },
            Some(Operation::ChangePassword),
        )
    }

    async fn set_policy(&self, policy: &Policy) -> Result<(), Self::Error> {
        self.record(Call::SetPolicy(policy.clone()), Some(Operation::SetPolicy))
    }

    async fn list_enabled_plugins(&self) -> Result<Vec<String>, Self::Error> {
        self.record(Call::ListEnabledPlugins, Some(Operation::ListEnabledPlugins))?;

        Ok(self.state().enabled_plugins.clone())
    }

    async fn enable_plugin(&self, plugin: &str) -> Result<(), Self::Error> {
        self.record(
            Call::EnablePlugin(plugin.to_string()),
            Some(Operation::EnablePlugin),
        )?;

        self.state().enabled_plugins.push(plugin.to_string());

        Ok(())
    }
}
