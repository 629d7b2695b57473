//! Abstract interface to a broker node's administrative tool, and the value
//! types exchanged with it.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod admin;
mod error;
mod naming;
mod policy;
mod view;

pub use admin::BrokerAdmin;
pub use error::{BrokerAdminError, BrokerAdminErrorKind, Error};
pub use naming::{DEFAULT_SERVICE_NAME, NodeNaming, QualifiedIdentity};
pub use policy::{HA_POLICY_NAME, HA_POLICY_PATTERN, HaPolicy, Policy, policy_applies_to};
pub use view::ClusterView;
