//! Fleet membership for broker bootstrap.
//!
//! This crate provides:
//! - Peer identity types (`PeerIdentity`, `FleetMember`, `FleetRole`)
//! - The abstract `FleetRegistry` interface
//! - `PeerDirectory`, which resolves join candidates for this node
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod directory;
mod error;
mod member;
mod registry;

pub use directory::PeerDirectory;
pub use error::{Error, FleetRegistryError, FleetRegistryErrorKind};
pub use member::{FleetMember, FleetRole, PeerIdentity};
pub use registry::FleetRegistry;
