//! Broker credentials and cluster secret lookup, plus generation of new
//! secrets documents.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod file;
mod memory;
mod secrets;
mod store;

pub use error::{Error, SecretStoreError, SecretStoreErrorKind};
pub use file::FileSecretStore;
pub use memory::MemorySecretStore;
pub use secrets::BrokerSecrets;
pub use store::SecretStore;
