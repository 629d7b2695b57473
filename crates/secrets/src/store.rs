use async_trait::async_trait;

use crate::{BrokerSecrets, SecretStoreError};

/// Lookup of broker secrets by region.
#[async_trait]
pub trait SecretStore
where
    Self: Send + Sync + 'static,
{
    /// The error type for this store.
    type Error: SecretStoreError;

    /// Fetch the secrets configured for `region`.
    async fn get_config(&self, region: &str) -> Result<BrokerSecrets, Self::Error>;
}
