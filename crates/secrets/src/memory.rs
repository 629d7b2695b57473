use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{BrokerSecrets, Error, SecretStore};

/// In-memory secret store.
#[derive(Clone, Debug, Default)]
pub struct MemorySecretStore {
    map: Arc<Mutex<HashMap<String, BrokerSecrets>>>,
}

impl MemorySecretStore {
    /// Creates a new, empty `MemorySecretStore`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `secrets` for `region`.
    #[must_use]
    pub fn with_region(region: impl Into<String>, secrets: BrokerSecrets) -> Self {
        let mut map = HashMap::new();
        map.insert(region.into(), secrets);

        Self {
            map: Arc::new(Mutex::new(map)),
        }
    }

    /// Store `secrets` for `region`, replacing any previous value.
    pub async fn put(&self, region: impl Into<String>, secrets: BrokerSecrets) {
        self.map.lock().await.insert(region.into(), secrets);
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    type Error = Error;

    async fn get_config(&self, region: &str) -> Result<BrokerSecrets, Self::Error> {
        self.map
            .lock()
            .await
            .get(region)
            .cloned()
            .ok_or_else(|| Error::MissingRegion(region.to_string()))
    }
}
