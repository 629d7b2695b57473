use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::{BrokerSecrets, Error, SecretStore};

/// Secrets files are readable by their owner only.
const SECRETS_FILE_MODE: u32 = 0o600;

/// Region entry of the secrets document.
#[derive(Debug, Deserialize, Serialize)]
struct RegionSecrets {
    rabbit: BrokerSecrets,
}

type SecretsDocument = BTreeMap<String, RegionSecrets>;

/// Secret store backed by a YAML document keyed by region:
///
/// ```yaml
/// east:
///   rabbit:
///     username: guest
///     password: ...
///     cookie: ...
/// ```
#[derive(Clone, Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Creates a store reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the secrets document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a new secrets document holding `secrets` for `region`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyExists` if `path` exists and `force` is not set,
    /// or an IO/serialization error if the document cannot be written.
    pub async fn create(
        path: impl Into<PathBuf>,
        region: &str,
        secrets: &BrokerSecrets,
        force: bool,
    ) -> Result<Self, Error> {
        let path = path.into();

        let exists = fs::try_exists(&path)
            .await
            .map_err(|e| Error::Io("error checking secrets file", e))?;
        if exists && !force {
            return Err(Error::AlreadyExists(path));
        }

        let mut document = SecretsDocument::new();
        document.insert(
            region.to_string(),
            RegionSecrets {
                rabbit: secrets.clone(),
            },
        );
        let yaml = serde_yaml::to_string(&document).map_err(Error::Serialize)?;

        // The mode only applies to newly created files.
        if exists {
            fs::set_permissions(&path, std::fs::Permissions::from_mode(SECRETS_FILE_MODE))
                .await
                .map_err(|e| Error::Io("error setting secrets file permissions", e))?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(SECRETS_FILE_MODE)
            .open(&path)
            .await
            .map_err(|e| Error::Io("error opening secrets file", e))?;
        file.write_all(yaml.as_bytes())
            .await
            .map_err(|e| Error::Io("error writing secrets file", e))?;
        file.sync_all()
            .await
            .map_err(|e| Error::Io("error syncing secrets file", e))?;

        info!("wrote secrets for region {} to {}", region, path.display());

        Ok(Self { path })
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    type Error = Error;

    async fn get_config(&self, region: &str) -> Result<BrokerSecrets, Self::Error> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Io("error reading secrets file", e))?;

        let mut document: SecretsDocument = serde_yaml::from_str(&content).map_err(Error::Parse)?;

        document
            .remove(region)
            .map(|entry| entry.rabbit)
            .ok_or_else(|| Error::MissingRegion(region.to_string()))
    }
}
