use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::Error;

/// Cookie files are readable by their owner only.
const COOKIE_FILE_MODE: u32 = 0o400;

/// Mode used while rewriting an existing cookie file.
const COOKIE_WRITE_MODE: u32 = 0o600;

/// What `ClusterSecretInstaller::install` did.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretInstall {
    /// The file already held the secret.
    Unchanged,

    /// The file was written; the broker must be restarted to pick it up.
    Written,
}

/// Installs the shared cluster secret into the broker's cookie file.
#[derive(Clone, Debug)]
pub struct ClusterSecretInstaller {
    path: PathBuf,
}

impl ClusterSecretInstaller {
    /// Creates an installer writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cookie file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `secret` unless the file already holds exactly that.
    ///
    /// # Errors
    ///
    /// Returns `Error::ClusterSecret` if the file cannot be read, written, or
    /// have its permissions set.
    pub async fn install(&self, secret: &str) -> Result<SecretInstall, Error> {
        let exists = match fs::read(&self.path).await {
            Ok(current) if current == secret.as_bytes() => return Ok(SecretInstall::Unchanged),
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(Error::ClusterSecret("error reading cookie file", e)),
        };

        if exists {
            self.set_mode(COOKIE_WRITE_MODE).await?;
        }

        // A new file is created read-only; the open handle stays writable.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(COOKIE_FILE_MODE)
            .open(&self.path)
            .await
            .map_err(|e| Error::ClusterSecret("error opening cookie file", e))?;
        file.write_all(secret.as_bytes())
            .await
            .map_err(|e| Error::ClusterSecret("error writing cookie file", e))?;
        file.sync_all()
            .await
            .map_err(|e| Error::ClusterSecret("error syncing cookie file", e))?;
        drop(file);

        self.set_mode(COOKIE_FILE_MODE).await?;

        info!("installed cluster secret at {}", self.path.display());

        Ok(SecretInstall::Written)
    }

    async fn set_mode(&self, mode: u32) -> Result<(), Error> {
        fs::set_permissions(&self.path, std::fs::Permissions::from_mode(mode))
            .await
            .map_err(|e| Error::ClusterSecret("error setting cookie file permissions", e))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn mode(path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let installer = ClusterSecretInstaller::new(dir.path().join(".erlang.cookie"));

        assert_eq!(
            installer.install("COOKIE").await.unwrap(),
            SecretInstall::Written
        );
        assert_eq!(mode(installer.path()), 0o400);
        assert_eq!(
            installer.install("COOKIE").await.unwrap(),
            SecretInstall::Unchanged
        );
    }

    #[tokio::test]
    async fn test_install_replaces_different_secret() {
        let dir = tempfile::tempdir().unwrap();
        let installer = ClusterSecretInstaller::new(dir.path().join(".erlang.cookie"));

        installer.install("OLD").await.unwrap();

        assert_eq!(
            installer.install("NEW").await.unwrap(),
            SecretInstall::Written
        );
        assert_eq!(std::fs::read_to_string(installer.path()).unwrap(), "NEW");
        assert_eq!(mode(installer.path()), 0o400);
    }

    #[tokio::test]
    async fn test_install_narrows_world_readable_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".erlang.cookie");
        std::fs::write(&path, "OLD").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let installer = ClusterSecretInstaller::new(&path);

        assert_eq!(
            installer.install("NEW").await.unwrap(),
            SecretInstall::Written
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "NEW");
        assert_eq!(mode(&path), 0o400);
    }

    #[tokio::test]
    async fn test_directory_in_place_of_cookie_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".erlang.cookie");
        std::fs::create_dir(&path).unwrap();
        let installer = ClusterSecretInstaller::new(&path);

        assert_matches!(
            installer.install("COOKIE").await,
            Err(Error::ClusterSecret(..))
        );
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let installer = ClusterSecretInstaller::new(dir.path().join("missing/.erlang.cookie"));

        assert_matches!(
            installer.install("COOKIE").await,
            Err(Error::ClusterSecret(..))
        );
        assert!(!installer.path().exists());
    }
}
