use std::sync::Arc;

use tracing::info;
use warren_broker::{BrokerAdmin, BrokerAdminError};

use crate::Error;

/// Sets the administrative user's password.
#[derive(Debug)]
pub struct CredentialRotator<A> {
    admin: Arc<A>,
}

impl<A> CredentialRotator<A>
where
    A: BrokerAdmin,
{
    /// Creates a rotator acting through `admin`.
    pub const fn new(admin: Arc<A>) -> Self {
        Self { admin }
    }

    /// Set `username`'s password to `password`. Always issued; setting the
    /// current password again is harmless.
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialSetFailed` if the broker rejects the change.
    pub async fn set_password(&self, username: &str, password: &str) -> Result<(), Error> {
        self.admin
            .change_password(username, password)
            .await
            .map_err(|e| Error::CredentialSetFailed {
                kind: e.kind(),
                message: e.to_string(),
            })?;

        info!("credentials set for {}", username);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tracing_test::traced_test;
    use warren_broker_mock::{Call, MockBrokerAdmin, Operation};

    use super::*;

    #[traced_test]
    #[tokio::test]
    async fn test_set_password() {
        let admin = Arc::new(MockBrokerAdmin::new("rabbit@head-1"));

        CredentialRotator::new(admin.clone())
            .set_password("guest", "correct-horse")
            .await
            .unwrap();

        assert_eq!(
            admin.calls(),
            vec![Call::ChangePassword {
                username: "guest".to_string(),
                password: "correct-horse".to_string(),
            }]
        );
        assert!(logs_contain("credentials set for guest"));
        assert!(!logs_contain("correct-horse"));
    }

    #[tokio::test]
    async fn test_failure_is_fatal() {
        let admin =
            Arc::new(MockBrokerAdmin::new("rabbit@head-1").failing(Operation::ChangePassword));

        assert_matches!(
            CredentialRotator::new(admin.clone())
                .set_password("guest", "pw")
                .await,
            Err(Error::CredentialSetFailed { .. })
        );
        assert_eq!(admin.calls().len(), 1);
    }
}
