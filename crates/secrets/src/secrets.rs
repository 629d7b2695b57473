use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const GENERATED_USERNAME: &str = "guest";
const GENERATED_LENGTH: usize = 32;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Broker credentials and the shared cluster secret for one region.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BrokerSecrets {
    /// Administrative username.
    pub username: String,

    /// Desired password for `username`.
    pub password: String,

    /// Shared secret every cluster member must hold (the Erlang cookie).
    #[serde(rename = "cookie")]
    pub cluster_secret: String,
}

impl BrokerSecrets {
    /// Generate fresh secrets: user `guest` with random password and cluster
    /// secret of 32 ASCII letters each.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            username: GENERATED_USERNAME.to_string(),
            password: random_letters(GENERATED_LENGTH),
            cluster_secret: random_letters(GENERATED_LENGTH),
        }
    }
}

impl fmt::Debug for BrokerSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerSecrets")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("cluster_secret", &"<redacted>")
            .finish()
    }
}

fn random_letters(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| char::from(LETTERS[rng.gen_range(0..LETTERS.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let secrets = BrokerSecrets::generate();

        assert_eq!(secrets.username, "guest");
        for value in [&secrets.password, &secrets.cluster_secret] {
            assert_eq!(value.len(), 32);
            assert!(value.chars().all(|c| c.is_ascii_alphabetic()));
        }
        assert_ne!(secrets.password, secrets.cluster_secret);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let secrets = BrokerSecrets {
            username: "guest".to_string(),
            password: "hunter2".to_string(),
            cluster_secret: "COOKIE".to_string(),
        };

        let debug = format!("{secrets:?}");

        assert!(debug.contains("guest"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("COOKIE"));
    }
}
