use std::sync::Arc;

use tracing::{error, warn};

use crate::middleware::metrics::track_auth_attempt;

/// Verifies caller keys against the configured bcrypt hash.
#[derive(Clone)]
pub struct KeyVerifier {
    key_hash: Arc<str>,
}

impl std::fmt::Debug for KeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVerifier")
            .field("key_hash", &"[REDACTED]")
            .finish()
    }
}

impl KeyVerifier {
    pub fn new(key_hash: impl Into<Arc<str>>) -> Self {
        Self {
            key_hash: key_hash.into(),
        }
    }

    /// Returns `true` only if `caller_key` matches the stored hash.
    ///
    /// bcrypt is deliberately slow, so the comparison runs on the blocking
    /// pool. Any verifier error counts as a mismatch.
    pub async fn verify(&self, caller_key: &str) -> bool {
        let key_hash = Arc::clone(&self.key_hash);
        let caller_key = caller_key.to_owned();

        let matched = match tokio::task::spawn_blocking(move || {
            bcrypt::verify(caller_key.as_bytes(), &key_hash)
        })
        .await
        {
            Ok(Ok(matched)) => matched,
            Ok(Err(e)) => {
                error!(error = %e, "bcrypt verification failed");
                false
            }
            Err(e) => {
                error!(error = %e, "bcrypt verification task failed");
                false
            }
        };

        if !matched {
            warn!("invalid caller key");
        }
        track_auth_attempt(matched);
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_matching_key_accepted() {
        let verifier = KeyVerifier::new(bcrypt::hash("hunter2", 4).unwrap());
        assert!(verifier.verify("hunter2").await);
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let verifier = KeyVerifier::new(bcrypt::hash("hunter2", 4).unwrap());
        assert!(!verifier.verify("hunter3").await);
        assert!(!verifier.verify("").await);
    }

    #[tokio::test]
    async fn test_malformed_hash_rejects_everything() {
        let verifier = KeyVerifier::new("definitely-not-bcrypt");
        assert!(!verifier.verify("definitely-not-bcrypt").await);
    }

    #[test]
    fn test_debug_redacts_hash() {
        let verifier = KeyVerifier::new("$2b$04$abcdefghijklmnopqrstuu");
        assert!(!format!("{:?}", verifier).contains("abcdef"));
    }
}
