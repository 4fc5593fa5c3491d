use crate::config::PasswordConfig;
use crate::error::app_error::AppError;
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::OnceLock;

/// Salted, memory-hard password hashing (argon2id).
#[derive(Clone)]
pub struct Credentials {
    argon2: Argon2<'static>,
    /// Hash compared against when a login names an unknown user, so the
    /// response takes as long as a real verification.
    decoy: OnceLock<String>,
}

impl Credentials {
    #[allow(clippy::result_large_err)]
    pub fn new(config: &PasswordConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::password_hash("Invalid argon2 parameters", e))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceLock::new(),
        })
    }

    #[allow(clippy::result_large_err)]
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// False on mismatch and on a hash string that cannot be parsed.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Burn one verification's worth of work. Always false.
    pub fn verify_decoy(&self, password: &str) -> bool {
        let decoy = self
            .decoy
            .get_or_init(|| self.hash("decoy-password-never-matches").unwrap_or_default());
        let _ = self.verify(password, decoy);
        false
    }

    /// Hash on the blocking pool; argon2 is deliberately slow.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let credentials = self.clone();
        tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {}", e)))?
    }

    pub async fn verify_blocking(&self, password: String, hash: Option<String>) -> Result<bool, AppError> {
        let credentials = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => credentials.verify(&password, &hash),
            None => credentials.verify_decoy(&password),
        })
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fast_credentials;
    use proptest::prelude::*;

    #[test]
    fn hash_verifies_original_password_only() {
        let credentials = fast_credentials();
        let hash = credentials.hash("correct horse").unwrap();
        assert!(credentials.verify("correct horse", &hash));
        assert!(!credentials.verify("correct horsf", &hash));
        assert!(!credentials.verify("", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let credentials = fast_credentials();
        let a = credentials.hash("same").unwrap();
        let b = credentials.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(credentials.verify("same", &a));
        assert!(credentials.verify("same", &b));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        let credentials = fast_credentials();
        assert!(!credentials.verify("anything", "not-a-phc-string"));
        assert!(!credentials.verify("anything", ""));
    }

    #[test]
    fn hash_records_configured_algorithm() {
        let hash = fast_credentials().hash("pw").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn decoy_never_matches() {
        let credentials = fast_credentials();
        assert!(!credentials.verify_decoy("decoy-password-never-matches"));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let config = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };
        assert!(Credentials::new(&config).is_err());
    }

    #[rocket::async_test]
    async fn blocking_helpers_agree_with_sync_api() {
        let credentials = fast_credentials();
        let hash = credentials.hash_blocking("pw123456".to_string()).await.unwrap();
        assert!(credentials.verify_blocking("pw123456".to_string(), Some(hash.clone())).await.unwrap());
        assert!(!credentials.verify_blocking("pw123457".to_string(), Some(hash)).await.unwrap());
        assert!(!credentials.verify_blocking("pw123456".to_string(), None).await.unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn verify_accepts_exactly_the_hashed_password(password in ".{0,32}", other in ".{0,32}") {
            let credentials = fast_credentials();
            let hash = credentials.hash(&password).unwrap();
            prop_assert!(credentials.verify(&password, &hash));
            if other != password {
                prop_assert!(!credentials.verify(&other, &hash));
            }
        }
    }
}
