//! Password hashing with Argon2id.

use std::sync::{Arc, OnceLock};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::AuthError;

/// Hashed once per codec so missing accounts cost the same as wrong passwords.
const ABSENT_ACCOUNT_PASSWORD: &str = "absent-account-placeholder";

/// One-way password codec.
///
/// Every hash gets a fresh random salt, so hashing the same password twice
/// yields different PHC strings that both verify.
#[derive(Clone)]
pub struct PasswordCodec {
    argon2: Argon2<'static>,
    pub(super) absent_hash: Arc<OnceLock<String>>,
}

impl Default for PasswordCodec {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl std::fmt::Debug for PasswordCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCodec").finish_non_exhaustive()
    }
}

impl PasswordCodec {
    /// Create a codec with explicit Argon2id cost parameters.
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            absent_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Hash a password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the hasher fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Check a password against a stored PHC string.
    ///
    /// Comparison is constant-time. A malformed stored hash verifies as
    /// `false` rather than erroring.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Hash of a fixed password under this codec's parameters, built on first use.
    fn absent_account_hash(&self) -> &str {
        self.absent_hash
            .get_or_init(|| self.hash(ABSENT_ACCOUNT_PASSWORD).unwrap_or_default())
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the hasher fails or the task panics.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let codec = self.clone();
        tokio::task::spawn_blocking(move || codec.hash(&password))
            .await
            .map_err(|_| AuthError::PasswordHash)?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the task panics.
    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let codec = self.clone();
        tokio::task::spawn_blocking(move || codec.verify(&password, &hash))
            .await
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Spend one verification's worth of Argon2 work for an account that was
    /// not found. Never matches.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the task panics.
    pub async fn verify_absent_blocking(&self, password: String) -> Result<(), AuthError> {
        let codec = self.clone();
        tokio::task::spawn_blocking(move || {
            let _ = codec.verify(&password, codec.absent_account_hash());
        })
        .await
        .map_err(|_| AuthError::PasswordHash)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Low-cost parameters so tests don't spend seconds per hash.
    pub(crate) fn cheap_codec() -> PasswordCodec {
        PasswordCodec::new(Params::new(1024, 1, 1, None).unwrap())
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let codec = cheap_codec();
        let hash = codec.hash("Password123").unwrap();
        assert_ne!(hash, "Password123");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_roundtrip_and_mismatch() {
        let codec = cheap_codec();
        for password in ["p", "Password123", "ünïcødé-Paß1", " spaced out "] {
            let hash = codec.hash(password).unwrap();
            assert!(codec.verify(password, &hash));
            assert!(!codec.verify(&format!("{password}x"), &hash));
        }
    }

    #[test]
    fn test_salts_differ() {
        let codec = cheap_codec();
        let a = codec.hash("Password123").unwrap();
        let b = codec.hash("Password123").unwrap();
        assert_ne!(a, b);
        assert!(codec.verify("Password123", &a));
        assert!(codec.verify("Password123", &b));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let codec = cheap_codec();
        assert!(!codec.verify("Password123", "not-a-phc-string"));
        assert!(!codec.verify("Password123", ""));
    }

    #[test]
    fn test_hash_from_other_params_still_verifies() {
        let strong = PasswordCodec::new(Params::new(2048, 2, 1, None).unwrap());
        let hash = strong.hash("Password123").unwrap();
        assert!(cheap_codec().verify("Password123", &hash));
    }

    #[tokio::test]
    async fn test_absent_account_verification_runs_argon2() {
        let codec = cheap_codec();
        let clone = codec.clone();
        assert!(codec.absent_hash.get().is_none());

        codec
            .verify_absent_blocking(ABSENT_ACCOUNT_PASSWORD.to_owned())
            .await
            .unwrap();

        let hash = clone.absent_hash.get().unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(codec.verify(ABSENT_ACCOUNT_PASSWORD, hash));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let codec = cheap_codec();
        let hash = codec.hash_blocking("Password123".to_owned()).await.unwrap();
        assert!(
            codec
                .verify_blocking("Password123".to_owned(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !codec
                .verify_blocking("Password124".to_owned(), hash)
                .await
                .unwrap()
        );
    }
}
