//! Credential hashing - one-way transform of plaintext passwords.
//!
//! Argon2id with a fresh random salt per call. The salt and parameters
//! are embedded in the PHC string, so verification needs nothing but
//! the stored secret.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Password hashing capability used by the registration workflow.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing secret.
    ///
    /// # Errors
    /// Returns an internal error if hashing fails. Callers must abort the
    /// request; there is no plaintext fallback.
    fn hash(&self, plaintext: &str) -> AppResult<String>;

    /// Check a plaintext password against a stored secret.
    fn verify(&self, plaintext: &str, secret: &str) -> bool;
}

/// Argon2id hasher with the crate's recommended default parameters.
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, secret: &str) -> bool {
        // Digest comparison inside verify_password is constant-time
        match PasswordHash::new(secret) {
            Ok(parsed) => Self::argon2()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored secret is not a valid PHC string: {}", e);
                false
            }
        }
    }
}
