use serde::Deserialize;

use super::argon2;
use super::errors::PasswordError;
use super::hmac;

/// Digest function applied to `(password, salt)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    /// HMAC-SHA256 keyed by the salt. Fast, not work-factor hardened.
    #[default]
    HmacSha256,
    /// Argon2id with default parameters.
    Argon2id,
}

/// Password hashing implementation.
///
/// Both algorithms share one contract: the digest depends only on the
/// password and the per-user salt, and verification recomputes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    algorithm: HashAlgorithm,
}

impl PasswordHasher {
    /// Create a new password hasher using the given algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash a plaintext password with the user's salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    /// * `salt` - Per-user random salt
    ///
    /// # Returns
    /// Hex-encoded digest
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str, salt: &str) -> Result<String, PasswordError> {
        match self.algorithm {
            HashAlgorithm::HmacSha256 => hmac::digest(password, salt),
            HashAlgorithm::Argon2id => argon2::digest(password, salt),
        }
    }

    /// Verify a password against a stored digest.
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Digest could not be recomputed
    pub fn verify(&self, password: &str, salt: &str, stored: &str) -> Result<bool, PasswordError> {
        match self.algorithm {
            HashAlgorithm::HmacSha256 => hmac::verify(password, salt, stored),
            HashAlgorithm::Argon2id => argon2::verify(password, salt, stored),
        }
    }
}
