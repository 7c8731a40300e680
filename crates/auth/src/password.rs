//! One-way password encoding.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to hash password: {0}")]
pub struct HashingError(pub String);

/// Opaque encode/verify capability for stored credentials.
pub trait PasswordEncoder: Send + Sync {
    /// Produce a salted one-way hash of `plain`.
    fn encode(&self, plain: &str) -> Result<String, HashingError>;

    /// Whether `plain` matches `hash`. Unparseable hashes never match.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id with the crate's default parameters, PHC string output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordEncoder;

impl Argon2PasswordEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, plain: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
                return false;
            }
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}
