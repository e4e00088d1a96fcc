//! Password hashing and token generation.

use argon2::{Algorithm, Argon2, Params, PasswordVerifier as _, Version};
use password_hash::{PasswordHash, PasswordHasher as _, SaltString};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::AuthError;

/// Default token length in characters.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Pluggable password hashing. The default implementation is [`Argon2Hasher`].
///
/// ```rust
/// use portcullis::crypto::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::default();
/// let hash = hasher.hash("fake_password").unwrap();
/// assert!(hasher.verify("fake_password", &hash).unwrap());
/// assert!(!hasher.verify("wrong_fake_password", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if hashing fails.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Returns `Ok(false)` on a mismatch.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if the stored hash is malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id hasher with configurable cost parameters.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB - argon2 default
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// 64 MiB memory, 3 iterations, 4 lanes.
    #[must_use]
    pub fn production() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

        // params are read from the hash itself
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Random alphanumeric token, about 5.95 bits of entropy per character.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// SHA-256 of a token, hex encoded. Tokens are high-entropy so a fast hash is enough.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length_and_alphabet() {
        let token = generate_token(48);
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(generate_token(DEFAULT_TOKEN_LENGTH), generate_token(DEFAULT_TOKEN_LENGTH));
    }

    #[test]
    fn test_production_hash_verifies_with_any_instance() {
        let hash = Argon2Hasher::production().hash("fake_password").unwrap();
        assert!(hash.contains("m=65536,t=3,p=4"));
        assert!(Argon2Hasher::default().verify("fake_password", &hash).unwrap());
    }

    #[test]
    fn test_hash_token() {
        assert_eq!(hash_token("abc123"), hash_token("abc123"));
        assert_ne!(hash_token("token1"), hash_token("token2"));
        assert_eq!(hash_token("anytoken").len(), 64);
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = Argon2Hasher::default();
        let hash = hasher.hash("fake_password").unwrap();

        assert!(hasher.verify("fake_password", &hash).unwrap());
        assert!(!hasher.verify("wrong_fake_password", &hash).unwrap());
    }

    #[test]
    fn test_argon2_malformed_hash() {
        let hasher = Argon2Hasher::default();
        assert_eq!(
            hasher.verify("fake_password", "not-a-phc-string"),
            Err(AuthError::PasswordHashError)
        );
    }
}
