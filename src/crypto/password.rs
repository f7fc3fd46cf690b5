//! Password hashing using Argon2id
//!
//! Produces PHC-format hash strings (salt and parameters embedded) that can
//! be stored on account records and verified later.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::HashingParams;
use crate::error::{OrtomatError, OrtomatResult};

/// One-way credential hashing used when restoring accounts
pub trait CredentialHasher {
    /// Hash a plaintext password
    fn hash(&self, plaintext: &str) -> OrtomatResult<String>;

    /// Check a plaintext password against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> OrtomatResult<bool>;
}

/// Argon2id hasher with configurable cost
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher from configured cost parameters
    pub fn new(params: &HashingParams) -> OrtomatResult<Self> {
        let params = Params::new(params.memory_cost, params.time_cost, params.parallelism, None)
            .map_err(|e| OrtomatError::Credential(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> OrtomatResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| OrtomatError::Credential(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> OrtomatResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| OrtomatError::Credential(format!("Malformed password hash: {}", e)))?;

        // Cost parameters come from the hash itself
        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(OrtomatError::Credential(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }
}
