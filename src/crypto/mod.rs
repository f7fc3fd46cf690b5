//! Credential hashing for Ortomat
//!
//! Restored accounts get a freshly hashed temporary password; this module
//! provides the hashing seam and its Argon2id implementation.

pub mod password;

pub use password::{Argon2Hasher, CredentialHasher};
