//! Cryptographic primitives for password hashing.
//!
//! Provides the secure random source, PBKDF2 key derivation, and the salt token codec.

pub mod entropy;
pub mod kdf;
pub mod salt;

pub use entropy::{EntropySource, SystemEntropy};
pub use kdf::{DerivedKey, derive_key};
pub use salt::SaltRecord;

/// Separator between the iteration count and the salt in a salt token.
pub const TOKEN_SEPARATOR: char = '.';
/// Smallest salt size accepted by [`crate::HasherConfig`] (16 bytes).
pub const MIN_SALT_SIZE: usize = 16;
