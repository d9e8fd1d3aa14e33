//! Salted, iterated password hashing.
//!
//! A password is turned into a PBKDF2 key under a random salt. The salt and
//! the iteration count travel together as a salt token
//! (`"<iterations>.<base64(salt)>"`) stored next to the base64 key:
//!
//! ```no_run
//! use saltedkey::PasswordHasher;
//!
//! let hasher = PasswordHasher::default();
//! let credential = hasher.hash_credential("correct horse battery staple")?;
//!
//! assert!(hasher.verify_credential("correct horse battery staple", &credential));
//! assert!(!hasher.verify_credential("wrong password", &credential));
//! # Ok::<(), saltedkey::Error>(())
//! ```

mod config;
mod crypto;
mod error;
mod hasher;

pub use crate::config::{
    HashPrimitive, HasherConfig, ITERATIONS_COUNT, KEY_LENGTH, PASSWORD_CHARSET,
    RANDOM_PASSWORD_LENGTH, SALT_SIZE,
};
pub use crate::crypto::{DerivedKey, EntropySource, SaltRecord, SystemEntropy, derive_key};
pub use crate::error::{EntropyError, Error, MalformedToken, Result};
pub use crate::hasher::{Credential, GeneratedPassword, PasswordHasher};
