//! Salt/iteration codec.
//!
//! Token format:
//! ```text
//! <ITERATIONS (decimal)> . <SALT (standard base64, padded)>
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;
use std::str::FromStr;

use super::{EntropySource, TOKEN_SEPARATOR};
use crate::error::{Error, MalformedToken, Result};

/// A salt together with the iteration count it was used with.
///
/// Created once per credential and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltRecord {
    iterations: u32,
    salt: Vec<u8>,
}

impl SaltRecord {
    /// Builds a record from known parts.
    ///
    /// # Errors
    ///
    /// Returns an error if `iterations` is zero or `salt` is empty.
    pub fn new(iterations: u32, salt: Vec<u8>) -> Result<Self> {
        if iterations == 0 {
            return Err(Error::invalid_config("iterations must be >= 1"));
        }
        if salt.is_empty() {
            return Err(Error::invalid_config("salt must not be empty"));
        }
        Ok(Self { iterations, salt })
    }

    /// Fills a fresh `size`-byte salt from `entropy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntropyUnavailable`] if the source fails. No salt is
    /// returned in that case, not even a zeroed one.
    pub fn generate<E: EntropySource + ?Sized>(
        entropy: &E,
        size: usize,
        iterations: u32,
    ) -> Result<Self> {
        let mut salt = vec![0u8; size];
        entropy.fill(&mut salt)?;
        Self::new(iterations, salt)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Serializes as `"<iterations>.<base64(salt)>"`.
    pub fn encode(&self) -> String {
        format!(
            "{}{TOKEN_SEPARATOR}{}",
            self.iterations,
            STANDARD.encode(&self.salt)
        )
    }

    /// Parses a salt token produced by [`SaltRecord::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSaltToken`] if:
    /// - there is no `.` separator
    /// - the iteration segment is not a positive decimal integer
    /// - the salt segment is empty or not padded standard base64
    pub fn decode(token: &str) -> Result<Self> {
        let (iter_part, salt_part) = token
            .split_once(TOKEN_SEPARATOR)
            .ok_or(MalformedToken::MissingSeparator)?;

        if iter_part.is_empty() || !iter_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MalformedToken::InvalidIterations.into());
        }
        let iterations: u32 = iter_part
            .parse()
            .map_err(|_| MalformedToken::InvalidIterations)?;
        if iterations == 0 {
            return Err(MalformedToken::InvalidIterations.into());
        }

        let salt = STANDARD
            .decode(salt_part)
            .map_err(|_| MalformedToken::InvalidSalt)?;
        if salt.is_empty() {
            return Err(MalformedToken::InvalidSalt.into());
        }

        Ok(Self { iterations, salt })
    }
}

impl fmt::Display for SaltRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SaltRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}
