//! Tunable hasher parameters.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::crypto::MIN_SALT_SIZE;
use crate::error::{Error, Result};

/// Default number of PBKDF2 rounds.
pub const ITERATIONS_COUNT: u32 = 15000;
/// Default salt size in bytes.
pub const SALT_SIZE: usize = 64;
/// Default derived key length in bytes.
pub const KEY_LENGTH: usize = 64;
/// Default alphabet for generated passwords.
pub const PASSWORD_CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/*-+!@#$%^&()_~`|";
/// Default length of generated passwords.
pub const RANDOM_PASSWORD_LENGTH: usize = 10;

/// Hash function driving the HMAC inside PBKDF2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashPrimitive {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl fmt::Display for HashPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashPrimitive::Sha1 => "hmac-sha1",
            HashPrimitive::Sha256 => "hmac-sha256",
            HashPrimitive::Sha512 => "hmac-sha512",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HasherConfig {
    salt_size: usize,
    key_length: usize,
    iterations: u32,
    primitive: HashPrimitive,
    password_charset: String,
    password_length: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            salt_size: SALT_SIZE,
            key_length: KEY_LENGTH,
            iterations: ITERATIONS_COUNT,
            primitive: HashPrimitive::Sha1,
            password_charset: PASSWORD_CHARSET.to_string(),
            password_length: RANDOM_PASSWORD_LENGTH,
        }
    }
}

impl HasherConfig {
    pub fn new(
        salt_size: usize,
        key_length: usize,
        iterations: u32,
        primitive: HashPrimitive,
    ) -> Result<Self> {
        let config = Self {
            salt_size,
            key_length,
            iterations,
            primitive,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("failed to parse hasher configuration")?;
        config.validate().context("invalid hasher configuration")?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_salt_size(mut self, salt_size: usize) -> Self {
        self.salt_size = salt_size;
        self
    }

    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length = key_length;
        self
    }

    pub fn with_primitive(mut self, primitive: HashPrimitive) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn with_password_charset(mut self, charset: impl Into<String>) -> Self {
        self.password_charset = charset.into();
        self
    }

    pub fn with_password_length(mut self, length: usize) -> Self {
        self.password_length = length;
        self
    }

    pub fn salt_size(&self) -> usize {
        self.salt_size
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn primitive(&self) -> HashPrimitive {
        self.primitive
    }

    pub fn password_charset(&self) -> &str {
        &self.password_charset
    }

    pub fn password_length(&self) -> usize {
        self.password_length
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(Error::invalid_config("iterations must be >= 1"));
        }
        if self.salt_size < MIN_SALT_SIZE {
            return Err(Error::invalid_config(format!(
                "salt size must be >= {MIN_SALT_SIZE} bytes"
            )));
        }
        if self.key_length < 1 {
            return Err(Error::invalid_config("key length must be >= 1"));
        }
        if self.password_length < 1 {
            return Err(Error::invalid_config("password length must be >= 1"));
        }

        let charset = self.password_charset.as_bytes();
        if charset.is_empty() {
            return Err(Error::invalid_config("password charset is empty"));
        }
        if !charset.iter().all(|b| b.is_ascii_graphic()) {
            return Err(Error::invalid_config(
                "password charset must be printable ASCII",
            ));
        }
        let mut seen = HashSet::with_capacity(charset.len());
        if !charset.iter().all(|b| seen.insert(*b)) {
            return Err(Error::invalid_config(
                "password charset contains duplicates",
            ));
        }
        Ok(())
    }
}
