use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::HasherConfig;
use crate::crypto::{DerivedKey, EntropySource, SaltRecord, SystemEntropy, derive_key};
use crate::error::{Error, Result};

/// The persisted pair for one account: salt token and hash token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub salt_token: String,
    pub hash_token: String,
}

impl Credential {
    pub fn new(record: &SaltRecord, key: &DerivedKey) -> Self {
        Self {
            salt_token: record.encode(),
            hash_token: key.to_base64(),
        }
    }
}

/// A freshly generated password and the credential to store for it.
///
/// The plaintext is meant to be delivered once and never persisted.
pub struct GeneratedPassword {
    plaintext: Zeroizing<String>,
    credential: Credential,
}

impl GeneratedPassword {
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    pub fn salt_token(&self) -> &str {
        &self.credential.salt_token
    }

    pub fn hash_token(&self) -> &str {
        &self.credential.hash_token
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn into_parts(self) -> (Zeroizing<String>, Credential) {
        (self.plaintext, self.credential)
    }
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedPassword")
            .field("plaintext", &"<redacted>")
            .field("credential", &self.credential)
            .finish()
    }
}

/// PBKDF2 password hasher.
///
/// Safe to share across threads. Every [`PasswordHasher::hash`] call without an
/// explicit [`SaltRecord`] consumes the pending salt and leaves a new one behind,
/// so no two calls ever hash with the same salt.
pub struct PasswordHasher<E = SystemEntropy> {
    config: HasherConfig,
    entropy: E,
    pending: Mutex<Option<SaltRecord>>,
}

impl PasswordHasher<SystemEntropy> {
    pub fn new(config: HasherConfig) -> Result<Self> {
        Self::with_entropy(config, SystemEntropy)
    }
}

impl Default for PasswordHasher<SystemEntropy> {
    fn default() -> Self {
        Self {
            config: HasherConfig::default(),
            entropy: SystemEntropy,
            pending: Mutex::new(None),
        }
    }
}

impl<E: EntropySource> PasswordHasher<E> {
    pub fn with_entropy(config: HasherConfig, entropy: E) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            entropy,
            pending: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Generates a salt record with the configured size and iteration count.
    pub fn generate_salt(&self) -> Result<SaltRecord> {
        SaltRecord::generate(
            &self.entropy,
            self.config.salt_size(),
            self.config.iterations(),
        )
    }

    /// Derives a key from `plaintext`.
    ///
    /// With `record`, its salt and iteration count are used as-is. Without one,
    /// the pending salt is consumed and returned.
    pub fn hash(
        &self,
        plaintext: &str,
        record: Option<&SaltRecord>,
    ) -> Result<(DerivedKey, SaltRecord)> {
        let record = match record {
            Some(record) => record.clone(),
            None => self.take_pending_salt()?,
        };

        tracing::debug!(
            iterations = record.iterations(),
            salt_size = record.salt().len(),
            "hashing password"
        );
        let key = self.derive(plaintext, &record)?;
        Ok((key, record))
    }

    /// Hashes with a fresh salt and packs the result for storage.
    pub fn hash_credential(&self, plaintext: &str) -> Result<Credential> {
        let (key, record) = self.hash(plaintext, None)?;
        Ok(Credential::new(&record, &key))
    }

    /// Returns the base64 hash of `plaintext` under a stored salt token.
    pub fn hash_with_token(&self, plaintext: &str, salt_token: &str) -> Result<String> {
        let record = SaltRecord::decode(salt_token)?;
        Ok(self.derive(plaintext, &record)?.to_base64())
    }

    /// Checks `plaintext` against a stored hash and salt token.
    ///
    /// Fails closed: a malformed salt token yields `false`.
    pub fn verify_password(&self, plaintext: &str, stored_hash: &str, stored_salt: &str) -> bool {
        match self.try_verify_password(plaintext, stored_hash, stored_salt) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting credential with unusable stored state");
                false
            }
        }
    }

    /// Like [`PasswordHasher::verify_password`], but reports a malformed salt
    /// token as an error instead of `false`.
    pub fn try_verify_password(
        &self,
        plaintext: &str,
        stored_hash: &str,
        stored_salt: &str,
    ) -> Result<bool> {
        let computed = self.hash_with_token(plaintext, stored_salt)?;
        let matched = tokens_match(&computed, stored_hash);
        tracing::trace!(matched, "password verification finished");
        Ok(matched)
    }

    pub fn verify_credential(&self, plaintext: &str, credential: &Credential) -> bool {
        self.verify_password(plaintext, &credential.hash_token, &credential.salt_token)
    }

    /// Generates a random password of `length` characters from the configured
    /// charset and hashes it with a fresh salt.
    pub fn generate_random_password(&self, length: usize) -> Result<GeneratedPassword> {
        if length == 0 {
            return Err(Error::InvalidPasswordLength);
        }

        let mut raw = Zeroizing::new(vec![0u8; length]);
        self.entropy.fill(&mut raw)?;

        let charset = self.config.password_charset().as_bytes();
        let plaintext: Zeroizing<String> = Zeroizing::new(
            raw.iter()
                .map(|b| char::from(charset[usize::from(*b) % charset.len()]))
                .collect(),
        );

        let credential = self.hash_credential(&plaintext)?;
        Ok(GeneratedPassword {
            plaintext,
            credential,
        })
    }

    /// [`PasswordHasher::generate_random_password`] with the configured length.
    pub fn generate_default_random_password(&self) -> Result<GeneratedPassword> {
        self.generate_random_password(self.config.password_length())
    }

    fn derive(&self, plaintext: &str, record: &SaltRecord) -> Result<DerivedKey> {
        derive_key(
            plaintext.as_bytes(),
            record.salt(),
            record.iterations(),
            self.config.key_length(),
            self.config.primitive(),
        )
    }

    fn take_pending_salt(&self) -> Result<SaltRecord> {
        // slot only ever holds a complete record, so a poisoned lock is still usable
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        let record = match slot.take() {
            Some(record) => record,
            None => self.generate_salt()?,
        };

        match self.generate_salt() {
            Ok(next) => *slot = Some(next),
            Err(e) => tracing::warn!(error = %e, "could not pre-generate next salt"),
        }

        Ok(record)
    }
}

/// Constant-time comparison of two base64 tokens, ignoring ASCII whitespace.
fn tokens_match(computed: &str, stored: &str) -> bool {
    let computed = strip_whitespace(computed);
    let stored = strip_whitespace(stored);
    computed.as_slice().ct_eq(stored.as_slice()).into()
}

fn strip_whitespace(token: &str) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(
        token
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect(),
    )
}
