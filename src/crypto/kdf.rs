use base64::{Engine as _, engine::general_purpose::STANDARD};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::HashPrimitive;
use crate::error::{Error, Result};

/// Output of the key derivation function.
///
/// The bytes are wiped on drop and equality is constant-time.
#[derive(Clone)]
pub struct DerivedKey(Zeroizing<Vec<u8>>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Standard base64 text, the form stored as a `hash_token`.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.as_bytes())
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes().ct_eq(other.as_bytes()).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Derive `key_length` bytes from `password` with PBKDF2-HMAC over `primitive`.
///
/// Deterministic for fixed inputs.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_length: usize,
    primitive: HashPrimitive,
) -> Result<DerivedKey> {
    if iterations == 0 {
        return Err(Error::Derivation("PBKDF2 iterations must be >= 1".into()));
    }
    if key_length == 0 {
        return Err(Error::Derivation("derived key length must be >= 1".into()));
    }

    tracing::debug!(iterations, key_length, salt_len = salt.len(), %primitive, "deriving key");

    let mut key = Zeroizing::new(vec![0u8; key_length]);
    match primitive {
        HashPrimitive::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut key),
        HashPrimitive::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key),
        HashPrimitive::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut key),
    }

    Ok(DerivedKey(key))
}
