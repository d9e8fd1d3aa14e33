use thiserror::Error;

/// The secure random source could not supply bytes.
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropyError(String);

impl EntropyError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Why a stored salt token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedToken {
    #[error("missing '.' separator")]
    MissingSeparator,
    #[error("iteration count is not a positive integer")]
    InvalidIterations,
    #[error("salt is not valid standard base64")]
    InvalidSalt,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    EntropyUnavailable(#[from] EntropyError),

    #[error("malformed salt token: {0}")]
    MalformedSaltToken(#[from] MalformedToken),

    #[error("invalid hasher configuration: {0}")]
    InvalidConfig(String),

    #[error("random password length must be at least 1")]
    InvalidPasswordLength,

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

impl Error {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
