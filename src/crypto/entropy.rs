use crate::error::EntropyError;

/// A cryptographically secure source of random bytes.
///
/// Implementations must be safe to share between threads; a single source
/// backs every hasher that was built with it.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` completely or fail. Partial or predictable output is never acceptable.
    fn fill(&self, buf: &mut [u8]) -> Result<(), EntropyError>;
}

/// The operating system's random generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEntropy;

impl EntropySource for SystemEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buf).map_err(|e| EntropyError::new(format!("OS random generator: {e}")))
    }
}

impl<E: EntropySource + ?Sized> EntropySource for &E {
    fn fill(&self, buf: &mut [u8]) -> Result<(), EntropyError> {
        (**self).fill(buf)
    }
}

impl<E: EntropySource + ?Sized> EntropySource for std::sync::Arc<E> {
    fn fill(&self, buf: &mut [u8]) -> Result<(), EntropyError> {
        (**self).fill(buf)
    }
}
