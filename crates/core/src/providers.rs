//! Contracts for the external services a deck generator relies on.

use crate::error::Result;

/// A text completion service.
pub trait TextGenerator {
    /// Complete `prompt`. Transport and service failures are returned as
    /// [`crate::Error::GenerationError`]; an empty string is a valid (useless) answer.
    fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}

/// A stock-photo lookup.
///
/// Implementations must bound their own latency and report every failure
/// as `None`. Lookups for different slides may run concurrently.
pub trait ImageSource: Send + Sync {
    fn fetch_image(&self, query: &str) -> Option<Vec<u8>>;
}

/// An image source that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn fetch_image(&self, _query: &str) -> Option<Vec<u8>> {
        None
    }
}
