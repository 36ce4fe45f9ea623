//! Error types for slide deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, rendering or reading a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The model completion contained no recognizable slides.
    #[error("Failed to generate slides: the completion contained no SLIDE markers")]
    NoSlides,

    /// The language model call failed or returned nothing usable.
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// The renderer was handed an empty slide sequence.
    #[error("Cannot render an empty deck")]
    EmptyDeck,

    /// ZIP archive error while encoding or reading a deck.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error while encoding or reading a deck.
    #[error("XML error: {0}")]
    XmlError(String),

    /// A package that could not be read back as a deck.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),
}

impl Error {
    /// Whether a user can reasonably retry the request (e.g. with a different topic).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoSlides | Self::GenerationError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::NoSlides.is_recoverable());
        assert!(Error::GenerationError("timeout".into()).is_recoverable());
        assert!(!Error::EmptyDeck.is_recoverable());
        assert!(!Error::ZipError("bad".into()).is_recoverable());
        assert!(!Error::XmlError("bad".into()).is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::EmptyDeck.to_string(), "Cannot render an empty deck");
        assert_eq!(
            Error::GenerationError("HTTP 500".into()).to_string(),
            "Generation error: HTTP 500"
        );
    }
}
