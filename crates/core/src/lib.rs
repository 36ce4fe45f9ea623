//! Core domain types, slide-text parsing, themes and prompts
//! for generating slide decks from a topic.

pub mod error;
pub mod parser;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod theme;
pub mod types;

pub use error::{Error, Result};
pub use parser::{parse_slides, SlideParser};
pub use prompt::{build_prompt, SlideCount};
pub use providers::{ImageSource, NoImages, TextGenerator};
pub use session::{Role, Session, Turn};
pub use theme::{Rgb, Theme, ThemeSpec};
pub use types::{suggested_file_name, DeckArtifact, RenderOptions, SlideRecord, SlideSequence};
