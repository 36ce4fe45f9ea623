//! PPTX (Office Open XML) backend for generated slide decks.
//!
//! Renders slide records into .pptx packages (ZIP archives of XML parts)
//! and reads them back for verification.

pub mod layout;
pub mod media;
mod package;
pub mod reader;
pub mod renderer;
mod slide;
mod templates;
mod xml;

pub use layout::{Frame, StyleSheet};
pub use media::ImageFormat;
pub use reader::{DeckReader, DeckSummary, ShapeKind, ShapeSummary, SlideSummary};
pub use renderer::{DeckRenderer, SlideTemplate};
