//! Domain types for representing slide content and rendered decks.

use crate::theme::{Theme, ThemeSpec};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Characters that cannot appear in a suggested file name.
static UNSAFE_FILENAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ /\\]").unwrap());

/// Maximum number of title characters kept in a suggested file name.
pub const MAX_FILENAME_STEM_CHARS: usize = 40;

/// File name used when the deck has no usable title.
pub const DEFAULT_FILENAME: &str = "presentation.pptx";

/// One slide's content, as extracted from a model completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Slide title. Empty if the completion never supplied a `TITLE:` line.
    pub title: String,

    /// Bullet lines in presentation order. May contain empty strings.
    pub bullets: Vec<String>,
}

impl SlideRecord {
    /// Create a slide with the given title and no bullets.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
        }
    }

    /// Builder: append a bullet.
    pub fn with_bullet(mut self, bullet: impl Into<String>) -> Self {
        self.bullets.push(bullet.into());
        self
    }
}

/// Ordered slides, one per `SLIDE` marker found in the completion.
pub type SlideSequence = Vec<SlideRecord>;

/// Configuration for a single render call.
///
/// Built once through the `with_*` methods and then only read.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    theme: ThemeSpec,
    author_name: Option<String>,
    include_images: bool,
    images: HashMap<usize, Vec<u8>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl RenderOptions {
    /// Create options for the given theme, no author and no images.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme: theme.spec(),
            author_name: None,
            include_images: false,
            images: HashMap::new(),
        }
    }

    /// Set the author shown on the title slide. Blank names are dropped.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        let author = author.into();
        let author = author.trim();
        self.author_name = (!author.is_empty()).then(|| author.to_string());
        self
    }

    /// Set whether slide images should be embedded.
    pub fn with_include_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Attach image bytes for the slide at `index` (0-based).
    pub fn with_image(mut self, index: usize, bytes: Vec<u8>) -> Self {
        self.images.insert(index, bytes);
        self
    }

    /// Attach several images at once.
    pub fn with_images(mut self, images: impl IntoIterator<Item = (usize, Vec<u8>)>) -> Self {
        self.images.extend(images);
        self
    }

    /// The colors used for this render.
    pub fn theme(&self) -> &ThemeSpec {
        &self.theme
    }

    /// The author name, if one was given and is not blank.
    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    /// Whether images are enabled for this render.
    pub fn include_images(&self) -> bool {
        self.include_images
    }

    /// Image bytes for a slide, only when images are enabled and the bytes are non-empty.
    pub fn image_for(&self, index: usize) -> Option<&[u8]> {
        if !self.include_images {
            return None;
        }
        self.images
            .get(&index)
            .map(Vec::as_slice)
            .filter(|bytes| !bytes.is_empty())
    }
}

/// A rendered deck, ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct DeckArtifact {
    /// The encoded `.pptx` package.
    pub bytes: Vec<u8>,

    /// Suggested file name derived from the first slide title.
    pub file_name: String,

    /// Number of slides in the package.
    pub slide_count: usize,
}

/// Build a file name from the first slide's title.
///
/// The title is trimmed, truncated to [`MAX_FILENAME_STEM_CHARS`] characters and
/// has spaces and path separators replaced with underscores.
pub fn suggested_file_name(slides: &[SlideRecord]) -> String {
    let title = slides.first().map(|s| s.title.trim()).unwrap_or_default();
    if title.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }

    let truncated: String = title.chars().take(MAX_FILENAME_STEM_CHARS).collect();
    let stem = UNSAFE_FILENAME_REGEX.replace_all(truncated.trim_end(), "_");
    format!("{}.pptx", stem)
}
