//! Prompt construction for the slide-generation request.

use crate::theme::Theme;
use serde::{Deserialize, Serialize};

/// Smallest deck the generator will ask for.
pub const MIN_SLIDES: usize = 5;

/// Largest deck the generator will ask for.
pub const MAX_SLIDES: usize = 100;

/// Default number of slides.
pub const DEFAULT_SLIDES: usize = 10;

/// A requested slide count, always within [`MIN_SLIDES`, `MAX_SLIDES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideCount(usize);

impl SlideCount {
    /// Clamp a raw count into the supported range.
    pub fn clamp(requested: usize) -> Self {
        let count = requested.clamp(MIN_SLIDES, MAX_SLIDES);
        if count != requested {
            log::warn!(
                "Slide count {} out of range, using {}",
                requested,
                count
            );
        }
        Self(count)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for SlideCount {
    fn default() -> Self {
        Self(DEFAULT_SLIDES)
    }
}

/// Build the instruction text sent to the model.
///
/// The strict `SLIDE n:` / `TITLE:` / `CONTENT:` / `- ` layout requested here is
/// exactly what [`crate::parser::SlideParser`] understands.
pub fn build_prompt(topic: &str, count: SlideCount, style: Theme) -> String {
    let n = count.get();
    format!(
        r#"Create slideshow content about: "{topic}"

Rules:
- Exactly {n} slides
- Clear titles and bullet points
- First slide is a title slide
- Last slide is a conclusion
- Tone: {style}

FORMAT STRICTLY AS:

SLIDE 1:
TITLE: Title here
CONTENT:
- No bullets

SLIDE 2:
TITLE: Title
CONTENT:
- Bullet
- Bullet

Continue until slide {n}.
"#,
        topic = topic.trim(),
        n = n,
        style = style.name().to_lowercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_slides;

    #[test]
    fn test_clamp() {
        assert_eq!(SlideCount::clamp(0).get(), MIN_SLIDES);
        assert_eq!(SlideCount::clamp(12).get(), 12);
        assert_eq!(SlideCount::clamp(500).get(), MAX_SLIDES);
        assert_eq!(SlideCount::default().get(), DEFAULT_SLIDES);
    }

    #[test]
    fn test_prompt_mentions_topic_and_count() {
        let prompt = build_prompt("  the water cycle ", SlideCount::clamp(8), Theme::Educational);
        assert!(prompt.contains(r#"about: "the water cycle""#));
        assert!(prompt.contains("Exactly 8 slides"));
        assert!(prompt.contains("Continue until slide 8."));
        assert!(prompt.contains("Tone: educational"));
    }

    #[test]
    fn test_prompt_example_is_parseable() {
        let prompt = build_prompt("anything", SlideCount::default(), Theme::default());
        let slides = parse_slides(&prompt);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[1].bullets, vec!["Bullet", "Bullet"]);
    }
}
