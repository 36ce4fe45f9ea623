//! Slide-text parser.
//!
//! Turns a loosely formatted model completion into slide records:
//!
//! ```text
//! SLIDE 1:
//! TITLE: Title here
//! CONTENT:
//! - First point
//! - Second point
//! ```
//!
//! Parsing is permissive. Unrecognized lines are dropped, and the only
//! failure signal is an empty result.

use crate::types::{SlideRecord, SlideSequence};

const SLIDE_MARKER: &str = "SLIDE";
const TITLE_PREFIX: &str = "TITLE:";
const BULLET_PREFIXES: [&str; 2] = ["- ", "• "];
const BARE_BULLETS: [&str; 2] = ["-", "•"];

/// What a single trimmed line means to the parser.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    SlideMarker,
    Title(&'a str),
    Bullet(&'a str),
    Other,
}

impl<'a> Line<'a> {
    /// Classify a trimmed line. The first matching rule wins.
    fn classify(line: &'a str) -> Self {
        if line.starts_with(SLIDE_MARKER) {
            return Self::SlideMarker;
        }
        if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
            return Self::Title(rest.trim());
        }
        if let Some(rest) = BULLET_PREFIXES.iter().find_map(|p| line.strip_prefix(p)) {
            return Self::Bullet(rest.trim());
        }
        // Trimming eats the space after a lone bullet glyph.
        if BARE_BULLETS.contains(&line) {
            return Self::Bullet("");
        }
        Self::Other
    }
}

/// Parser state: either waiting for the first marker or filling a slide.
#[derive(Debug)]
enum State {
    Idle,
    InSlide(SlideRecord),
}

/// Parser for `SLIDE`/`TITLE:`/bullet formatted completions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideParser;

impl SlideParser {
    /// Create a new slide parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a completion into slides, in marker order.
    ///
    /// Never fails; an empty result means no `SLIDE` marker was found.
    pub fn parse(&self, text: &str) -> SlideSequence {
        let mut slides = Vec::new();
        let mut state = State::Idle;
        let mut ignored = 0usize;

        for raw in text.lines() {
            let line = raw.trim();
            state = match (state, Line::classify(line)) {
                (State::Idle, Line::SlideMarker) => State::InSlide(SlideRecord::default()),
                (State::InSlide(done), Line::SlideMarker) => {
                    slides.push(done);
                    State::InSlide(SlideRecord::default())
                }
                (State::InSlide(mut slide), Line::Title(title)) => {
                    slide.title = title.to_string();
                    State::InSlide(slide)
                }
                (State::InSlide(mut slide), Line::Bullet(bullet)) => {
                    slide.bullets.push(bullet.to_string());
                    State::InSlide(slide)
                }
                (state, Line::Other) if line.is_empty() => state,
                (state, _) => {
                    ignored += 1;
                    state
                }
            };
        }

        if let State::InSlide(last) = state {
            slides.push(last);
        }

        log::debug!(
            "Parsed {} slides ({} lines ignored)",
            slides.len(),
            ignored
        );

        slides
    }
}

/// Parse a completion with the default parser.
pub fn parse_slides(text: &str) -> SlideSequence {
    SlideParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(parse_slides("").is_empty());
    }

    #[test]
    fn test_no_slide_marker() {
        let text = "TITLE: Orphan\n- bullet\nSome prose from the model.";
        assert!(parse_slides(text).is_empty());
    }

    #[test]
    fn test_single_slide_with_bullets() {
        let slides = parse_slides("SLIDE 1:\nTITLE: X\nCONTENT:\n- one\n- two\n");
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "X");
        assert_eq!(slides[0].bullets, vec!["one", "two"]);
    }

    #[test]
    fn test_dot_bullets() {
        let slides = parse_slides("SLIDE 1:\n• a\n");
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "");
        assert_eq!(slides[0].bullets, vec!["a"]);
    }

    #[test]
    fn test_slide_count_matches_markers() {
        let text = "\
SLIDE 1:
TITLE: Intro
CONTENT:
- No bullets

SLIDE 2:
TITLE: Middle
CONTENT:
- a
- b

SLIDE 3:
TITLE: End
";
        let slides = parse_slides(text);
        assert_eq!(slides.len(), 3);
        let titles: Vec<_> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Middle", "End"]);
        assert!(slides[2].bullets.is_empty());
    }

    #[test]
    fn test_marker_numbers_not_validated() {
        let slides = parse_slides("SLIDE 7:\nTITLE: A\nSLIDE 2:\nTITLE: B\nSLIDE:\nTITLE: C");
        let titles: Vec<_> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_last_title_wins() {
        let slides = parse_slides("SLIDE 1:\nTITLE: A\n- x\nTITLE: B\n");
        assert_eq!(slides[0].title, "B");
        assert_eq!(slides[0].bullets, vec!["x"]);
    }

    #[test]
    fn test_lines_before_first_marker_ignored() {
        let text = "Here is your deck!\nTITLE: Ignored\n- ignored\nSLIDE 1:\nTITLE: Kept";
        let slides = parse_slides(text);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Kept");
        assert!(slides[0].bullets.is_empty());
    }

    #[test]
    fn test_whitespace_trimmed() {
        let slides = parse_slides("   SLIDE 1:  \n\tTITLE:   Spaced Out   \n   -    padded   \r\n");
        assert_eq!(slides[0].title, "Spaced Out");
        assert_eq!(slides[0].bullets, vec!["padded"]);
    }

    #[test]
    fn test_empty_bullets_preserved() {
        let slides = parse_slides("SLIDE 1:\n- first\n- \n-\n•\n- last");
        assert_eq!(slides[0].bullets, vec!["first", "", "", "", "last"]);
    }

    #[test]
    fn test_non_bullet_dashes_ignored() {
        let slides = parse_slides("SLIDE 1:\n---\n-no space\n* star\n1. numbered");
        assert!(slides[0].bullets.is_empty());
    }

    #[test]
    fn test_prefixes_are_case_sensitive() {
        let slides = parse_slides("slide 1:\nSLIDE 1:\ntitle: lower\nTITLE: Upper");
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Upper");
    }

    #[test]
    fn test_content_label_ignored() {
        let slides = parse_slides("SLIDE 1:\nTITLE: T\nCONTENT:\n- a");
        assert_eq!(slides[0].bullets, vec!["a"]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Line::classify("SLIDE 3:"), Line::SlideMarker);
        assert_eq!(Line::classify("TITLE: Hi"), Line::Title("Hi"));
        assert_eq!(Line::classify("- x"), Line::Bullet("x"));
        assert_eq!(Line::classify("• x"), Line::Bullet("x"));
        assert_eq!(Line::classify("-"), Line::Bullet(""));
        assert_eq!(Line::classify("CONTENT:"), Line::Other);
    }
}
