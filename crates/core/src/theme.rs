//! Color themes applied to every slide of a deck.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// White, used for title-slide text and content backgrounds.
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Neutral gray, used for bullet text.
    pub const NEUTRAL_GRAY: Rgb = Rgb(80, 80, 80);

    /// Upper-case hex form as used by DrawingML `srgbClr` (e.g. `193264`).
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

/// The resolved colors for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSpec {
    pub dark: Rgb,
    pub accent: Rgb,
    pub white: Rgb,
    pub neutral_gray: Rgb,
}

/// Named presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Professional,
    Creative,
    Educational,
    Minimal,
    Bold,
    Modern,
}

impl Theme {
    /// Every theme, in menu order.
    pub const ALL: [Theme; 6] = [
        Theme::Professional,
        Theme::Creative,
        Theme::Educational,
        Theme::Minimal,
        Theme::Bold,
        Theme::Modern,
    ];

    /// Look up a theme by name, case-insensitively.
    ///
    /// Unknown names fall back to [`Theme::default`] rather than failing.
    pub fn from_name(name: &str) -> Self {
        let wanted = name.trim();
        match Self::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(wanted))
        {
            Some(theme) => theme,
            None => {
                log::warn!(
                    "Unknown style '{}', falling back to {}",
                    name,
                    Self::default().name()
                );
                Self::default()
            }
        }
    }

    /// Display name of the theme.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Professional => "Professional",
            Self::Creative => "Creative",
            Self::Educational => "Educational",
            Self::Minimal => "Minimal",
            Self::Bold => "Bold",
            Self::Modern => "Modern",
        }
    }

    /// The `(dark, accent)` color pair for this theme.
    pub fn colors(&self) -> (Rgb, Rgb) {
        match self {
            Self::Professional => (Rgb(25, 50, 100), Rgb(66, 135, 245)),
            Self::Creative => (Rgb(255, 87, 51), Rgb(255, 195, 0)),
            Self::Educational => (Rgb(46, 125, 50), Rgb(139, 195, 74)),
            Self::Minimal => (Rgb(33, 33, 33), Rgb(120, 120, 120)),
            Self::Bold => (Rgb(211, 47, 47), Rgb(245, 124, 0)),
            Self::Modern => (Rgb(102, 126, 234), Rgb(118, 75, 162)),
        }
    }

    /// Full color set including the fixed white and gray.
    pub fn spec(&self) -> ThemeSpec {
        let (dark, accent) = self.colors();
        ThemeSpec {
            dark,
            accent,
            white: Rgb::WHITE,
            neutral_gray: Rgb::NEUTRAL_GRAY,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_exact_and_case_insensitive() {
        assert_eq!(Theme::from_name("Creative"), Theme::Creative);
        assert_eq!(Theme::from_name("bold"), Theme::Bold);
        assert_eq!(Theme::from_name("  MODERN "), Theme::Modern);
    }

    #[test]
    fn test_unknown_name_falls_back() {
        assert_eq!(Theme::from_name("Psychedelic"), Theme::Professional);
        assert_eq!(Theme::from_name(""), Theme::Professional);
    }

    #[test]
    fn test_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), theme);
        }
    }

    #[test]
    fn test_spec_fixed_colors() {
        let spec = Theme::Minimal.spec();
        assert_eq!(spec.dark, Rgb(33, 33, 33));
        assert_eq!(spec.accent, Rgb(120, 120, 120));
        assert_eq!(spec.white, Rgb::WHITE);
        assert_eq!(spec.neutral_gray, Rgb(80, 80, 80));
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb(25, 50, 100).hex(), "193264");
        assert_eq!(Rgb(255, 255, 255).hex(), "FFFFFF");
        assert_eq!(Rgb(66, 135, 245).to_string(), "#4287F5");
    }
}
