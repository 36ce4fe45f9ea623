//! Default positions, sizes and font sizes for the three slide templates.
//!
//! All geometry is in inches on a 10 × 5.625 canvas and converted to EMUs
//! only when XML is written.

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Canvas width in inches.
pub const SLIDE_WIDTH: f64 = 10.0;

/// Canvas height in inches.
pub const SLIDE_HEIGHT: f64 = 5.625;

/// Convert inches to EMUs.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// A positioned box, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `(x, y, cx, cy)` in EMUs.
    pub fn to_emu(&self) -> (i64, i64, i64, i64) {
        (emu(self.x), emu(self.y), emu(self.width), emu(self.height))
    }
}

/// Geometry and type sizes for every element the renderer places.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub title_background: Frame,
    pub title_text: Frame,
    pub author_line: Frame,
    pub accent_bar: Frame,
    pub content_title: Frame,
    pub content_title_with_image: Frame,
    pub bullets: Frame,
    pub bullets_with_image: Frame,
    pub image: Frame,

    /// Font sizes in points.
    pub title_slide_title_pt: u32,
    pub author_pt: u32,
    pub content_title_pt: u32,
    pub content_title_with_image_pt: u32,
    pub bullet_pt: u32,
    pub bullet_with_image_pt: u32,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            title_background: Frame::new(0.0, 0.0, SLIDE_WIDTH, SLIDE_HEIGHT),
            title_text: Frame::new(1.0, 2.0, 8.0, 1.5),
            author_line: Frame::new(1.0, 3.7, 8.0, 0.6),
            accent_bar: Frame::new(0.0, 0.0, SLIDE_WIDTH, 0.2),
            content_title: Frame::new(0.5, 0.5, 9.0, 0.8),
            content_title_with_image: Frame::new(0.5, 0.5, 5.0, 0.8),
            bullets: Frame::new(1.2, 1.8, 7.6, 3.2),
            bullets_with_image: Frame::new(0.8, 1.7, 4.4, 3.3),
            image: Frame::new(5.5, 1.2, 4.0, 3.8),

            title_slide_title_pt: 48,
            author_pt: 20,
            content_title_pt: 34,
            content_title_with_image_pt: 28,
            bullet_pt: 20,
            bullet_with_image_pt: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_in_emu() {
        assert_eq!(emu(SLIDE_WIDTH), 9_144_000);
        assert_eq!(emu(SLIDE_HEIGHT), 5_143_500);
    }

    #[test]
    fn test_frame_to_emu() {
        let frame = Frame::new(0.5, 1.2, 4.0, 0.2);
        assert_eq!(frame.to_emu(), (457_200, 1_097_280, 3_657_600, 182_880));
    }

    #[test]
    fn test_image_column_fits_canvas() {
        let sheet = StyleSheet::default();
        assert!(sheet.image.x + sheet.image.width <= SLIDE_WIDTH);
        assert!(sheet.image.y + sheet.image.height <= SLIDE_HEIGHT);
        assert!(sheet.bullets_with_image.x + sheet.bullets_with_image.width <= sheet.image.x);
    }
}
