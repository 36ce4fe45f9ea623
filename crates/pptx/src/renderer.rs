//! Deck renderer: lays out slide records and encodes them as a `.pptx` package.

use crate::layout::StyleSheet;
use crate::media::EmbeddedImage;
use crate::package::{write_package, DocProps, RenderedSlide};
use crate::slide::{Align, Paragraph, Shape, SlideContent, TextStyle};
use deck_core::{
    suggested_file_name, DeckArtifact, Error, RenderOptions, Result, SlideRecord, ThemeSpec,
};

/// Which layout a slide is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideTemplate {
    /// Dark full-canvas background, centered title and optional author line.
    Title,
    /// White background, accent bar, title and full-width bullets.
    Content,
    /// Content layout with text in the left column and a picture on the right.
    ContentWithImage,
}

/// Renders slide sequences into `.pptx` artifacts.
#[derive(Debug, Clone, Default)]
pub struct DeckRenderer {
    style: StyleSheet,
}

impl DeckRenderer {
    /// Create a renderer with the default style sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `slides` into a deck, one slide per record.
    ///
    /// Fails with [`Error::EmptyDeck`] when `slides` is empty, and with an
    /// encoding error if the package cannot be produced. Images that cannot
    /// be embedded are skipped and the slide falls back to the text layout.
    pub fn render(&self, slides: &[SlideRecord], options: &RenderOptions) -> Result<DeckArtifact> {
        if slides.is_empty() {
            return Err(Error::EmptyDeck);
        }

        let rendered: Vec<RenderedSlide<'_>> = slides
            .iter()
            .enumerate()
            .map(|(index, slide)| {
                let image = self.embeddable_image(index, options);
                let content = match self.template_for(index, image.is_some()) {
                    SlideTemplate::Title => self.title_slide(slide, options),
                    SlideTemplate::Content => self.content_slide(slide, options.theme(), false),
                    SlideTemplate::ContentWithImage => {
                        self.content_slide(slide, options.theme(), true)
                    }
                };
                RenderedSlide { content, image }
            })
            .collect();

        let images = rendered.iter().filter(|s| s.content.has_picture()).count();
        log::debug!(
            "Encoding {} slides ({} with images)",
            rendered.len(),
            images
        );

        let props = DocProps {
            title: slides[0].title.trim(),
            creator: options.author_name(),
        };
        let bytes = write_package(&rendered, &props)?;

        Ok(DeckArtifact {
            bytes,
            file_name: suggested_file_name(slides),
            slide_count: slides.len(),
        })
    }

    /// The template used for the slide at `index`.
    pub fn template_for(&self, index: usize, has_image: bool) -> SlideTemplate {
        match (index, has_image) {
            (0, _) => SlideTemplate::Title,
            (_, false) => SlideTemplate::Content,
            (_, true) => SlideTemplate::ContentWithImage,
        }
    }

    /// Image for a content slide, if present and embeddable.
    fn embeddable_image<'a>(
        &self,
        index: usize,
        options: &'a RenderOptions,
    ) -> Option<EmbeddedImage<'a>> {
        if index == 0 {
            return None;
        }
        let data = options.image_for(index)?;
        match EmbeddedImage::prepare(data) {
            Ok(image) => {
                log::debug!(
                    "Slide {}: embedding {}x{} {}",
                    index + 1,
                    image.width,
                    image.height,
                    image.format.mime_type()
                );
                Some(image)
            }
            Err(reason) => {
                log::warn!(
                    "Skipping image for slide {}: {}",
                    index + 1,
                    reason
                );
                None
            }
        }
    }

    fn title_slide(&self, slide: &SlideRecord, options: &RenderOptions) -> SlideContent {
        let theme = options.theme();
        let mut content = SlideContent::default();

        content.push(Shape::Rect {
            name: "Background",
            frame: self.style.title_background,
            fill: theme.dark,
        });
        content.push(Shape::Text {
            name: "Title",
            frame: self.style.title_text,
            paragraphs: vec![Paragraph {
                text: slide.title.clone(),
                style: TextStyle {
                    size_pt: self.style.title_slide_title_pt,
                    bold: true,
                    color: theme.white,
                    align: Align::Center,
                },
                bullet: false,
            }],
        });

        if let Some(author) = options.author_name() {
            content.push(Shape::Text {
                name: "Author",
                frame: self.style.author_line,
                paragraphs: vec![Paragraph {
                    text: format!("by {}", author),
                    style: TextStyle {
                        size_pt: self.style.author_pt,
                        bold: false,
                        color: theme.accent,
                        align: Align::Center,
                    },
                    bullet: false,
                }],
            });
        }

        content
    }

    fn content_slide(&self, slide: &SlideRecord, theme: &ThemeSpec, with_image: bool) -> SlideContent {
        let style = &self.style;
        let (title_frame, title_pt, bullet_frame, bullet_pt) = if with_image {
            (
                style.content_title_with_image,
                style.content_title_with_image_pt,
                style.bullets_with_image,
                style.bullet_with_image_pt,
            )
        } else {
            (
                style.content_title,
                style.content_title_pt,
                style.bullets,
                style.bullet_pt,
            )
        };

        let mut content = SlideContent {
            background: Some(theme.white),
            shapes: Vec::new(),
        };

        content.push(Shape::Rect {
            name: "Accent Bar",
            frame: style.accent_bar,
            fill: theme.accent,
        });
        content.push(Shape::Text {
            name: "Title",
            frame: title_frame,
            paragraphs: vec![Paragraph {
                text: slide.title.clone(),
                style: TextStyle {
                    size_pt: title_pt,
                    bold: true,
                    color: theme.dark,
                    align: Align::Left,
                },
                bullet: false,
            }],
        });

        if !slide.bullets.is_empty() {
            let bullet_style = TextStyle {
                size_pt: bullet_pt,
                bold: false,
                color: theme.neutral_gray,
                align: Align::Left,
            };
            content.push(Shape::Text {
                name: "Bullets",
                frame: bullet_frame,
                paragraphs: slide
                    .bullets
                    .iter()
                    .map(|text| Paragraph {
                        text: text.clone(),
                        style: bullet_style,
                        bullet: true,
                    })
                    .collect(),
            });
        }

        if with_image {
            content.push(Shape::Picture {
                frame: style.image,
                description: slide.title.clone(),
            });
        }

        content
    }
}
