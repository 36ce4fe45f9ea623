//! Reads a generated `.pptx` back into a structural summary.
//!
//! Used to verify written decks: slide order, shape geometry, fills and
//! paragraph text. Anything the renderer never writes is ignored.

use deck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Whether a shape is drawn geometry/text or a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Shape,
    Picture,
}

/// One shape on a slide. Positions and sizes are in EMUs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeSummary {
    pub kind: ShapeKind,
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    /// Solid fill of the shape itself, as `RRGGBB`.
    pub fill: Option<String>,
    /// Color of the first text run, as `RRGGBB`.
    pub text_color: Option<String>,
    /// Whether the first text run is bold.
    pub bold: bool,
    /// Text of each paragraph, in order.
    pub paragraphs: Vec<String>,
}

impl ShapeSummary {
    fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            x: 0,
            y: 0,
            cx: 0,
            cy: 0,
            fill: None,
            text_color: None,
            bold: false,
            paragraphs: Vec::new(),
        }
    }
}

/// One slide in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideSummary {
    /// 1-based slide number.
    pub number: usize,
    /// Slide background fill, as `RRGGBB`.
    pub background: Option<String>,
    pub shapes: Vec<ShapeSummary>,
}

impl SlideSummary {
    /// All paragraph texts on the slide, shape by shape.
    pub fn texts(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .flat_map(|s| s.paragraphs.iter().map(String::as_str))
            .collect()
    }
}

/// A whole deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    /// Slide width in EMUs.
    pub width: i64,
    /// Slide height in EMUs.
    pub height: i64,
    pub slides: Vec<SlideSummary>,
}

/// Reader for decks written by [`crate::DeckRenderer`].
pub struct DeckReader;

impl DeckReader {
    /// Create a new deck reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a deck from a seekable reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<DeckSummary> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let (width, height) = self.get_slide_size(&mut archive)?;
        let slide_order = self.get_slide_order(&mut archive)?;

        let mut slides = Vec::with_capacity(slide_order.len());
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = self.read_file_from_archive(&mut archive, slide_path)?;
            let mut slide = self.parse_slide_xml(&content)?;
            slide.number = idx + 1;
            slides.push(slide);
        }

        log::debug!("Read {} slides", slides.len());

        Ok(DeckSummary {
            width,
            height,
            slides,
        })
    }

    /// Read `sldSz` from presentation.xml.
    fn get_slide_size<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<(i64, i64)> {
        let content = self.read_file_from_archive(archive, "ppt/presentation.xml")?;
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldSz" =>
                {
                    let cx = attr_i64(e, b"cx").unwrap_or_default();
                    let cy = attr_i64(e, b"cy").unwrap_or_default();
                    return Ok((cx, cy));
                }
                Ok(Event::Eof) => {
                    return Err(Error::CorruptedFile(
                        "presentation.xml has no slide size".to_string(),
                    ))
                }
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing presentation.xml: {}",
                        e
                    )))
                }
                _ => {}
            }
        }
    }

    /// Get the ordered list of slide paths from the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let rel_type = attr_string(e, b"Type").unwrap_or_default();
                    let target = attr_string(e, b"Target").unwrap_or_default();
                    let id = attr_string(e, b"Id").unwrap_or_default();

                    if rel_type.ends_with("/slide") {
                        let order_num =
                            extract_slide_number(&id).or_else(|| extract_slide_number(&target));
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((full_path, order_num));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Summarize one slide part.
    fn parse_slide_xml(&self, xml_content: &str) -> Result<SlideSummary> {
        let mut reader = Reader::from_str(xml_content);
        reader.trim_text(true);

        let mut slide = SlideSummary {
            number: 0,
            background: None,
            shapes: Vec::new(),
        };
        let mut current: Option<ShapeSummary> = None;
        let mut in_background = false;
        let mut in_shape_props = false;
        let mut in_line = false;
        let mut in_run_props = false;
        let mut in_text = false;
        let mut seen_run = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" => {
                        current = Some(ShapeSummary::new(ShapeKind::Shape));
                        seen_run = false;
                    }
                    b"pic" => {
                        current = Some(ShapeSummary::new(ShapeKind::Picture));
                        seen_run = false;
                    }
                    b"bg" => in_background = true,
                    b"spPr" => in_shape_props = true,
                    b"ln" => in_line = true,
                    b"p" => {
                        if let Some(shape) = current.as_mut() {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"rPr" => {
                        in_run_props = true;
                        if let Some(shape) = current.as_mut() {
                            apply_run_props(shape, e, &mut seen_run);
                        }
                    }
                    b"t" => in_text = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                    b"off" if in_shape_props => {
                        if let Some(shape) = current.as_mut() {
                            shape.x = attr_i64(e, b"x").unwrap_or_default();
                            shape.y = attr_i64(e, b"y").unwrap_or_default();
                        }
                    }
                    b"ext" if in_shape_props => {
                        if let Some(shape) = current.as_mut() {
                            shape.cx = attr_i64(e, b"cx").unwrap_or_default();
                            shape.cy = attr_i64(e, b"cy").unwrap_or_default();
                        }
                    }
                    b"rPr" => {
                        if let Some(shape) = current.as_mut() {
                            apply_run_props(shape, e, &mut seen_run);
                        }
                    }
                    b"srgbClr" => {
                        let color = attr_string(e, b"val");
                        match current.as_mut() {
                            None if in_background => slide.background = color,
                            Some(shape) if in_run_props => {
                                if shape.text_color.is_none() {
                                    shape.text_color = color;
                                }
                            }
                            Some(shape) if in_shape_props && !in_line => shape.fill = color,
                            _ => {}
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) if in_text => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad text in slide: {}", e)))?;
                    if let Some(paragraph) = current.as_mut().and_then(|s| s.paragraphs.last_mut()) {
                        paragraph.push_str(&text);
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" | b"pic" => {
                        if let Some(shape) = current.take() {
                            slide.shapes.push(shape);
                        }
                    }
                    b"bg" => in_background = false,
                    b"spPr" => in_shape_props = false,
                    b"ln" => in_line = false,
                    b"rPr" => in_run_props = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::CorruptedFile(format!(
                        "Malformed slide XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(slide)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for DeckReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Record bold and color of the first run in a shape only.
fn apply_run_props(shape: &mut ShapeSummary, e: &BytesStart<'_>, seen_run: &mut bool) {
    if *seen_run {
        return;
    }
    *seen_run = true;
    shape.bold = attr_string(e, b"b").as_deref() == Some("1");
}

fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn attr_i64(e: &BytesStart<'_>, key: &[u8]) -> Option<i64> {
    attr_string(e, key).and_then(|v| v.parse().ok())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
