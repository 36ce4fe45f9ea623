//! OPC package assembly: writes every part of a deck into a ZIP archive.

use crate::layout::{emu, SLIDE_HEIGHT, SLIDE_WIDTH};
use crate::media::{EmbeddedImage, ImageFormat};
use crate::slide::{slide_rels_xml, SlideContent};
use crate::templates::*;
use crate::xml::{XmlPart, NS_A, NS_P, NS_PKG_RELS, NS_R};
use deck_core::{Error, Result};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// First slide id; ids below 256 are reserved.
const FIRST_SLIDE_ID: usize = 256;

/// Relationship ids used by presentation.xml.rels before the slides start.
const PRESENTATION_FIXED_RELS: usize = 5;

/// A slide together with the image it embeds, if any.
#[derive(Debug)]
pub(crate) struct RenderedSlide<'a> {
    pub content: SlideContent,
    pub image: Option<EmbeddedImage<'a>>,
}

/// Document-level metadata written to docProps.
#[derive(Debug, Default)]
pub(crate) struct DocProps<'a> {
    pub title: &'a str,
    pub creator: Option<&'a str>,
}

/// Writer for a single `.pptx` archive.
struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add_part(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.write_entry(path, content, options)
    }

    /// Media is already compressed; store it as-is.
    fn add_media(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        self.write_entry(path, content, options)
    }

    fn write_entry(&mut self, path: &str, content: &[u8], options: FileOptions) -> Result<()> {
        self.zip
            .start_file(path, options)
            .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
        self.zip
            .write_all(content)
            .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", path, e)))
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Encode the slides and all supporting parts as a `.pptx` byte buffer.
pub(crate) fn write_package(slides: &[RenderedSlide<'_>], props: &DocProps<'_>) -> Result<Vec<u8>> {
    let mut package = PackageWriter::new();

    package.add_part("[Content_Types].xml", &content_types_xml(slides)?)?;
    package.add_part("_rels/.rels", &package_rels_xml()?)?;
    package.add_part("docProps/core.xml", &core_props_xml(props)?)?;
    package.add_part("docProps/app.xml", &app_props_xml(slides.len())?)?;

    package.add_part("ppt/presentation.xml", &presentation_xml(slides.len())?)?;
    package.add_part(
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels_xml(slides.len())?,
    )?;
    package.add_part(SLIDE_MASTER_PATH, SLIDE_MASTER_XML.as_bytes())?;
    package.add_part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        SLIDE_MASTER_RELS_XML.as_bytes(),
    )?;
    package.add_part(SLIDE_LAYOUT_PATH, SLIDE_LAYOUT_XML.as_bytes())?;
    package.add_part(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        SLIDE_LAYOUT_RELS_XML.as_bytes(),
    )?;
    package.add_part(THEME_PATH, THEME_XML.as_bytes())?;
    package.add_part("ppt/presProps.xml", PRES_PROPS_XML.as_bytes())?;
    package.add_part("ppt/viewProps.xml", VIEW_PROPS_XML.as_bytes())?;
    package.add_part("ppt/tableStyles.xml", TABLE_STYLES_XML.as_bytes())?;

    for (idx, slide) in slides.iter().enumerate() {
        let number = idx + 1;
        let media_name = slide
            .image
            .as_ref()
            .map(|image| format!("image{}.{}", number, image.format.extension()));

        package.add_part(
            &format!("ppt/slides/slide{}.xml", number),
            &slide.content.to_xml()?,
        )?;
        let target = media_name.as_ref().map(|name| format!("../media/{}", name));
        package.add_part(
            &format!("ppt/slides/_rels/slide{}.xml.rels", number),
            &slide_rels_xml(target.as_deref())?,
        )?;

        if let (Some(image), Some(name)) = (&slide.image, &media_name) {
            package.add_media(&format!("ppt/media/{}", name), image.data)?;
        }
    }

    package.finish()
}

fn content_types_xml(slides: &[RenderedSlide<'_>]) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start(
        "Types",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types")],
    )?;
    xml.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;

    for format in ImageFormat::ALL {
        let used = slides
            .iter()
            .any(|s| s.image.as_ref().map(|i| i.format) == Some(format));
        if used {
            xml.empty(
                "Default",
                &[("Extension", format.extension()), ("ContentType", format.mime_type())],
            )?;
        }
    }

    let fixed = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/ppt/presProps.xml", CT_PRES_PROPS),
        ("/ppt/viewProps.xml", CT_VIEW_PROPS),
        ("/ppt/tableStyles.xml", CT_TABLE_STYLES),
        ("/docProps/core.xml", CT_CORE_PROPS),
        ("/docProps/app.xml", CT_EXTENDED_PROPS),
    ];
    for (part, content_type) in fixed {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    for number in 1..=slides.len() {
        let part = format!("/ppt/slides/slide{}.xml", number);
        xml.empty("Override", &[("PartName", part.as_str()), ("ContentType", CT_SLIDE)])?;
    }

    xml.end("Types")?;
    Ok(xml.finish())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    for (id, rel_type, target) in [
        ("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        ("rId2", REL_CORE_PROPS, "docProps/core.xml"),
        ("rId3", REL_EXTENDED_PROPS, "docProps/app.xml"),
    ] {
        xml.empty(
            "Relationship",
            &[("Id", id), ("Type", rel_type), ("Target", target)],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn core_props_xml(props: &DocProps<'_>) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.text_element("dc:title", &[], props.title)?;
    xml.text_element("dc:creator", &[], props.creator.unwrap_or("deckgen"))?;
    xml.text_element("cp:revision", &[], "1")?;
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}

fn app_props_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start(
        "Properties",
        &[
            (
                "xmlns",
                "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
            ),
            (
                "xmlns:vt",
                "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes",
            ),
        ],
    )?;
    xml.text_element("Application", &[], "deckgen")?;
    xml.text_element("PresentationFormat", &[], "On-screen Show (16:9)")?;
    xml.text_element("Slides", &[], &slide_count.to_string())?;
    xml.end("Properties")?;
    Ok(xml.finish())
}

fn presentation_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start(
        "p:presentation",
        &[
            ("xmlns:a", NS_A),
            ("xmlns:r", NS_R),
            ("xmlns:p", NS_P),
            ("saveSubsetFonts", "1"),
        ],
    )?;
    xml.start("p:sldMasterIdLst", &[])?
        .empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?
        .end("p:sldMasterIdLst")?;

    xml.start("p:sldIdLst", &[])?;
    for idx in 0..slide_count {
        let id = (FIRST_SLIDE_ID + idx).to_string();
        let rel_id = slide_rel_id(idx);
        xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
    }
    xml.end("p:sldIdLst")?;

    let (cx, cy) = (emu(SLIDE_WIDTH).to_string(), emu(SLIDE_HEIGHT).to_string());
    xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;
    xml.end("p:presentation")?;
    Ok(xml.finish())
}

fn presentation_rels_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    let fixed = [
        ("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        ("rId2", REL_THEME, "theme/theme1.xml"),
        ("rId3", REL_PRES_PROPS, "presProps.xml"),
        ("rId4", REL_VIEW_PROPS, "viewProps.xml"),
        ("rId5", REL_TABLE_STYLES, "tableStyles.xml"),
    ];
    for (id, rel_type, target) in fixed {
        xml.empty(
            "Relationship",
            &[("Id", id), ("Type", rel_type), ("Target", target)],
        )?;
    }
    for idx in 0..slide_count {
        let rel_id = slide_rel_id(idx);
        let target = format!("slides/slide{}.xml", idx + 1);
        xml.empty(
            "Relationship",
            &[
                ("Id", rel_id.as_str()),
                ("Type", REL_SLIDE),
                ("Target", target.as_str()),
            ],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn slide_rel_id(idx: usize) -> String {
    format!("rId{}", PRESENTATION_FIXED_RELS + idx + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_rel_ids_follow_fixed_parts() {
        assert_eq!(slide_rel_id(0), "rId6");
        assert_eq!(slide_rel_id(9), "rId15");
    }

    #[test]
    fn test_presentation_xml_sizes_and_ids() {
        let xml = String::from_utf8(presentation_xml(2).unwrap()).unwrap();
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="5143500"/>"#));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId6"/>"#));
        assert!(xml.contains(r#"<p:sldId id="257" r:id="rId7"/>"#));
    }

    #[test]
    fn test_content_types_only_list_used_media() {
        let png = crate::media::sample_png();
        let slides = vec![
            RenderedSlide {
                content: SlideContent::default(),
                image: None,
            },
            RenderedSlide {
                content: SlideContent::default(),
                image: Some(EmbeddedImage::prepare(&png).unwrap()),
            },
        ];
        let xml = String::from_utf8(content_types_xml(&slides).unwrap()).unwrap();
        assert!(xml.contains(r#"Extension="png""#));
        assert!(!xml.contains(r#"Extension="jpeg""#));
        assert!(xml.contains("/ppt/slides/slide2.xml"));
        assert!(!xml.contains("/ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_core_props_escape_title() {
        let props = DocProps {
            title: "R&D <2025>",
            creator: Some("Ada"),
        };
        let xml = String::from_utf8(core_props_xml(&props).unwrap()).unwrap();
        assert!(xml.contains("<dc:title>R&amp;D &lt;2025&gt;</dc:title>"));
        assert!(xml.contains("<dc:creator>Ada</dc:creator>"));
    }
}
