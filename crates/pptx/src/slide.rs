//! Slide shapes and their PresentationML serialization.

use crate::layout::Frame;
use crate::templates::SP_TREE_HEADER;
use crate::xml::{XmlPart, NS_A, NS_P, NS_R};
use deck_core::{Result, Rgb};

/// Relationship id of the layout in every slide's rels part.
pub(crate) const LAYOUT_REL_ID: &str = "rId1";

/// Relationship id of the picture in a slide's rels part.
pub(crate) const IMAGE_REL_ID: &str = "rId2";

/// Bullet indent in EMUs.
const BULLET_MARGIN: &str = "342900";
const BULLET_INDENT: &str = "-342900";

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
}

/// Character formatting applied to a whole paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextStyle {
    pub size_pt: u32,
    pub bold: bool,
    pub color: Rgb,
    pub align: Align,
}

/// One paragraph in a text box.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    pub bullet: bool,
}

/// A visual primitive on a slide.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
    /// Solid rectangle without outline.
    Rect { name: &'static str, frame: Frame, fill: Rgb },
    /// Text box, one `<a:p>` per paragraph.
    Text {
        name: &'static str,
        frame: Frame,
        paragraphs: Vec<Paragraph>,
    },
    /// Picture referencing the slide's image relationship.
    Picture { frame: Frame, description: String },
}

/// A slide ready for serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SlideContent {
    pub background: Option<Rgb>,
    pub shapes: Vec<Shape>,
}

impl SlideContent {
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn has_picture(&self) -> bool {
        self.shapes.iter().any(|s| matches!(s, Shape::Picture { .. }))
    }

    /// Serialize as a `slideN.xml` part.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlPart::new()?;
        xml.start("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
        xml.start("p:cSld", &[])?;

        if let Some(color) = self.background {
            xml.start("p:bg", &[])?.start("p:bgPr", &[])?;
            write_solid_fill(&mut xml, color)?;
            xml.empty("a:effectLst", &[])?;
            xml.end("p:bgPr")?.end("p:bg")?;
        }

        xml.start("p:spTree", &[])?;
        xml.raw(SP_TREE_HEADER)?;
        // id 1 is the group shape itself
        for (idx, shape) in self.shapes.iter().enumerate() {
            write_shape(&mut xml, shape, idx as u32 + 2)?;
        }
        xml.end("p:spTree")?;

        xml.end("p:cSld")?;
        xml.start("p:clrMapOvr", &[])?
            .empty("a:masterClrMapping", &[])?
            .end("p:clrMapOvr")?;
        xml.end("p:sld")?;
        Ok(xml.finish())
    }
}

fn write_shape(xml: &mut XmlPart, shape: &Shape, id: u32) -> Result<()> {
    let id = id.to_string();
    match shape {
        Shape::Rect { name, frame, fill } => {
            let name = format!("{} {}", name, id);
            xml.start("p:sp", &[])?;
            xml.start("p:nvSpPr", &[])?
                .empty("p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?
                .empty("p:cNvSpPr", &[])?
                .empty("p:nvPr", &[])?
                .end("p:nvSpPr")?;
            xml.start("p:spPr", &[])?;
            write_xfrm(xml, frame)?;
            write_rect_geometry(xml)?;
            write_solid_fill(xml, *fill)?;
            xml.start("a:ln", &[])?.empty("a:noFill", &[])?.end("a:ln")?;
            xml.end("p:spPr")?;
            xml.end("p:sp")?;
        }
        Shape::Text {
            name,
            frame,
            paragraphs,
        } => {
            let name = format!("{} {}", name, id);
            xml.start("p:sp", &[])?;
            xml.start("p:nvSpPr", &[])?
                .empty("p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?
                .empty("p:cNvSpPr", &[("txBox", "1")])?
                .empty("p:nvPr", &[])?
                .end("p:nvSpPr")?;
            xml.start("p:spPr", &[])?;
            write_xfrm(xml, frame)?;
            write_rect_geometry(xml)?;
            xml.empty("a:noFill", &[])?;
            xml.end("p:spPr")?;

            xml.start("p:txBody", &[])?;
            xml.start("a:bodyPr", &[("wrap", "square"), ("rtlCol", "0")])?
                .empty("a:normAutofit", &[])?
                .end("a:bodyPr")?;
            xml.empty("a:lstStyle", &[])?;
            for paragraph in paragraphs {
                write_paragraph(xml, paragraph)?;
            }
            xml.end("p:txBody")?;
            xml.end("p:sp")?;
        }
        Shape::Picture { frame, description } => {
            let name = format!("Picture {}", id);
            xml.start("p:pic", &[])?;
            xml.start("p:nvPicPr", &[])?
                .empty(
                    "p:cNvPr",
                    &[("id", id.as_str()), ("name", name.as_str()), ("descr", description.as_str())],
                )?
                .start("p:cNvPicPr", &[])?
                .empty("a:picLocks", &[("noChangeAspect", "1")])?
                .end("p:cNvPicPr")?
                .empty("p:nvPr", &[])?
                .end("p:nvPicPr")?;
            xml.start("p:blipFill", &[])?
                .empty("a:blip", &[("r:embed", IMAGE_REL_ID)])?
                .start("a:stretch", &[])?
                .empty("a:fillRect", &[])?
                .end("a:stretch")?
                .end("p:blipFill")?;
            xml.start("p:spPr", &[])?;
            write_xfrm(xml, frame)?;
            write_rect_geometry(xml)?;
            xml.end("p:spPr")?;
            xml.end("p:pic")?;
        }
    }
    Ok(())
}

fn write_paragraph(xml: &mut XmlPart, paragraph: &Paragraph) -> Result<()> {
    let style = &paragraph.style;
    xml.start("a:p", &[])?;

    match (paragraph.bullet, style.align) {
        (true, _) => {
            xml.start("a:pPr", &[("marL", BULLET_MARGIN), ("indent", BULLET_INDENT)])?;
            xml.start("a:spcBef", &[])?
                .empty("a:spcPts", &[("val", "600")])?
                .end("a:spcBef")?;
            xml.empty("a:buFont", &[("typeface", "Arial")])?;
            xml.empty("a:buChar", &[("char", "\u{2022}")])?;
            xml.end("a:pPr")?;
        }
        (false, Align::Center) => {
            xml.empty("a:pPr", &[("algn", "ctr")])?;
        }
        (false, Align::Left) => {}
    }

    let size = (style.size_pt * 100).to_string();
    let mut attrs = vec![("lang", "en-US"), ("sz", size.as_str())];
    if style.bold {
        attrs.push(("b", "1"));
    }
    attrs.push(("dirty", "0"));

    xml.start("a:r", &[])?;
    xml.start("a:rPr", &attrs)?;
    write_solid_fill(xml, style.color)?;
    xml.end("a:rPr")?;
    xml.text_element("a:t", &[], &paragraph.text)?;
    xml.end("a:r")?;

    xml.end("a:p")?;
    Ok(())
}

fn write_xfrm(xml: &mut XmlPart, frame: &Frame) -> Result<()> {
    let (x, y, cx, cy) = frame.to_emu();
    let (x, y, cx, cy) = (x.to_string(), y.to_string(), cx.to_string(), cy.to_string());
    xml.start("a:xfrm", &[])?
        .empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?
        .empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?
        .end("a:xfrm")?;
    Ok(())
}

fn write_rect_geometry(xml: &mut XmlPart) -> Result<()> {
    xml.start("a:prstGeom", &[("prst", "rect")])?
        .empty("a:avLst", &[])?
        .end("a:prstGeom")?;
    Ok(())
}

fn write_solid_fill(xml: &mut XmlPart, color: Rgb) -> Result<()> {
    xml.start("a:solidFill", &[])?
        .empty("a:srgbClr", &[("val", color.hex().as_str())])?
        .end("a:solidFill")?;
    Ok(())
}

/// Serialize a slide's relationships part.
pub(crate) fn slide_rels_xml(image_target: Option<&str>) -> Result<Vec<u8>> {
    use crate::templates::{REL_IMAGE, REL_SLIDE_LAYOUT};
    use crate::xml::NS_PKG_RELS;

    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    xml.empty(
        "Relationship",
        &[
            ("Id", LAYOUT_REL_ID),
            ("Type", REL_SLIDE_LAYOUT),
            ("Target", "../slideLayouts/slideLayout1.xml"),
        ],
    )?;
    if let Some(target) = image_target {
        xml.empty(
            "Relationship",
            &[("Id", IMAGE_REL_ID), ("Type", REL_IMAGE), ("Target", target)],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            size_pt: 20,
            bold: false,
            color: Rgb(80, 80, 80),
            align: Align::Left,
        }
    }

    #[test]
    fn test_text_box_one_paragraph_per_line() {
        let mut slide = SlideContent::default();
        slide.push(Shape::Text {
            name: "Bullets",
            frame: Frame::new(1.2, 1.8, 7.6, 3.2),
            paragraphs: ["one", "", "three"]
                .iter()
                .map(|t| Paragraph {
                    text: t.to_string(),
                    style: style(),
                    bullet: true,
                })
                .collect(),
        });
        let xml = String::from_utf8(slide.to_xml().unwrap()).unwrap();
        assert_eq!(xml.matches("<a:p>").count(), 3);
        assert_eq!(xml.matches("<a:buChar").count(), 3);
        assert!(xml.contains(r#"sz="2000""#));
        assert!(xml.contains(r#"<a:srgbClr val="505050"/>"#));
        assert!(xml.contains(r#"<a:off x="1097280" y="1645920"/>"#));
    }

    #[test]
    fn test_rect_and_background() {
        let slide = SlideContent {
            background: Some(Rgb::WHITE),
            shapes: vec![Shape::Rect {
                name: "Accent Bar",
                frame: Frame::new(0.0, 0.0, 10.0, 0.2),
                fill: Rgb(66, 135, 245),
            }],
        };
        let xml = String::from_utf8(slide.to_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="FFFFFF"/>"#));
        assert!(xml.contains(r#"<p:cNvPr id="2" name="Accent Bar 2"/>"#));
        assert!(xml.contains(r#"<a:srgbClr val="4287F5"/>"#));
        assert!(!slide.has_picture());
    }

    #[test]
    fn test_picture_references_image_rel() {
        let slide = SlideContent {
            background: None,
            shapes: vec![Shape::Picture {
                frame: Frame::new(5.5, 1.2, 4.0, 3.8),
                description: "Rust & Ferris".to_string(),
            }],
        };
        let xml = String::from_utf8(slide.to_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"descr="Rust &amp; Ferris""#));
        assert!(slide.has_picture());
    }

    #[test]
    fn test_slide_rels() {
        let plain = String::from_utf8(slide_rels_xml(None).unwrap()).unwrap();
        assert!(plain.contains("slideLayout1.xml"));
        assert!(!plain.contains("rId2"));

        let with_image =
            String::from_utf8(slide_rels_xml(Some("../media/image2.png")).unwrap()).unwrap();
        assert!(with_image.contains(r#"Target="../media/image2.png""#));
    }
}
