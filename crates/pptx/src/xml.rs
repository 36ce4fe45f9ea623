//! Thin wrapper over `quick_xml::Writer` for emitting package parts.

use deck_core::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;

/// DrawingML main namespace.
pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// Office document relationships namespace.
pub(crate) const NS_R: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// PresentationML main namespace.
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
/// Package relationships namespace.
pub(crate) const NS_PKG_RELS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// Make `value` legal XML 1.0 character data.
///
/// Characters outside the `Char` production (C0 controls other than tab,
/// newline and carriage return, and U+FFFE/U+FFFF) are written as `_xHHHH_`,
/// the OOXML escape form that Office turns back into the original character.
pub(crate) fn sanitize(value: &str) -> Cow<'_, str> {
    if !value.chars().any(is_forbidden) {
        return Cow::Borrowed(value);
    }
    let mut clean = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if is_forbidden(c) {
            clean.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            clean.push(c);
        }
    }
    Cow::Owned(clean)
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Builds a single XML part. Attribute values and text are sanitized and escaped on write.
pub(crate) struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    /// Start a standalone UTF-8 document.
    pub fn new() -> Result<Self> {
        let mut part = Self {
            writer: Writer::new(Vec::with_capacity(4096)),
        };
        part.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        let elem = element(name, attrs);
        self.event(Event::Start(elem))?;
        Ok(self)
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        let elem = element(name, attrs);
        self.event(Event::Empty(elem))?;
        Ok(self)
    }

    pub fn end(&mut self, name: &str) -> Result<&mut Self> {
        self.event(Event::End(BytesEnd::new(name)))?;
        Ok(self)
    }

    pub fn text(&mut self, text: &str) -> Result<&mut Self> {
        self.event(Event::Text(BytesText::new(&sanitize(text))))?;
        Ok(self)
    }

    /// `<name attrs>text</name>`
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<&mut Self> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    /// Append a pre-serialized fragment verbatim.
    pub fn raw(&mut self, fragment: &str) -> Result<&mut Self> {
        self.writer
            .get_mut()
            .extend_from_slice(fragment.as_bytes());
        Ok(self)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(format!("Failed to write XML: {}", e)))
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut elem = BytesStart::new(name);
    for (key, value) in attrs {
        elem.push_attribute((*key, sanitize(value).as_ref()));
    }
    elem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut part = XmlPart::new().unwrap();
        part.text_element("a:t", &[("descr", "\"quoted\" & <b>")], "Fish & Chips <3")
            .unwrap();
        let xml = String::from_utf8(part.finish()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains("Fish &amp; Chips &lt;3"));
        assert!(xml.contains("&quot;quoted&quot; &amp; &lt;b&gt;"));
    }

    #[test]
    fn test_control_characters_escaped() {
        assert_eq!(sanitize("plain"), Cow::Borrowed("plain"));
        assert_eq!(sanitize("Bell\u{7}Title"), "Bell_x0007_Title");
        assert_eq!(sanitize("esc\u{1b}[0m"), "esc_x001B_[0m");
        assert_eq!(sanitize("tab\tnew\nline\r"), "tab\tnew\nline\r");
        assert_eq!(sanitize("\u{FFFF}"), "_xFFFF_");

        let mut part = XmlPart::new().unwrap();
        part.text_element("a:t", &[("descr", "a\u{0}b")], "x\u{1}y").unwrap();
        let xml = String::from_utf8(part.finish()).unwrap();
        assert!(xml.contains(r#"descr="a_x0000_b""#));
        assert!(xml.contains("x_x0001_y"));
        assert!(!xml.chars().any(|c| c < ' ' && c != '\n'));
    }

    #[test]
    fn test_empty_element() {
        let mut part = XmlPart::new().unwrap();
        part.empty("a:off", &[("x", "0"), ("y", "10")]).unwrap();
        let xml = String::from_utf8(part.finish()).unwrap();
        assert!(xml.ends_with(r#"<a:off x="0" y="10"/>"#));
    }
}
