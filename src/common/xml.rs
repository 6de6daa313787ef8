//! XML helpers shared by the workbook reader and the corpus enricher.
//!
//! Both sides read with `quick-xml`. Errors are returned as plain messages so
//! each caller can wrap them in the error variant matching its input.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesRef, BytesStart, BytesText};

/// UTF-8 BOM bytes.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Strip a leading UTF-8 BOM, if any.
#[inline]
pub fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes)
}

/// Decode and unescape an attribute value.
pub fn attribute_value(attr: &Attribute<'_>) -> Result<String, String> {
    let raw = std::str::from_utf8(&attr.value).map_err(|e| e.to_string())?;
    let value = quick_xml::escape::unescape(raw).map_err(|e| e.to_string())?;
    Ok(value.into_owned())
}

/// Look up an attribute of `start` by its qualified name.
pub fn find_attribute(start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, String> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == name {
            return attribute_value(&attr).map(Some);
        }
    }
    Ok(None)
}

/// Accumulates character data across the events quick-xml splits it into.
///
/// Text arrives still escaped and entity references arrive as separate
/// events, so the raw form is rebuilt and unescaped once in [`TextBuffer::take`].
#[derive(Debug, Default)]
pub struct TextBuffer {
    raw: String,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an escaped text chunk.
    pub fn push_text(&mut self, text: &BytesText<'_>) -> Result<(), String> {
        let chunk = std::str::from_utf8(text).map_err(|e| e.to_string())?;
        self.raw.push_str(chunk);
        Ok(())
    }

    /// Append an entity or character reference (`&amp;`, `&#38;`).
    pub fn push_ref(&mut self, reference: &BytesRef<'_>) -> Result<(), String> {
        let name = std::str::from_utf8(reference).map_err(|e| e.to_string())?;
        self.raw.push('&');
        self.raw.push_str(name);
        self.raw.push(';');
        Ok(())
    }

    /// Append a CDATA section, whose content is literal.
    pub fn push_cdata(&mut self, cdata: &BytesCData<'_>) -> Result<(), String> {
        let chunk = std::str::from_utf8(cdata).map_err(|e| e.to_string())?;
        self.raw.push_str(&quick_xml::escape::escape(chunk));
        Ok(())
    }

    /// Unescape everything collected so far and reset the buffer.
    pub fn take(&mut self) -> Result<String, String> {
        let text = quick_xml::escape::unescape(&self.raw)
            .map_err(|e| e.to_string())?
            .into_owned();
        self.raw.clear();
        Ok(text)
    }

    /// Drop everything collected so far.
    #[inline]
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_utf8_bom() {
        assert_eq!(strip_utf8_bom(b"\xEF\xBB\xBF<a/>"), b"<a/>");
        assert_eq!(strip_utf8_bom(b"<a/>"), b"<a/>");
    }

    #[test]
    fn test_find_attribute_unescapes() {
        let start = BytesStart::from_content(r#"tok id="a&amp;b" n="1""#, 3);
        assert_eq!(find_attribute(&start, b"id").unwrap().as_deref(), Some("a&b"));
        assert_eq!(find_attribute(&start, b"lemma").unwrap(), None);
    }

    #[test]
    fn test_text_buffer_joins_chunks() {
        let mut buf = TextBuffer::new();
        buf.push_text(&BytesText::from_escaped("fish ")).unwrap();
        buf.push_ref(&BytesRef::new("amp")).unwrap();
        buf.push_text(&BytesText::from_escaped(" chips")).unwrap();
        assert_eq!(buf.take().unwrap(), "fish & chips");
        assert_eq!(buf.take().unwrap(), "");
    }
}
