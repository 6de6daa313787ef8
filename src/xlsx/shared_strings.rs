//! Shared strings table for Excel files.
//!
//! Excel stores most cell text once in `xl/sharedStrings.xml` and refers to
//! it by index from `t="s"` cells. Rich-text entries are flattened to the
//! concatenation of their runs; phonetic guides (`rPh`) are dropped.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::xml::TextBuffer;

/// Shared strings table.
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse shared strings from xl/sharedStrings.xml content.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut strings = Vec::new();
        let mut reader = Reader::from_str(content);
        let mut buf = Vec::new();

        let mut text = TextBuffer::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        text.clear();
                    },
                    b"rPh" => phonetic_depth += 1,
                    b"t" if in_si && phonetic_depth == 0 => in_t = true,
                    _ => {},
                },
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"si" {
                        strings.push(String::new());
                    }
                },
                Ok(Event::Text(ref t)) if in_t => text.push_text(t)?,
                Ok(Event::GeneralRef(ref r)) if in_t => text.push_ref(r)?,
                Ok(Event::CData(ref c)) if in_t => text.push_cdata(c)?,
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(text.take()?);
                        in_si = false;
                    },
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_t = false,
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(format!("Shared strings parse error: {}", e)),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// Get a string by its index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the number of strings in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
