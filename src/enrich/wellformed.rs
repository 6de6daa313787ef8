//! Well-formedness rules the XML reader leaves to its caller.
//!
//! quick-xml checks tag structure, attribute syntax and duplicate
//! attributes. Everything else a conforming parser rejects is checked here:
//! the `Char` and `Name` productions, entity references, `<` in attribute
//! values, `]]>` in text, and attribute namespace prefixes.

use std::collections::HashMap;

use quick_xml::escape::{resolve_xml_entity, unescape_with};
use quick_xml::events::{BytesCData, BytesPI, BytesRef, BytesStart, BytesText};
use quick_xml::name::{NamespaceResolver, ResolveResult};

/// Whether `c` matches the XML 1.0 `Char` production.
#[inline]
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// A `Name` without colons.
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c != ':' && is_name_start_char(c))
        && chars.all(|c| c != ':' && is_name_char(c))
}

/// A `prefix:local` or `local` name.
pub fn is_qualified_name(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(name),
    }
}

/// Reject characters outside the `Char` production.
pub fn check_chars(text: &str) -> Result<(), String> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(format!("character U+{:04X} is not allowed in XML", u32::from(c))),
        None => Ok(()),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| e.to_string())
}

fn qualified_name(bytes: &[u8], what: &str) -> Result<(), String> {
    let name = utf8(bytes)?;
    if is_qualified_name(name) {
        Ok(())
    } else {
        Err(format!("invalid {} name '{}'", what, name))
    }
}

/// Document-wide state for the checks: the general entities declared by
/// the DOCTYPE internal subset.
#[derive(Debug, Default)]
pub struct Checker {
    /// Entity name -> replacement text, `None` for external entities
    entities: HashMap<String, Option<String>>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the general entities declared in a DOCTYPE.
    pub fn doctype(&mut self, doctype: &BytesText<'_>) -> Result<(), String> {
        let content = doctype.decode().map_err(|e| e.to_string())?;
        check_chars(&content)?;

        let mut rest: &str = &content;
        while let Some(at) = rest.find("<!ENTITY") {
            rest = rest[at + "<!ENTITY".len()..].trim_start();
            // Parameter entities are never referenced from content
            if rest.starts_with('%') {
                continue;
            }
            let end = rest
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(rest.len());
            let name = &rest[..end];
            rest = rest[end..].trim_start();

            let value = rest.chars().next().filter(|q| *q == '"' || *q == '\'').and_then(|q| {
                let body = &rest[1..];
                body.find(q).map(|len| body[..len].to_string())
            });
            if is_ncname(name) {
                // The first declaration is binding
                self.entities.entry(name.to_string()).or_insert(value);
            }
        }
        Ok(())
    }

    /// Check an entity or character reference found in text.
    pub fn reference(&self, reference: &BytesRef<'_>) -> Result<(), String> {
        if reference.is_char_ref() {
            return match reference.resolve_char_ref().map_err(|e| e.to_string())? {
                Some(c) if is_xml_char(c) => Ok(()),
                _ => Err(format!(
                    "character reference '&{};' is not a legal character",
                    utf8(reference)?
                )),
            };
        }

        let name = utf8(reference)?;
        if resolve_xml_entity(name).is_some() || self.entities.contains_key(name) {
            Ok(())
        } else {
            Err(format!("undefined entity '&{};'", name))
        }
    }

    /// Check an element's name and attributes; returns the unescaped value
    /// of its unprefixed `id` attribute.
    pub fn element(
        &self,
        element: &BytesStart<'_>,
        resolver: &NamespaceResolver,
    ) -> Result<Option<String>, String> {
        qualified_name(element.name().as_ref(), "element")?;

        let mut id = None;
        for attr in element.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            qualified_name(attr.key.as_ref(), "attribute")?;
            if let (ResolveResult::Unknown(prefix), _) = resolver.resolve_attribute(attr.key) {
                return Err(format!(
                    "unbound namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                ));
            }

            let value = self.attribute_value(&attr.value)?;
            if attr.key.as_ref() == super::ID_ATTRIBUTE {
                id = Some(value);
            }
        }
        Ok(id)
    }

    /// Unescape a raw attribute value, rejecting `<`, undefined entities,
    /// references to external entities and illegal characters.
    fn attribute_value(&self, raw: &[u8]) -> Result<String, String> {
        let raw = utf8(raw)?;
        if raw.contains('<') {
            return Err("'<' is not allowed in attribute values".to_string());
        }

        let value = unescape_with(raw, |name| {
            resolve_xml_entity(name).or_else(|| {
                self.entities
                    .get(name)
                    .and_then(|value| value.as_deref())
            })
        })
        .map_err(|e| e.to_string())?;
        check_chars(&value)?;
        Ok(value.into_owned())
    }

    /// Check character data between tags.
    pub fn text(&self, text: &BytesText<'_>) -> Result<(), String> {
        let content = text.decode().map_err(|e| e.to_string())?;
        if content.contains("]]>") {
            return Err("']]>' is not allowed in text".to_string());
        }
        check_chars(&content)
    }

    pub fn cdata(&self, cdata: &BytesCData<'_>) -> Result<(), String> {
        check_chars(&cdata.decode().map_err(|e| e.to_string())?)
    }

    pub fn comment(&self, comment: &BytesText<'_>) -> Result<(), String> {
        let content = comment.decode().map_err(|e| e.to_string())?;
        if content.contains("--") || content.ends_with('-') {
            return Err("'--' is not allowed in comments".to_string());
        }
        check_chars(&content)
    }

    /// Check a processing instruction; the target `xml` is reserved.
    pub fn processing_instruction(&self, pi: &BytesPI<'_>) -> Result<(), String> {
        let target = utf8(pi.target())?;
        if !is_ncname(target) || target.eq_ignore_ascii_case("xml") {
            return Err(format!("invalid processing instruction target '{}'", target));
        }
        check_chars(utf8(pi.content())?)
    }
}
