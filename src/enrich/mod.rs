//! Writing annotations into the `tok` elements of a corpus document.
//!
//! The document is streamed event by event from the input into an
//! in-memory buffer. Everything except the attributes of matched `tok`
//! elements is copied through byte for byte, and the buffer only reaches
//! the output path once the whole input has parsed. A malformed input
//! never creates or truncates the output file. Input in other encodings
//! is decoded first, so the copy is always UTF-8.
//!
//! The spreadsheet's `tag` column is written to the `mfs` attribute.

use std::path::Path;

use log::{debug, info, trace};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};

use crate::annotations::AnnotationMapping;
use crate::common::encoding::decode_document;
use crate::common::{Error, Result};

mod wellformed;

use wellformed::Checker;

/// Name of the token element (in no namespace).
pub const TOKEN_ELEMENT: &[u8] = b"tok";
/// Attribute holding the token identifier.
pub const ID_ATTRIBUTE: &[u8] = b"id";
/// Attribute receiving the lemma.
pub const LEMMA_ATTRIBUTE: &str = "lemma";
/// Attribute receiving the tag.
pub const TAG_ATTRIBUTE: &str = "mfs";

/// Declaration written at the top of every output document.
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Namespace of an element, detached from the reader that resolved it.
enum Scope {
    /// No prefix and no default namespace in scope
    Unqualified,
    Namespaced,
    /// A prefix with no `xmlns:` declaration in scope
    UnboundPrefix(Vec<u8>),
}

impl From<ResolveResult<'_>> for Scope {
    fn from(ns: ResolveResult<'_>) -> Self {
        match ns {
            ResolveResult::Unbound => Scope::Unqualified,
            ResolveResult::Bound(_) => Scope::Namespaced,
            ResolveResult::Unknown(prefix) => Scope::UnboundPrefix(prefix),
        }
    }
}

/// Result of enriching a document in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enriched {
    /// The serialized document, UTF-8 with an XML declaration
    pub xml: Vec<u8>,
    /// Number of `tok` elements whose identifier matched the mapping
    pub updated: usize,
    /// Number of `tok` elements seen
    pub tokens: usize,
}

/// Enrich the document at `input_path` and write it to `output_path`.
///
/// Returns the number of `tok` elements whose `id` was found in `mapping`.
/// `output_path` may equal `input_path`; the input is fully read first.
///
/// # Examples
///
/// ```rust,no_run
/// use tok_annotate::{enrich, load_annotations};
///
/// let mapping = load_annotations("data/HdE_DCE.tagged.xlsx", "Revised")?;
/// let updated = enrich("data/HdE_DCE.xml", "HdE_DCE.enriched.xml", &mapping)?;
/// println!("{} tokens updated", updated);
/// # Ok::<(), tok_annotate::Error>(())
/// ```
pub fn enrich<P, Q>(input_path: P, output_path: Q, mapping: &AnnotationMapping) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();

    debug!("reading corpus {}", input_path.display());
    let input = std::fs::read(input_path)?;
    let enriched = enrich_bytes(&input, mapping)?;
    debug!(
        "{} of {} token(s) matched",
        enriched.updated, enriched.tokens
    );

    std::fs::write(output_path, &enriched.xml)?;
    info!(
        "updated {} token(s), wrote {}",
        enriched.updated,
        output_path.display()
    );
    Ok(enriched.updated)
}

/// Enrich a document given as raw bytes.
///
/// The encoding comes from a byte order mark or the XML declaration and
/// defaults to UTF-8. The output is always UTF-8.
pub fn enrich_bytes(input: &[u8], mapping: &AnnotationMapping) -> Result<Enriched> {
    let text = decode_document(input).map_err(Error::Parse)?;
    enrich_str(&text, mapping)
}

/// Enrich a document given as text.
pub fn enrich_str(xml: &str, mapping: &AnnotationMapping) -> Result<Enriched> {
    let mut reader = NsReader::from_str(strip_bom(xml));
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + xml.len() / 4));
    writer.get_mut().extend_from_slice(XML_DECLARATION.as_bytes());

    let mut checker = Checker::new();
    let mut first = true;
    let mut doctype_seen = false;
    let mut depth = 0usize;
    let mut roots = 0usize;
    let mut updated = 0usize;
    let mut tokens = 0usize;

    loop {
        let step = reader
            .read_resolved_event()
            .map(|(ns, event)| (Scope::from(ns), event));
        let (scope, event) = match step {
            Ok(resolved) => resolved,
            Err(e) => return Err(parse_error(&reader, e)),
        };
        let in_no_namespace = match scope {
            Scope::Unqualified => true,
            Scope::Namespaced => false,
            Scope::UnboundPrefix(prefix) => {
                return Err(parse_error(
                    &reader,
                    format!("unbound namespace prefix '{}'", String::from_utf8_lossy(&prefix)),
                ));
            },
        };

        let checked = match &event {
            Event::Decl(_) if !first => Err("XML declaration not at the start".to_string()),
            Event::DocType(_) if doctype_seen || roots > 0 => {
                Err("DOCTYPE must appear once, before the root element".to_string())
            },
            Event::DocType(d) => {
                doctype_seen = true;
                checker.doctype(d)
            },
            Event::Text(t) => checker.text(t),
            Event::CData(c) => checker.cdata(c),
            Event::Comment(c) => checker.comment(c),
            Event::PI(pi) => checker.processing_instruction(pi),
            Event::GeneralRef(r) => checker.reference(r),
            _ => Ok(()),
        };
        checked.map_err(|e| parse_error(&reader, e))?;
        first = false;

        // Prolog and epilog: one node per line, original whitespace dropped
        if depth == 0 {
            match &event {
                Event::Decl(_) | Event::Eof => {},
                Event::Text(t) if t.iter().all(|&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')) => {
                    continue;
                },
                Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) => {
                    return Err(parse_error(&reader, "content outside the root element"));
                },
                Event::End(_) => return Err(parse_error(&reader, "unexpected end tag")),
                Event::Start(_) | Event::Empty(_) if roots > 0 => {
                    return Err(parse_error(&reader, "more than one root element"));
                },
                _ => writer.get_mut().push(b'\n'),
            }
        }

        match event {
            // Replaced by XML_DECLARATION
            Event::Decl(_) => {},
            Event::Start(e) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                let id = checker
                    .element(&e, reader.resolver())
                    .map_err(|err| parse_error(&reader, err))?;
                let e = visit_element(e, id, in_no_namespace, mapping, &mut updated, &mut tokens)?;
                write(&mut writer, Event::Start(e))?;
            },
            Event::Empty(e) => {
                if depth == 0 {
                    roots += 1;
                }
                let id = checker
                    .element(&e, reader.resolver())
                    .map_err(|err| parse_error(&reader, err))?;
                let e = visit_element(e, id, in_no_namespace, mapping, &mut updated, &mut tokens)?;
                write(&mut writer, Event::Empty(e))?;
            },
            Event::End(e) => {
                depth -= 1;
                write(&mut writer, Event::End(e))?;
            },
            Event::Eof => break,
            other => write(&mut writer, other)?,
        }
    }

    if depth > 0 {
        return Err(Error::Parse(format!(
            "unexpected end of input: {} element(s) left open",
            depth
        )));
    }
    if roots == 0 {
        return Err(Error::Parse("no root element found".to_string()));
    }

    Ok(Enriched {
        xml: writer.into_inner(),
        updated,
        tokens,
    })
}

fn parse_error(reader: &NsReader<&[u8]>, message: impl std::fmt::Display) -> Error {
    Error::Parse(format!("{} (at byte {})", message, reader.buffer_position()))
}

fn strip_bom(xml: &str) -> &str {
    xml.strip_prefix('\u{FEFF}').unwrap_or(xml)
}

/// Annotate `e` if it is a token. `id` is the element's unescaped `id`
/// attribute.
fn visit_element<'a>(
    e: BytesStart<'a>,
    id: Option<String>,
    in_no_namespace: bool,
    mapping: &AnnotationMapping,
    updated: &mut usize,
    tokens: &mut usize,
) -> Result<BytesStart<'a>> {
    if !in_no_namespace || e.name().as_ref() != TOKEN_ELEMENT {
        return Ok(e);
    }
    *tokens += 1;

    let Some((id, record)) = id
        .as_deref()
        .filter(|id| !id.is_empty())
        .and_then(|id| mapping.get_key_value(id))
    else {
        return Ok(e);
    };

    // Counted on a match even when there is nothing to write
    *updated += 1;
    trace!("tok {}: lemma={:?} mfs={:?}", id, record.lemma, record.tag);

    let lemma = record.lemma.as_deref().filter(|v| !v.is_empty());
    let tag = record.tag.as_deref().filter(|v| !v.is_empty());
    if lemma.is_none() && tag.is_none() {
        return Ok(e);
    }

    set_attributes(&e, &[(LEMMA_ATTRIBUTE, lemma), (TAG_ATTRIBUTE, tag)])
}

/// Copy of `e` with each `(name, Some(value))` set: replaced where the
/// attribute exists, appended otherwise. Other attributes keep their order
/// and, unless they were single-quoted around a `"`, their original escaping.
fn set_attributes<'a>(
    e: &BytesStart<'a>,
    updates: &[(&str, Option<&str>)],
) -> Result<BytesStart<'a>> {
    let mut out = e.clone();
    out.clear_attributes();

    let mut done = vec![false; updates.len()];
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Parse(err.to_string()))?;
        let replacement = updates.iter().enumerate().find_map(|(i, (name, value))| {
            match value {
                Some(value) if attr.key.as_ref() == name.as_bytes() => Some((i, *name, *value)),
                _ => None,
            }
        });

        match replacement {
            Some((i, name, value)) => {
                out.push_attribute((name, value));
                done[i] = true;
            },
            // Pushed attributes are always double-quoted
            None if attr.value.contains(&b'"') => {
                let mut value = Vec::with_capacity(attr.value.len() + 8);
                for &b in attr.value.iter() {
                    match b {
                        b'"' => value.extend_from_slice(b"&quot;"),
                        _ => value.push(b),
                    }
                }
                out.push_attribute(Attribute {
                    key: attr.key,
                    value: value.into(),
                });
            },
            None => out.push_attribute(attr),
        }
    }

    for (i, (name, value)) in updates.iter().enumerate() {
        if let (false, Some(value)) = (done[i], value) {
            out.push_attribute((*name, *value));
        }
    }

    Ok(out)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Parse(format!("failed to serialize document: {}", e)))
}
