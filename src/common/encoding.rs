//! Character encoding detection for XML documents.
//!
//! The encoding is taken from a byte order mark, from the byte pattern of a
//! UTF-16 document without one, or from the `encoding` pseudo-attribute of
//! the XML declaration, in that order. Documents with none of these are
//! UTF-8. Decoding is strict: a byte sequence that is malformed in the
//! detected encoding is an error, never replaced.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Labels of ISO-8859-1 that are decoded as real Latin-1.
///
/// `encoding_rs` maps them to windows-1252, which differs in 0x80..=0x9F.
const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "iso-ir-100",
    "latin1",
    "l1",
    "cp819",
    "ibm819",
    "csisolatin1",
];

/// Decode an XML document to text.
///
/// # Examples
///
/// ```
/// use tok_annotate::common::encoding::decode_document;
///
/// let latin1 = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>\xe9t\xe9</a>";
/// let text = decode_document(latin1).unwrap();
/// assert!(text.ends_with("<a>\u{e9}t\u{e9}</a>"));
/// ```
pub fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>, String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(encoding, &bytes[bom_len..]);
    }
    // "<?" in UTF-16 without a byte order mark
    if bytes.starts_with(&[0x3C, 0x00, 0x3F, 0x00]) {
        return decode_with(encoding_rs::UTF_16LE, bytes);
    }
    if bytes.starts_with(&[0x00, 0x3C, 0x00, 0x3F]) {
        return decode_with(encoding_rs::UTF_16BE, bytes);
    }

    let Some(label) = declared_encoding(bytes) else {
        return decode_with(encoding_rs::UTF_8, bytes);
    };

    if LATIN1_LABELS.iter().any(|l| label.eq_ignore_ascii_case(l)) {
        return Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()));
    }

    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE => {
            Err(format!(
                "document declares encoding '{}' but is not UTF-16 encoded",
                label
            ))
        },
        Some(encoding) if encoding != encoding_rs::REPLACEMENT => decode_with(encoding, bytes),
        _ => Err(format!("unsupported encoding '{}'", label)),
    }
}

fn decode_with<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Result<Cow<'a, str>, String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| format!("input is not valid {}", encoding.name()))
}

/// The `encoding` value of a leading `<?xml ... ?>` declaration.
///
/// Only reads ASCII-compatible input; anything unexpected yields `None`.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let rest = bytes.strip_prefix(b"<?xml")?;
    if !rest.first().is_some_and(|b| is_space(*b)) {
        return None;
    }
    let end = rest.windows(2).position(|w| w == b"?>")?;
    let decl = &rest[..end];

    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let mut pos = at + 8;
    let skip_space = |mut pos: usize| {
        while decl.get(pos).is_some_and(|b| is_space(*b)) {
            pos += 1;
        }
        pos
    };

    pos = skip_space(pos);
    if decl.get(pos) != Some(&b'=') {
        return None;
    }
    pos = skip_space(pos + 1);
    let quote = *decl.get(pos).filter(|q| **q == b'"' || **q == b'\'')?;
    let value = &decl[pos + 1..];
    let len = value.iter().position(|b| *b == quote)?;

    std::str::from_utf8(&value[..len]).ok().map(str::to_string)
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}
