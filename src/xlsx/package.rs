//! Read-only access to the ZIP container of an `.xlsx` workbook.
//!
//! The whole file is read into memory once; parts are decompressed on
//! demand. Relationship parts (`_rels/*.rels`) are parsed here so the
//! workbook can locate its sheets and shared strings the way Excel does,
//! instead of guessing part names.

use std::io::{Cursor, Read};
use std::path::Path;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::common::xml::{attribute_value, strip_utf8_bom};
use crate::common::{Error, Result};

/// Relationship type suffix of the main workbook part.
pub const OFFICE_DOCUMENT: &str = "/officeDocument";
/// Relationship type suffix of a worksheet part.
pub const WORKSHEET: &str = "/worksheet";
/// Relationship type suffix of the shared strings part.
pub const SHARED_STRINGS: &str = "/sharedStrings";

/// A relationship from one part to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID, e.g. `rId1`
    pub id: String,
    /// Relationship type URI
    pub reltype: String,
    /// Target part name, resolved to a ZIP member name (no leading `/`)
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with `suffix`.
    ///
    /// Strict and transitional OOXML use different namespace roots but the
    /// same final path segment.
    #[inline]
    pub fn is(&self, suffix: &str) -> bool {
        self.reltype.ends_with(suffix)
    }
}

/// An opened `.xlsx` package.
pub struct Package {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl Package {
    /// Open a package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening workbook package {}", path.display());
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Open a package from owned bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive })
    }

    /// Check if a member exists in the package.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Read the raw bytes of a part, `None` if the part does not exist.
    pub fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    /// Read an XML part as text, `None` if the part does not exist.
    pub fn read_xml(&mut self, name: &str) -> Result<Option<String>> {
        let Some(data) = self.read_part(name)? else {
            return Ok(None);
        };

        let text = std::str::from_utf8(strip_utf8_bom(&data))
            .map_err(|e| Error::Workbook(format!("{} is not valid UTF-8: {}", name, e)))?;
        Ok(Some(text.to_string()))
    }

    /// Relationships of `source` (use `""` for package-level relationships).
    ///
    /// A part without a relationships file has no relationships.
    pub fn relationships(&mut self, source: &str) -> Result<Vec<Relationship>> {
        let rels_name = rels_part_for(source);
        match self.read_xml(&rels_name)? {
            Some(xml) => parse_rels_xml(&xml, source)
                .map_err(|e| Error::Workbook(format!("{}: {}", rels_name, e))),
            None => Ok(Vec::new()),
        }
    }
}

/// Name of the relationships part for `source`.
///
/// `xl/workbook.xml` -> `xl/_rels/workbook.xml.rels`, `""` -> `_rels/.rels`.
pub fn rels_part_for(source: &str) -> String {
    match source.rfind('/') {
        Some(slash) => format!("{}/_rels/{}.rels", &source[..slash], &source[slash + 1..]),
        None => format!("_rels/{}.rels", source),
    }
}

/// Resolve a relationship target against the part that declares it.
///
/// Absolute targets start at the package root; relative ones are taken from
/// the source part's directory, with `.` and `..` segments folded.
pub fn resolve_target(source: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        match source.rfind('/') {
            Some(slash) => format!("{}/{}", &source[..slash], target),
            None => target.to_string(),
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Parse a relationships part.
fn parse_rels_xml(xml: &str, source: &str) -> std::result::Result<Vec<Relationship>, String> {
    let mut rels = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut reltype = None;
                    let mut target = None;
                    let mut external = false;

                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| e.to_string())?;
                        match attr.key.as_ref() {
                            b"Id" => id = Some(attribute_value(&attr)?),
                            b"Type" => reltype = Some(attribute_value(&attr)?),
                            b"Target" => target = Some(attribute_value(&attr)?),
                            b"TargetMode" => external = attribute_value(&attr)? == "External",
                            _ => {},
                        }
                    }

                    if let (Some(id), Some(reltype), Some(target)) = (id, reltype, target) {
                        let target = if external {
                            target
                        } else {
                            resolve_target(source, &target)
                        };
                        rels.push(Relationship {
                            id,
                            reltype,
                            target,
                            external,
                        });
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("Rels parse error: {}", e)),
            _ => {},
        }
        buf.clear();
    }

    Ok(rels)
}
