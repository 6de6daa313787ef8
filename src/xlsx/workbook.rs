//! Excel workbook access.
//!
//! Sheets are listed from the workbook part and located through its
//! relationships, so workbooks whose sheet parts are not named
//! `sheetN.xml` (or are not numbered in sheet order) still resolve.

use std::path::Path;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::xml::attribute_value;
use crate::common::{Error, Result};

use super::package::{self, Package};
use super::shared_strings::SharedStrings;
use super::worksheet::Worksheet;

/// Part name used when the package relationships do not name the workbook.
const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";
/// Part name used when the workbook relationships do not name a shared strings table.
const DEFAULT_SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Information about a worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetInfo {
    /// Worksheet name as shown on its tab
    pub name: String,
    /// Relationship ID for the worksheet
    pub relationship_id: String,
    /// ZIP member holding the worksheet XML
    pub part_name: String,
}

/// A read-only Excel workbook.
pub struct Workbook {
    /// The underlying package
    package: Package,
    /// Worksheets in workbook order
    worksheets: Vec<WorksheetInfo>,
    /// Shared strings table
    shared_strings: SharedStrings,
}

impl Workbook {
    /// Open a workbook from a path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let package = Package::open(path)?;
        Self::from_package(package)
    }

    /// Load workbook structure and shared strings from an opened package.
    pub fn from_package(mut package: Package) -> Result<Self> {
        let workbook_part = package
            .relationships("")?
            .into_iter()
            .find(|rel| rel.is(package::OFFICE_DOCUMENT) && !rel.external)
            .map(|rel| rel.target)
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string());
        debug!("workbook part: {}", workbook_part);

        let content = package
            .read_xml(&workbook_part)?
            .ok_or_else(|| Error::Workbook(format!("{} not found in package", workbook_part)))?;
        let sheets = parse_workbook_xml(&content)
            .map_err(|e| Error::Workbook(format!("{}: {}", workbook_part, e)))?;

        let rels = package.relationships(&workbook_part)?;
        let mut worksheets = Vec::with_capacity(sheets.len());
        for (name, relationship_id) in sheets {
            let part_name = rels
                .iter()
                .find(|rel| rel.id == relationship_id)
                .map(|rel| rel.target.clone())
                .ok_or_else(|| {
                    Error::Workbook(format!(
                        "Sheet '{}' refers to unknown relationship {}",
                        name, relationship_id
                    ))
                })?;
            worksheets.push(WorksheetInfo {
                name,
                relationship_id,
                part_name,
            });
        }

        let shared_strings_part = rels
            .iter()
            .find(|rel| rel.is(package::SHARED_STRINGS) && !rel.external)
            .map(|rel| rel.target.clone())
            .or_else(|| {
                package
                    .contains(DEFAULT_SHARED_STRINGS_PART)
                    .then(|| DEFAULT_SHARED_STRINGS_PART.to_string())
            });

        let shared_strings = match shared_strings_part {
            Some(part) => match package.read_xml(&part)? {
                Some(xml) => SharedStrings::parse(&xml)
                    .map_err(|e| Error::Workbook(format!("{}: {}", part, e)))?,
                None => SharedStrings::new(),
            },
            None => SharedStrings::new(),
        };
        debug!(
            "workbook has {} sheet(s), {} shared string(s)",
            worksheets.len(),
            shared_strings.len()
        );

        Ok(Self {
            package,
            worksheets,
            shared_strings,
        })
    }

    /// Worksheet names in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.worksheets.iter().map(|ws| ws.name.as_str())
    }

    /// Worksheet information in workbook order.
    #[inline]
    pub fn worksheets(&self) -> &[WorksheetInfo] {
        &self.worksheets
    }

    /// Load the worksheet with exactly this name, `None` if there is none.
    pub fn worksheet(&mut self, name: &str) -> Result<Option<Worksheet>> {
        let Some(info) = self.worksheets.iter().find(|ws| ws.name == name) else {
            return Ok(None);
        };

        debug!("loading sheet '{}' from {}", info.name, info.part_name);
        let content = self.package.read_xml(&info.part_name)?.ok_or_else(|| {
            Error::Workbook(format!(
                "Sheet '{}' part {} not found in package",
                info.name, info.part_name
            ))
        })?;

        Worksheet::parse(&info.name, &content, &self.shared_strings)
            .map(Some)
            .map_err(Error::Workbook)
    }
}

/// Parse the workbook part into `(sheet name, relationship id)` pairs.
fn parse_workbook_xml(content: &str) -> std::result::Result<Vec<(String, String)>, String> {
    let mut sheets = Vec::new();
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    let mut name = None;
                    let mut relationship_id = None;

                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| e.to_string())?;
                        let key = attr.key;
                        if key.as_ref() == b"name" {
                            name = Some(attribute_value(&attr)?);
                        } else if key.local_name().as_ref() == b"id" && key.prefix().is_some() {
                            // r:id, whatever the relationships prefix is called
                            relationship_id = Some(attribute_value(&attr)?);
                        }
                    }

                    match (name, relationship_id) {
                        (Some(name), Some(rid)) => sheets.push((name, rid)),
                        _ => return Err("<sheet> without name or r:id".to_string()),
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("Workbook parse error: {}", e)),
            _ => {},
        }
        buf.clear();
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workbook_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <bookViews><workbookView activeTab="1"/></bookViews>
  <sheets>
    <sheet name="Original" sheetId="1" r:id="rId1"/>
    <sheet name="Revised &amp; checked" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#;

        let sheets = parse_workbook_xml(xml).unwrap();
        assert_eq!(
            sheets,
            vec![
                ("Original".to_string(), "rId1".to_string()),
                ("Revised & checked".to_string(), "rId2".to_string()),
            ]
        );
    }

    #[test]
    fn test_sheet_without_relationship_is_rejected() {
        let xml = r#"<workbook><sheets><sheet name="A" sheetId="1"/></sheets></workbook>"#;
        assert!(parse_workbook_xml(xml).is_err());
    }
}
