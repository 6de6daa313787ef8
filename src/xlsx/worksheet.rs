//! Worksheet implementation for Excel files.
//!
//! The `sheetData` section is read into sparse rows of cached values.
//! Formulas (`<f>`) are ignored: formula cells yield the result Excel last
//! stored in `<v>`, so nothing is ever re-evaluated.
//!
//! Row and column numbers are bounded by the Excel grid
//! ([`MAX_ROWS`] x [`MAX_COLUMNS`]); anything beyond is rejected.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::xml::{TextBuffer, attribute_value, find_attribute};
use crate::sheet::{CellValue, Row};

use super::cell::{MAX_COLUMNS, MAX_ROWS, reference_to_coords};
use super::shared_strings::SharedStrings;

/// A loaded worksheet.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    /// Rows holding at least one element or cell, by 1-based row number
    rows: BTreeMap<u32, Row>,
}

/// Stands in for rows the sheet does not contain.
static EMPTY_ROW: Row = Row::new();

/// The cell currently being read.
struct PendingCell {
    column: u32,
    kind: Option<String>,
    value: Option<String>,
    inline: Option<String>,
}

/// What character data currently belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    InlineText,
}

impl Worksheet {
    /// Parse worksheet XML, resolving shared strings from `shared`.
    pub fn parse(name: &str, content: &str, shared: &SharedStrings) -> Result<Self, String> {
        let mut rows: BTreeMap<u32, Row> = BTreeMap::new();

        let mut reader = Reader::from_str(content);
        let mut buf = Vec::new();
        let mut text = TextBuffer::new();

        let mut in_sheet_data = false;
        let mut current_row: Option<u32> = None;
        let mut last_row = 0u32;
        let mut last_column = 0u32;
        let mut cell: Option<PendingCell> = None;
        let mut in_inline = false;
        let mut phonetic_depth = 0usize;
        let mut capture = Capture::None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"sheetData" => in_sheet_data = true,
                    b"row" if in_sheet_data => {
                        let row = Self::row_number(e, last_row)?;
                        rows.entry(row).or_default();
                        current_row = Some(row);
                        last_row = row;
                        last_column = 0;
                    },
                    b"c" if current_row.is_some() => {
                        let pending = Self::start_cell(e, last_column)?;
                        last_column = pending.column;
                        cell = Some(pending);
                    },
                    b"v" if cell.is_some() => {
                        capture = Capture::Value;
                        text.clear();
                    },
                    b"is" if cell.is_some() => in_inline = true,
                    b"rPh" => phonetic_depth += 1,
                    b"t" if in_inline && phonetic_depth == 0 => capture = Capture::InlineText,
                    _ => {},
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"row" if in_sheet_data => {
                        let row = Self::row_number(e, last_row)?;
                        rows.entry(row).or_default();
                        last_row = row;
                    },
                    // A cell without content still takes up its column
                    b"c" if current_row.is_some() => {
                        last_column = Self::start_cell(e, last_column)?.column;
                    },
                    _ => {},
                },
                Ok(Event::Text(ref t)) if capture != Capture::None => text.push_text(t)?,
                Ok(Event::GeneralRef(ref r)) if capture != Capture::None => text.push_ref(r)?,
                Ok(Event::CData(ref c)) if capture != Capture::None => text.push_cdata(c)?,
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"sheetData" => in_sheet_data = false,
                    b"row" => current_row = None,
                    b"v" if capture == Capture::Value => {
                        if let Some(pending) = cell.as_mut() {
                            pending.value = Some(text.take()?);
                        }
                        capture = Capture::None;
                    },
                    b"t" if capture == Capture::InlineText => {
                        let chunk = text.take()?;
                        if let Some(pending) = cell.as_mut() {
                            pending.inline.get_or_insert_with(String::new).push_str(&chunk);
                        }
                        capture = Capture::None;
                    },
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"is" => in_inline = false,
                    b"c" => {
                        if let (Some(pending), Some(row)) = (cell.take(), current_row) {
                            let column = pending.column;
                            let value = Self::decode_cell(pending, shared)?;
                            rows.entry(row).or_default().set((column - 1) as usize, value);
                        }
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(format!("Worksheet '{}' parse error: {}", name, e)),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self {
            name: name.to_string(),
            rows,
        })
    }

    /// Row number from `r`, or the row after `previous` when absent.
    fn row_number(e: &BytesStart<'_>, previous: u32) -> Result<u32, String> {
        match find_attribute(e, b"r")? {
            Some(r) => match atoi_simd::parse::<u32, false, false>(r.trim().as_bytes()) {
                Ok(row) if (1..=MAX_ROWS).contains(&row) => Ok(row),
                _ => Err(format!("Invalid row number: {}", r)),
            },
            None if previous < MAX_ROWS => Ok(previous + 1),
            None => Err(format!("Row after {} is beyond the last sheet row", previous)),
        }
    }

    /// Read the attributes of a `<c>` element.
    fn start_cell(e: &BytesStart<'_>, previous_column: u32) -> Result<PendingCell, String> {
        let mut reference = None;
        let mut kind = None;

        for attr in e.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            match attr.key.as_ref() {
                b"r" => reference = Some(attribute_value(&attr)?),
                b"t" => kind = Some(attribute_value(&attr)?),
                _ => {},
            }
        }

        let column = match reference {
            Some(r) => reference_to_coords(&r)
                .map(|(col, _)| col)
                .ok_or_else(|| format!("Invalid cell reference: {}", r))?,
            None if previous_column < MAX_COLUMNS => previous_column + 1,
            None => {
                return Err(format!(
                    "Cell after column {} is beyond the last sheet column",
                    previous_column
                ));
            },
        };

        Ok(PendingCell {
            column,
            kind,
            value: None,
            inline: None,
        })
    }

    /// Turn the raw pieces of a cell into a value according to its type.
    fn decode_cell(cell: PendingCell, shared: &SharedStrings) -> Result<CellValue, String> {
        let PendingCell {
            kind,
            value,
            inline,
            ..
        } = cell;

        if kind.as_deref() == Some("inlineStr") {
            return Ok(match inline.or(value) {
                Some(s) => CellValue::String(s),
                None => CellValue::Empty,
            });
        }

        let Some(v) = value else {
            return Ok(CellValue::Empty);
        };

        let decoded = match kind.as_deref() {
            Some("s") => {
                let index = atoi_simd::parse::<usize, false, false>(v.trim().as_bytes())
                    .map_err(|_| format!("Invalid shared string index: {}", v))?;
                let s = shared
                    .get(index)
                    .ok_or_else(|| format!("Shared string index {} out of range", index))?;
                CellValue::String(s.to_string())
            },
            Some("str") | Some("d") => CellValue::String(v),
            Some("b") => match v.trim() {
                "1" | "true" => CellValue::Bool(true),
                "0" | "false" => CellValue::Bool(false),
                _ => CellValue::Error(v),
            },
            Some("e") => CellValue::Error(v),
            _ => Self::decode_number(v),
        };

        Ok(decoded)
    }

    /// Numeric cells: integers stay integers, anything with a fraction or
    /// exponent becomes a float, unparsable text is kept as text.
    fn decode_number(v: String) -> CellValue {
        let trimmed = v.trim();
        if let Ok(int_val) = atoi_simd::parse::<i64, false, false>(trimmed.as_bytes()) {
            CellValue::Int(int_val)
        } else if let Ok(float_val) = fast_float2::parse(trimmed) {
            CellValue::Float(float_val)
        } else {
            CellValue::String(v)
        }
    }

    /// Worksheet name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The row with 1-based number `number`, if the sheet contains it.
    #[inline]
    pub fn row(&self, number: u32) -> Option<&Row> {
        self.rows.get(&number)
    }

    /// Every row from sheet row 1 to the last row present, in order.
    /// Rows the sheet does not contain are yielded as empty rows.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        (1..=self.last_row()).map(|number| self.rows.get(&number).unwrap_or(&EMPTY_ROW))
    }

    /// Number of the last row present, 0 for an empty sheet.
    #[inline]
    pub fn last_row(&self) -> u32 {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    /// Number of rows, counted from row 1.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.last_row() as usize
    }

    /// Number of columns, counted from column A.
    pub fn column_count(&self) -> usize {
        self.rows.values().map(Row::width).max().unwrap_or(0)
    }
}
