//! Token annotations loaded from a worksheet.
//!
//! The first row of the sheet is a header naming (case-insensitively, in
//! any order) the `id`, `lemma` and `tag` columns; every following row is
//! one token record. The result maps token identifiers to their lemma and
//! tag.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use crate::common::{ConfigurationError, Result};
use crate::sheet::Row;
use crate::xlsx::Workbook;
use crate::xlsx::cell::column_to_letters;

/// Lemma and tag of one token.
///
/// A field is `None` when its cell was empty (or otherwise falsy); it is
/// never `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Dictionary base form
    pub lemma: Option<String>,
    /// Morphosyntactic tag, written to the `mfs` attribute
    pub tag: Option<String>,
}

/// Token identifier -> annotation. Keys are never empty.
pub type AnnotationMapping = HashMap<String, AnnotationRecord>;

/// Positions of the required columns, resolved once from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub id: usize,
    pub lemma: usize,
    pub tag: usize,
}

impl ColumnIndex {
    /// Resolve the `id`, `lemma` and `tag` columns of a header row.
    ///
    /// Header cells are trimmed and lowercased before comparison. The first
    /// matching column wins; extra columns are ignored.
    pub fn from_header(header: &Row) -> std::result::Result<Self, ConfigurationError> {
        let names: Vec<(usize, String)> = header
            .cells()
            .map(|(col, cell)| (col, cell.to_string().trim().to_lowercase()))
            .collect();

        let position = |column: &'static str| {
            names
                .iter()
                .find(|(_, name)| name == column)
                .map(|(col, _)| *col)
                .ok_or(ConfigurationError::MissingColumn { column })
        };

        Ok(Self {
            id: position("id")?,
            lemma: position("lemma")?,
            tag: position("tag")?,
        })
    }

    /// Build the mapping entry for one data row.
    ///
    /// Returns `None` for rows without a usable identifier.
    pub fn record(&self, row: &Row) -> Option<(String, AnnotationRecord)> {
        let id = row.get(self.id).to_text()?;
        let record = AnnotationRecord {
            lemma: row.get(self.lemma).to_text(),
            tag: row.get(self.tag).to_text(),
        };
        Some((id, record))
    }
}

/// Build the mapping from the rows of a sheet, header first.
///
/// Completely empty rows and rows with a falsy identifier are skipped. A
/// later row with the same identifier replaces the earlier one.
pub fn annotations_from_rows<'a, I>(rows: I) -> Result<AnnotationMapping>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(AnnotationMapping::new());
    };

    let columns = ColumnIndex::from_header(header)?;
    debug!(
        "header columns: id={} lemma={} tag={}",
        column_to_letters(columns.id as u32 + 1),
        column_to_letters(columns.lemma as u32 + 1),
        column_to_letters(columns.tag as u32 + 1)
    );

    let mut mapping = AnnotationMapping::new();
    for row in rows {
        if row.is_empty() {
            continue;
        }
        let Some((id, record)) = columns.record(row) else {
            continue;
        };
        // Last row wins; the overwrite is only reported
        if mapping.contains_key(&id) {
            warn!("duplicate token id '{}', keeping the later row", id);
        }
        mapping.insert(id, record);
    }

    Ok(mapping)
}

/// Load the annotations of sheet `sheet_name` from the workbook at `path`.
///
/// # Errors
///
/// - [`ConfigurationError::SheetNotFound`] if the workbook has no such sheet
/// - [`ConfigurationError::MissingColumn`] if the header lacks `id`, `lemma` or `tag`
/// - [`crate::Error::Workbook`] / [`crate::Error::Io`] if the file cannot be read
///
/// # Examples
///
/// ```rust,no_run
/// use tok_annotate::load_annotations;
///
/// let mapping = load_annotations("data/HdE_DCE.tagged.xlsx", "Revised")?;
/// if let Some(record) = mapping.get("t1") {
///     println!("lemma: {:?}", record.lemma);
/// }
/// # Ok::<(), tok_annotate::Error>(())
/// ```
pub fn load_annotations<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<AnnotationMapping> {
    let path = path.as_ref();
    let mut workbook = Workbook::open(path)?;

    let sheet = workbook
        .worksheet(sheet_name)?
        .ok_or_else(|| ConfigurationError::SheetNotFound {
            sheet: sheet_name.to_string(),
            path: path.to_path_buf(),
        })?;
    debug!(
        "sheet '{}': {} row(s) x {} column(s)",
        sheet.name(),
        sheet.row_count(),
        sheet.column_count()
    );

    let mapping = annotations_from_rows(sheet.rows())?;
    info!(
        "loaded {} annotation(s) from {}#{}",
        mapping.len(),
        path.display(),
        sheet_name
    );
    Ok(mapping)
}
