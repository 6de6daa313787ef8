//! Common types for spreadsheet values.

use std::fmt;

/// Types of data that can be stored in a cell.
///
/// Cells are read in values-only mode: for formula cells this holds the
/// cached result, never the formula.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value
    String(String),
    /// Error value (e.g. `#N/A`)
    Error(String),
}

impl CellValue {
    /// Whether the cell counts as "set".
    ///
    /// Empty cells, empty strings, zero and `false` are falsy; everything
    /// else is truthy, including whitespace-only strings and error values.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Bool(b) => *b,
            CellValue::Int(i) => *i != 0,
            CellValue::Float(f) => *f != 0.0,
            CellValue::String(s) | CellValue::Error(s) => !s.is_empty(),
        }
    }

    /// Whether the cell holds nothing at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The cell's text when it is truthy, `None` otherwise.
    pub fn to_text(&self) -> Option<String> {
        self.is_truthy().then(|| self.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Int(i) => f.write_str(itoa::Buffer::new().format(*i)),
            // ryu always keeps a fractional part or an exponent: 1.0, 2.5, 1e16
            CellValue::Float(v) => f.write_str(ryu::Buffer::new().format(*v)),
            CellValue::String(s) | CellValue::Error(s) => f.write_str(s),
        }
    }
}

/// One worksheet row, stored sparsely.
///
/// Only non-empty cells are kept, ordered by their 0-based column, so a
/// single far-right cell costs one entry rather than a padded run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(usize, CellValue)>,
}

/// Returned for columns a row does not hold.
static EMPTY: CellValue = CellValue::Empty;

impl Row {
    /// Create an empty row.
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Set the cell at 0-based `column`, replacing any earlier value.
    /// Storing `Empty` clears the cell.
    pub fn set(&mut self, column: usize, value: CellValue) {
        match self.cells.binary_search_by_key(&column, |(col, _)| *col) {
            Ok(idx) if value.is_empty() => {
                self.cells.remove(idx);
            },
            Ok(idx) => self.cells[idx].1 = value,
            Err(_) if value.is_empty() => {},
            Err(idx) => self.cells.insert(idx, (column, value)),
        }
    }

    /// The cell at 0-based `column`; `Empty` when the row has none.
    pub fn get(&self, column: usize) -> &CellValue {
        match self.cells.binary_search_by_key(&column, |(col, _)| *col) {
            Ok(idx) => &self.cells[idx].1,
            Err(_) => &EMPTY,
        }
    }

    /// Whether every cell of the row is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// One past the last non-empty column.
    #[inline]
    pub fn width(&self) -> usize {
        self.cells.last().map(|(col, _)| col + 1).unwrap_or(0)
    }

    /// Non-empty cells with their 0-based columns, left to right.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &CellValue)> {
        self.cells.iter().map(|(col, value)| (*col, value))
    }
}

impl FromIterator<CellValue> for Row {
    fn from_iter<I: IntoIterator<Item = CellValue>>(iter: I) -> Self {
        let cells = iter
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        Self { cells }
    }
}

impl From<Vec<CellValue>> for Row {
    fn from(values: Vec<CellValue>) -> Self {
        values.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_is_sparse() {
        let mut row = Row::new();
        row.set(16383, CellValue::Int(1));
        row.set(2, CellValue::String("c".to_string()));
        row.set(5, CellValue::Empty);

        assert_eq!(row.width(), 16384);
        assert_eq!(row.cells().count(), 2);
        assert_eq!(row.get(2), &CellValue::String("c".to_string()));
        assert_eq!(row.get(3), &CellValue::Empty);
        assert_eq!(row.cells().next().map(|(col, _)| col), Some(2));

        row.set(2, CellValue::Empty);
        assert_eq!(row.cells().count(), 1);
    }

    #[test]
    fn test_row_from_dense_values() {
        let row = Row::from(vec![CellValue::Empty, CellValue::Int(4), CellValue::Empty]);
        assert_eq!(row.width(), 2);
        assert_eq!(row.get(1), &CellValue::Int(4));
        assert!(Row::from(vec![CellValue::Empty]).is_empty());
    }

    #[test]
    fn test_truthiness() {
        assert!(!CellValue::Empty.is_truthy());
        assert!(!CellValue::String(String::new()).is_truthy());
        assert!(!CellValue::Int(0).is_truthy());
        assert!(!CellValue::Float(0.0).is_truthy());
        assert!(!CellValue::Bool(false).is_truthy());

        assert!(CellValue::String(" ".to_string()).is_truthy());
        assert!(CellValue::Int(-3).is_truthy());
        assert!(CellValue::Bool(true).is_truthy());
        assert!(CellValue::Error("#N/A".to_string()).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Float(1.0).to_string(), "1.0");
        assert_eq!(CellValue::Float(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::String("run".to_string()).to_string(), "run");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Int(0).to_text(), None);
        assert_eq!(CellValue::Empty.to_text(), None);
        assert_eq!(CellValue::Int(7).to_text().as_deref(), Some("7"));
    }
}
