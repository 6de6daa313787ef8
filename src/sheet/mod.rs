//! Format-independent spreadsheet value types.
//!
//! The `xlsx` reader produces rows of [`CellValue`]; the annotation loader
//! consumes them without knowing where they came from.

pub mod types;

pub use types::{CellValue, Row};
