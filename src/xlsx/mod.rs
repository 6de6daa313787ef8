//! Read-only Excel (.xlsx) support.
//!
//! Only what the annotation loader needs: locate a sheet by name and read
//! its cached cell values. Formulas are never evaluated and nothing is
//! written back.
//!
//! ```rust,no_run
//! use tok_annotate::xlsx::Workbook;
//!
//! let mut workbook = Workbook::open("data/HdE_DCE.tagged.xlsx")?;
//! for name in workbook.sheet_names() {
//!     println!("Sheet: {}", name);
//! }
//! if let Some(sheet) = workbook.worksheet("Revised")? {
//!     println!("{} rows", sheet.row_count());
//! }
//! # Ok::<(), tok_annotate::Error>(())
//! ```

pub mod cell;
pub mod package;
pub mod shared_strings;
pub mod workbook;
pub mod worksheet;

pub use package::Package;
pub use shared_strings::SharedStrings;
pub use workbook::{Workbook, WorksheetInfo};
pub use worksheet::Worksheet;
