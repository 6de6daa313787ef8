//! tok-annotate - merge spreadsheet annotations into an XML corpus
//!
//! Reads lemma and tag annotations from a named sheet of an Excel workbook
//! (.xlsx) and writes them onto the `tok` elements of a corpus document,
//! matching worksheet rows to elements by token identifier.
//!
//! # Pipeline
//!
//! 1. [`load_annotations`] reads the sheet into an [`AnnotationMapping`]
//!    (`id` -> lemma/tag), using the header row to find the `id`, `lemma`
//!    and `tag` columns.
//! 2. [`enrich`] sets `lemma` and `mfs` on every `tok` whose `id` is in the
//!    mapping and writes the result to a new file.
//!
//! # Example
//!
//! ```rust,no_run
//! use tok_annotate::{Config, run};
//!
//! let config = Config::new()
//!     .with_tagged_file("data/HdE_DCE.tagged.xlsx")
//!     .with_sheet("Revised");
//! let summary = run(&config, &mut std::io::stdout())?;
//! println!("{} of {} annotations used", summary.updated, summary.loaded);
//! # Ok::<(), tok_annotate::Error>(())
//! ```

/// Error types and shared XML helpers
pub mod common;

/// Format-independent cell values
pub mod sheet;

/// Read-only Excel (.xlsx) reader
pub mod xlsx;

/// Annotation loading
pub mod annotations;

/// Corpus enrichment
pub mod enrich;

/// Run configuration
pub mod config;

mod driver;

pub use annotations::{AnnotationMapping, AnnotationRecord, load_annotations};
pub use common::{ConfigurationError, Error, Result};
pub use config::Config;
pub use driver::{Summary, run};
pub use enrich::{Enriched, enrich, enrich_bytes, enrich_str};
