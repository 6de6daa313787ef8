//! Error types for annotation loading and corpus enrichment.
//!
//! Every failure is fatal for a run: nothing here is retried or recovered,
//! errors are propagated to the driver which reports them and exits.
use std::path::PathBuf;

use thiserror::Error;

/// Result type for tok-annotate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tok-annotate operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The workbook does not have the shape the loader needs
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The corpus XML is malformed or not UTF-8
    #[error("Parse error: {0}")]
    Parse(String),

    /// The .xlsx package or one of its parts is malformed
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures caused by a workbook that lacks the requested sheet or columns.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The named sheet does not exist in the workbook
    #[error("Sheet '{sheet}' not found in {}", path.display())]
    SheetNotFound { sheet: String, path: PathBuf },

    /// A required header column is absent
    #[error("Required column '{column}' not found in header (need 'id', 'lemma', and 'tag')")]
    MissingColumn { column: &'static str },
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Workbook(format!("ZIP error: {}", other)),
        }
    }
}
