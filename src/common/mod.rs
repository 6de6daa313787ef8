//! Types and utilities shared by the workbook reader and the enricher.

pub mod encoding;
pub mod error;
pub mod xml;

pub use error::{ConfigurationError, Error, Result};
