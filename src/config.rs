//! Run configuration.
//!
//! Every path and the sheet name live in one [`Config`] value that is built
//! once at startup and handed to the stages by reference.

use std::path::{Path, PathBuf};

/// Default annotated workbook.
pub const DEFAULT_TAGGED_FILE: &str = "data/HdE_DCE.tagged.xlsx";
/// Default corpus document.
pub const DEFAULT_INPUT_XML: &str = "data/HdE_DCE.xml";
/// Default output document.
pub const DEFAULT_OUTPUT_XML: &str = "HdE_DCE.enriched.xml";
/// Default worksheet name.
pub const DEFAULT_SHEET: &str = "Revised";

/// Configuration for one run.
///
/// # Examples
///
/// ```rust
/// use tok_annotate::Config;
///
/// let config = Config::new()
///     .with_tagged_file("tagged.xlsx")
///     .with_sheet("Sheet1");
/// assert_eq!(config.sheet(), "Sheet1");
/// assert_eq!(config.output_xml().to_str(), Some("HdE_DCE.enriched.xml"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    tagged_file: PathBuf,
    input_xml: PathBuf,
    output_xml: PathBuf,
    sheet: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tagged_file: PathBuf::from(DEFAULT_TAGGED_FILE),
            input_xml: PathBuf::from(DEFAULT_INPUT_XML),
            output_xml: PathBuf::from(DEFAULT_OUTPUT_XML),
            sheet: DEFAULT_SHEET.to_string(),
        }
    }
}

impl Config {
    /// Create a new `Config` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the annotated workbook (.xlsx).
    #[inline]
    pub fn with_tagged_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tagged_file = path.into();
        self
    }

    /// Set the corpus document to read.
    #[inline]
    pub fn with_input_xml(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_xml = path.into();
        self
    }

    /// Set where the enriched document is written.
    ///
    /// Nothing stops this from being the input path.
    #[inline]
    pub fn with_output_xml(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_xml = path.into();
        self
    }

    /// Set the worksheet to read annotations from (exact name).
    #[inline]
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    #[inline]
    pub fn tagged_file(&self) -> &Path {
        &self.tagged_file
    }

    #[inline]
    pub fn input_xml(&self) -> &Path {
        &self.input_xml
    }

    #[inline]
    pub fn output_xml(&self) -> &Path {
        &self.output_xml
    }

    #[inline]
    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}
