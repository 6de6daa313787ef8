//! The two-stage pipeline: load annotations, then enrich the corpus.

use std::io::Write;

use log::info;

use crate::annotations::load_annotations;
use crate::common::Result;
use crate::config::Config;
use crate::enrich::enrich;

/// Counts reported by a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Distinct token identifiers loaded from the workbook
    pub loaded: usize,
    /// `tok` elements whose identifier matched
    pub updated: usize,
}

/// Run both stages with `config`, reporting progress lines to `out`.
///
/// The first line is written before enrichment starts, so it is reported
/// even when enrichment fails. Nothing is rolled back on failure.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<Summary> {
    info!(
        "loading annotations from {}#{}",
        config.tagged_file().display(),
        config.sheet()
    );
    let mapping = load_annotations(config.tagged_file(), config.sheet())?;
    writeln!(
        out,
        "Loaded {} token annotations from {}#{}",
        mapping.len(),
        config.tagged_file().display(),
        config.sheet()
    )?;

    info!("enriching {}", config.input_xml().display());
    let updated = enrich(config.input_xml(), config.output_xml(), &mapping)?;
    writeln!(
        out,
        "Updated {} tokens; wrote {}",
        updated,
        config.output_xml().display()
    )?;

    Ok(Summary {
        loaded: mapping.len(),
        updated,
    })
}
