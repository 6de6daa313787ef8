use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use tok_annotate::config::{
    Config, DEFAULT_INPUT_XML, DEFAULT_OUTPUT_XML, DEFAULT_SHEET, DEFAULT_TAGGED_FILE,
};

/// Enrich the tok elements of an XML corpus with lemma and tag annotations
/// from an Excel sheet.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Annotated workbook (.xlsx) with id, lemma and tag columns
    #[arg(default_value = DEFAULT_TAGGED_FILE)]
    tagged_file: PathBuf,

    /// Corpus document to read
    #[arg(default_value = DEFAULT_INPUT_XML)]
    input_xml: PathBuf,

    /// Where to write the enriched document
    #[arg(default_value = DEFAULT_OUTPUT_XML)]
    output_xml: PathBuf,

    /// Worksheet holding the annotations
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config::new()
            .with_tagged_file(args.tagged_file)
            .with_input_xml(args.input_xml)
            .with_output_xml(args.output_xml)
            .with_sheet(args.sheet)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = Config::from(args);
    debug!("{:?}", config);

    match tok_annotate::run(&config, &mut std::io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = Config::from(Args::parse_from(["tok-annotate"]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_positionals_and_sheet() {
        let args = Args::parse_from(["tok-annotate", "a.xlsx", "in.xml", "out.xml", "--sheet", "Draft"]);
        let config = Config::from(args);
        assert_eq!(config.tagged_file(), Path::new("a.xlsx"));
        assert_eq!(config.input_xml(), Path::new("in.xml"));
        assert_eq!(config.output_xml(), Path::new("out.xml"));
        assert_eq!(config.sheet(), "Draft");
    }

    #[test]
    fn test_partial_positionals_keep_later_defaults() {
        let config = Config::from(Args::parse_from(["tok-annotate", "a.xlsx"]));
        assert_eq!(config.input_xml(), Path::new(DEFAULT_INPUT_XML));
        assert_eq!(config.output_xml(), Path::new(DEFAULT_OUTPUT_XML));
    }
}
