//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

/// Enrich MARC records with VIAF, ISNI, and Wikidata identifiers.
#[derive(Debug, Parser)]
#[command(name = "marclink", version, about)]
pub struct Cli {
    /// Path to the input MARC file.
    pub input_path: PathBuf,

    /// Path to the output MARC file.
    pub output_path: PathBuf,

    /// Maximum number of records to process.
    #[arg(long, value_name = "N")]
    pub max_records: Option<usize>,

    /// Write input records unchanged instead of the enriched ones.
    ///
    /// Lookups still run and are counted; only the written bytes differ.
    #[arg(long)]
    pub write_original: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}
