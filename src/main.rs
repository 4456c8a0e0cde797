//! marclink command-line entry point.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use marclink::pipeline::{process_with, ProcessOptions};
use marclink::{MarcReader, MarcWriter, ViafClient};

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => {},
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        },
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let input = File::open(&cli.input_path)
        .with_context(|| format!("failed to open {}", cli.input_path.display()))?;
    let output = File::create(&cli.output_path)
        .with_context(|| format!("failed to create {}", cli.output_path.display()))?;

    let mut reader = MarcReader::new(BufReader::new(input));
    let mut writer = MarcWriter::new(BufWriter::new(output));
    let resolver = ViafClient::new().context("failed to build VIAF client")?;

    let options = ProcessOptions {
        max_records: cli.max_records,
        write_enriched: !cli.write_original,
    };

    let bar = progress_bar(cli.max_records);
    let summary = process_with(&mut reader, &mut writer, &resolver, &options, |summary| {
        bar.set_position(summary.records_written as u64);
    })
    .context("record processing failed")?;
    bar.finish_and_clear();

    eprintln!(
        "{} records written ({} lookups, {} failed, {} without identifier)",
        summary.records_written, summary.lookups, summary.lookup_failures, summary.missing_identifier
    );
    Ok(())
}

/// Bounded bar when the record count is known, a spinner otherwise.
fn progress_bar(max_records: Option<usize>) -> ProgressBar {
    match max_records {
        Some(total) => {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {pos}/{len} records [{elapsed_precise}]",
                )
                .expect("static progress template"),
            );
            bar
        },
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {pos} records [{elapsed_precise}]")
                    .expect("static progress template"),
            );
            bar
        },
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbosity.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
