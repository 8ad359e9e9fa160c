//! Process command: filters and summarizes a saved JSON report.

use anyhow::{Context, Result};
use clap::Args;
use fsd_lint_core::Report;
use std::path::PathBuf;

use super::output;

/// Options for `fsd-lint process`.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// JSON report written by `fsd-lint check`
    pub input: PathBuf,

    /// Write the filtered JSON report to this path
    #[arg(long)]
    pub output_json: Option<PathBuf>,

    /// Write a Markdown report to this path
    #[arg(long)]
    pub output_md: Option<PathBuf>,

    /// Keep only violations from these layers
    #[arg(long, num_args = 1..)]
    pub from_layers: Vec<String>,

    /// Keep only violations into these layers
    #[arg(long, num_args = 1..)]
    pub to_layers: Vec<String>,

    /// Print a short summary
    #[arg(long)]
    pub summary: bool,
}

/// Runs the process command.
pub fn run(args: &ProcessArgs) -> Result<()> {
    let report = Report::from_json_file(&args.input)
        .with_context(|| format!("Error loading report: {}", args.input.display()))?;

    let report = if args.from_layers.is_empty() && args.to_layers.is_empty() {
        report
    } else {
        report.filter_imports(&args.from_layers, &args.to_layers)
    };

    if let Some(path) = &args.output_json {
        std::fs::write(path, report.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Filtered report saved to {}", path.display());
    }

    if let Some(path) = &args.output_md {
        std::fs::write(path, output::render_markdown(&report)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Markdown report generated at {}", path.display());
    }

    if args.summary {
        print!("{}", output::render_summary(&report)?);
    }

    Ok(())
}
