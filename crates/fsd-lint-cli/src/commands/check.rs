//! Check command implementation.

use anyhow::{Context, Result};
use clap::Args;
use fsd_lint_core::{AccessMatrix, Analyzer};
use std::path::PathBuf;
use std::process::ExitCode;

use super::output;
use crate::project::Project;
use crate::OutputFormat;

/// Exit status when violations were found.
const EXIT_VIOLATIONS: u8 = 1;

/// Options for `fsd-lint check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory containing the layer directories
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// JSON file with the access matrix (overrides [allowed_access])
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Console output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the JSON report to this path
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Also write a Markdown report to this path
    #[arg(long)]
    pub md_output: Option<PathBuf>,
}

/// Runs the check command.
pub fn run(project: &Project, args: &CheckArgs, quiet: bool) -> Result<ExitCode> {
    let config = project.load_config()?;

    let mut builder = Analyzer::builder().config(config);
    if let Some(dir) = &args.base_dir {
        builder = builder.base_dir(dir);
    }
    if let Some(path) = &args.rules {
        let matrix = AccessMatrix::from_json_file(path)
            .with_context(|| format!("Failed to load rules: {}", path.display()))?;
        builder = builder.allowed_access(matrix);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;
    let report = analyzer.analyze().context("Analysis failed")?;

    if !quiet {
        output::print(&report, args.format)?;
    }

    if let Some(path) = &args.json_output {
        std::fs::write(path, report.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("JSON report exported to {}", path.display());
    }

    if let Some(path) = &args.md_output {
        std::fs::write(path, output::render_markdown(&report)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Markdown report exported to {}", path.display());
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_VIOLATIONS))
    }
}
