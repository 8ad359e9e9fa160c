//! fsd-lint CLI tool.
//!
//! Usage:
//! ```bash
//! fsd-lint check [OPTIONS]
//! fsd-lint generate [--output FILE]
//! fsd-lint process REPORT.json [OPTIONS]
//! fsd-lint init
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fsd_lint_core::{AnalyzerError, ConfigError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod project;

use project::Project;

/// Exit status when the run itself failed.
const EXIT_FATAL: u8 = 2;

/// Layer dependency checker for Feature-Sliced Design projects
#[derive(Parser)]
#[command(name = "fsd-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress console report and informational logs
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check layer dependencies and directory layout
    Check(commands::check::CheckArgs),

    /// Generate boundary rules from the access matrix
    Generate {
        /// Directory containing the layer directories
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Output JSON file path
        #[arg(short, long, default_value = "fsd_boundaries.json")]
        output: PathBuf,
    },

    /// Filter and summarize a saved JSON report
    Process(commands::process::ProcessArgs),

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// One-line-per-violation compact format.
    Compact,
    /// JSON report.
    Json,
    /// Markdown report.
    Markdown,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let project = Project::discover(&cwd, cli.config.as_deref());
    tracing::debug!(
        "Project root: {:?}, settings: {:?}",
        project.root(),
        project.settings()
    );

    match cli.command {
        Commands::Check(args) => commands::check::run(&project, &args, cli.quiet),
        Commands::Generate { base_dir, output } => {
            commands::generate::run(&project, base_dir, &output)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Process(args) => {
            commands::process::run(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(project.root(), force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints a fatal error, rendering library diagnostics with miette.
fn report_error(err: &anyhow::Error) {
    eprint!("{}", format_error(err));
}

/// Outer context lines, then the first library diagnostic rendered by
/// miette. Errors without a diagnostic list their causes instead.
fn format_error(err: &anyhow::Error) -> String {
    let found = err.chain().enumerate().find_map(|(depth, cause)| {
        cause
            .downcast_ref::<AnalyzerError>()
            .map(|e| e as &dyn miette::Diagnostic)
            .or_else(|| {
                cause
                    .downcast_ref::<ConfigError>()
                    .map(|e| e as &dyn miette::Diagnostic)
            })
            .map(|diagnostic| (depth, diagnostic))
    });

    if let Some((depth, diagnostic)) = found {
        let mut rendered = String::new();
        if miette::GraphicalReportHandler::new()
            .render_report(&mut rendered, diagnostic)
            .is_ok()
        {
            let mut lines: Vec<String> = err
                .chain()
                .take(depth)
                .map(|context| format!("error: {context}\n"))
                .collect();
            lines.push(rendered);
            return lines.concat();
        }
    }

    let mut lines = vec![format!("error: {err}\n")];
    lines.extend(err.chain().skip(1).map(|cause| format!("  caused by: {cause}\n")));
    lines.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_message_is_printed_once() {
        let err = anyhow::Error::new(ConfigError::Validation("no layers declared".into()))
            .context("Failed to build analyzer");

        let text = format_error(&err);

        assert!(text.starts_with("error: Failed to build analyzer\n"));
        assert_eq!(text.matches("no layers declared").count(), 1);
    }

    #[test]
    fn bare_diagnostic_has_no_context_line() {
        let err = anyhow::Error::new(ConfigError::Validation("no layers declared".into()));

        let text = format_error(&err);

        assert!(!text.starts_with("error:"));
        assert_eq!(text.matches("no layers declared").count(), 1);
    }

    #[test]
    fn plain_errors_list_their_causes() {
        let err = anyhow::anyhow!("disk full").context("Failed to write out.json");

        assert_eq!(
            format_error(&err),
            "error: Failed to write out.json\n  caused by: disk full\n"
        );
    }
}
