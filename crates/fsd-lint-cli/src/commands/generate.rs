//! Generate command: writes boundary rules for the current structure.

use anyhow::{Context, Result};
use fsd_lint_core::{Analyzer, BoundaryRules};
use std::path::{Path, PathBuf};

use crate::project::Project;

/// Runs the generate command.
pub fn run(project: &Project, base_dir: Option<PathBuf>, output: &Path) -> Result<()> {
    let config = project.load_config()?;

    let mut builder = Analyzer::builder().config(config);
    if let Some(dir) = base_dir {
        builder = builder.base_dir(dir);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    let structure = analyzer
        .scan_structure()
        .context("Failed to scan project structure")?;
    let config = analyzer.config();
    let rules = BoundaryRules::generate(
        &structure,
        &config.allowed_access,
        &config.analyzer.layers,
    );

    std::fs::write(output, rules.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("FSD boundary rules generated at {}", output.display());
    Ok(())
}
