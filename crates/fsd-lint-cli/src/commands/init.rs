//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::project::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# fsd-lint configuration

[analyzer]
# Directory holding the layer directories
base_dir = "src"

# Layers, lowest first
layers = ["shared", "entities", "features", "widgets", "pages", "app", "composers"]

# Files scanned for imports
extensions = [".ts", ".tsx", ".js", ".jsx"]

# Import prefixes that point into base_dir
alias_prefix = "@"
base_prefix = "src/"

# File allowed directly at a layer root
manifest = "index.ts"

# Glob patterns (relative to base_dir) to skip
exclude = [
    # "**/*.stories.tsx",
]

# Respect .gitignore files
respect_gitignore = false

# Worker threads for import analysis (1 = sequential)
# parallelism = 4

# Which layers each layer may import from
[allowed_access]
shared = []
entities = ["shared", "entities"]
features = ["shared", "entities", "features"]
widgets = ["shared", "entities", "features", "widgets"]
pages = ["shared", "entities", "features", "widgets", "pages"]
app = ["shared", "entities", "features", "widgets", "pages", "app"]
composers = ["shared", "composers"]
"#;

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit fsd-lint.toml to match your layers");
    println!("  2. Run: fsd-lint check");

    Ok(config_path)
}
