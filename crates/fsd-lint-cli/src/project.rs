//! Locating the project a command runs against.
//!
//! The project root is the nearest ancestor of the working directory holding
//! `fsd-lint.toml` or `.fsd-lint.toml`, else the nearest one holding a
//! `package.json`, else the working directory itself.
//!
//! Settings are taken from `--config`, then the project's config file, then
//! `$FSD_LINT_CONFIG_DIR/config.toml` (or `~/.fsd-lint/config.toml`), and
//! fall back to the built-in defaults. A relative `base_dir` read from a
//! config file is anchored at that file's directory; global and built-in
//! settings are anchored at the project root.

use anyhow::{Context, Result};
use fsd_lint_core::FsdConfig;
use std::path::{Path, PathBuf};

/// File name `init` writes.
pub const CONFIG_FILE: &str = "fsd-lint.toml";

/// Project config file names, checked in order in each directory.
const CONFIG_FILE_NAMES: [&str; 2] = [CONFIG_FILE, ".fsd-lint.toml"];

/// Marks a project root when no config file exists.
const PACKAGE_MANIFEST: &str = "package.json";

const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Where a project's settings come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settings {
    /// Given with `--config`.
    Flag(PathBuf),
    /// Config file at the project root.
    Project(PathBuf),
    /// Shared config in the global config directory.
    Global(PathBuf),
    /// Nothing found; built-in defaults.
    BuiltIn,
}

/// A project root and the settings that apply to it.
///
/// Paths are relative to the working directory; the root is empty when it
/// is the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    settings: Settings,
}

impl Project {
    /// Finds the project containing `cwd`, which must be absolute.
    #[must_use]
    pub fn discover(cwd: &Path, flag: Option<&Path>) -> Self {
        discover_with(cwd, flag, global_config_dir())
    }

    /// The project root, relative to the working directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the settings come from.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Loads the settings with `base_dir` anchored as described in the
    /// module docs.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load_config(&self) -> Result<FsdConfig> {
        let (mut config, anchor) = match &self.settings {
            Settings::BuiltIn => (FsdConfig::default(), self.root.as_path()),
            Settings::Flag(path) | Settings::Project(path) => {
                (read_config(path)?, path.parent().unwrap_or(self.root.as_path()))
            }
            Settings::Global(path) => {
                tracing::info!("Using global config: {}", path.display());
                (read_config(path)?, self.root.as_path())
            }
        };

        // An absolute base_dir replaces the anchor.
        config.analyzer.base_dir = anchor.join(&config.analyzer.base_dir);
        tracing::debug!("Base directory: {}", config.analyzer.base_dir.display());
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<FsdConfig> {
    FsdConfig::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Takes `global_dir` as a parameter so tests need not touch env vars.
fn discover_with(cwd: &Path, flag: Option<&Path>, global_dir: Option<PathBuf>) -> Project {
    let config_file = cwd.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    });

    let root_dir = match &config_file {
        Some(file) => file.parent().unwrap_or(cwd),
        None => cwd
            .ancestors()
            .find(|dir| dir.join(PACKAGE_MANIFEST).is_file())
            .unwrap_or(cwd),
    };
    let root = relative_to(cwd, root_dir);

    let settings = if let Some(path) = flag {
        Settings::Flag(path.to_path_buf())
    } else if let Some(file) = config_file {
        tracing::debug!("Found project config: {}", file.display());
        Settings::Project(root.join(file.file_name().unwrap_or_default()))
    } else if let Some(file) = global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_FILE))
        .filter(|file| file.is_file())
    {
        tracing::debug!("Found global config: {}", file.display());
        Settings::Global(file)
    } else {
        Settings::BuiltIn
    };

    Project { root, settings }
}

/// `../` steps from `cwd` up to its ancestor `dir`.
fn relative_to(cwd: &Path, dir: &Path) -> PathBuf {
    let depth = cwd
        .strip_prefix(dir)
        .map_or(0, |rest| rest.components().count());
    (0..depth).map(|_| "..").collect()
}

/// Returns the global config directory path.
///
/// Resolution: `$FSD_LINT_CONFIG_DIR` > `~/.fsd-lint/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("FSD_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".fsd-lint"))
}
