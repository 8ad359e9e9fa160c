//! Configuration types for fsd-lint.
//!
//! A config file looks like:
//!
//! ```toml
//! [analyzer]
//! base_dir = "src"
//! layers = ["shared", "entities", "features", "widgets", "pages", "app"]
//! alias_prefix = "@"
//!
//! [allowed_access]
//! shared = []
//! entities = ["shared", "entities"]
//! ```

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::matrix::{AccessMatrix, DEFAULT_LAYERS};

/// Top-level configuration: analyzer settings plus the access matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsdConfig {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Which layers each layer may import from.
    #[serde(default = "AccessMatrix::fsd_default")]
    pub allowed_access: AccessMatrix,
}

impl Default for FsdConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            allowed_access: AccessMatrix::fsd_default(),
        }
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Directory whose immediate children are the layer directories.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Declared layers, in reporting order.
    #[serde(default = "default_layers")]
    pub layers: Vec<String>,

    /// File suffixes scanned for imports.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Prefix of aliased absolute imports (`@/features/auth`).
    #[serde(default = "default_alias_prefix")]
    pub alias_prefix: String,

    /// Literal base-directory prefix of absolute imports (`src/features/auth`).
    #[serde(default = "default_base_prefix")]
    pub base_prefix: String,

    /// File name allowed directly at a layer root.
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Glob patterns (relative to `base_dir`) to exclude from import analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect `.gitignore` files while enumerating sources.
    #[serde(default)]
    pub respect_gitignore: bool,

    /// Worker threads for per-file analysis. `None` uses the global pool.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            layers: default_layers(),
            extensions: default_extensions(),
            alias_prefix: default_alias_prefix(),
            base_prefix: default_base_prefix(),
            manifest: default_manifest(),
            exclude: Vec::new(),
            respect_gitignore: false,
            parallelism: None,
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_layers() -> Vec<String> {
    DEFAULT_LAYERS.iter().map(|s| (*s).to_owned()).collect()
}

fn default_extensions() -> Vec<String> {
    [".ts", ".tsx", ".js", ".jsx"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

fn default_alias_prefix() -> String {
    "@".to_owned()
}

fn default_base_prefix() -> String {
    "src/".to_owned()
}

fn default_manifest() -> String {
    "index.ts".to_owned()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// IO error reading a config file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(fsd_lint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in a config file.
    #[error("invalid config: {message}")]
    #[diagnostic(code(fsd_lint::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Config is structurally invalid.
    #[error("config validation: {0}")]
    #[diagnostic(
        code(fsd_lint::config::validation),
        help("list every [allowed_access] layer in analyzer.layers and keep the prefixes non-empty")
    )]
    Validation(String),
}

impl FsdConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// The access matrix is reordered to follow the declared layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.allowed_access = config.allowed_access.ordered_by(&config.analyzer.layers);
        Ok(config)
    }

    /// Replaces the access matrix, keeping declared layer order.
    #[must_use]
    pub fn with_access_matrix(mut self, matrix: AccessMatrix) -> Self {
        self.allowed_access = matrix.ordered_by(&self.analyzer.layers);
        self
    }

    /// Validate config consistency.
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analyzer = &self.analyzer;

        if analyzer.layers.is_empty() {
            return Err(ConfigError::Validation("no layers declared".into()));
        }

        let mut seen = HashSet::new();
        for layer in &analyzer.layers {
            if !seen.insert(layer.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "layer '{layer}' is declared twice"
                )));
            }
        }

        if analyzer.extensions.is_empty() {
            return Err(ConfigError::Validation("no file extensions to scan".into()));
        }

        if analyzer.alias_prefix.is_empty() {
            return Err(ConfigError::Validation("alias_prefix must not be empty".into()));
        }

        if analyzer.base_prefix.is_empty() {
            return Err(ConfigError::Validation("base_prefix must not be empty".into()));
        }

        self.allowed_access.validate(&analyzer.layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FsdConfig::default();
        assert_eq!(config.analyzer.base_dir, PathBuf::from("src"));
        assert_eq!(config.analyzer.layers.len(), 7);
        assert_eq!(config.analyzer.manifest, "index.ts");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = FsdConfig::parse("").expect("parse failed");
        assert_eq!(config.analyzer.alias_prefix, "@");
        assert_eq!(config.analyzer.base_prefix, "src/");
        assert_eq!(config.allowed_access, AccessMatrix::fsd_default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[analyzer]
base_dir = "./app/src"
layers = ["shared", "entities", "app"]
extensions = [".ts", ".vue"]
alias_prefix = "~"
manifest = "index.tsx"
exclude = ["**/*.test.ts"]
parallelism = 2

[allowed_access]
app = ["shared", "entities", "app"]
shared = []
entities = ["shared", "entities"]
"#;
        let config = FsdConfig::parse(toml).expect("parse failed");
        assert_eq!(config.analyzer.base_dir, PathBuf::from("./app/src"));
        assert_eq!(config.analyzer.extensions, [".ts", ".vue"]);
        assert_eq!(config.analyzer.alias_prefix, "~");
        assert_eq!(config.analyzer.parallelism, Some(2));
        let keys: Vec<&str> = config.allowed_access.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["shared", "entities", "app"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_catches_unknown_layer_in_matrix() {
        let toml = r#"
[analyzer]
layers = ["shared"]

[allowed_access]
shared = ["entities"]
"#;
        let config = FsdConfig::parse(toml).expect("parse failed");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn custom_layers_with_default_matrix_is_rejected() {
        let toml = r#"
[analyzer]
layers = ["shared", "app"]
"#;
        let config = FsdConfig::parse(toml).expect("parse failed");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("entities"));
    }

    #[test]
    fn validate_catches_duplicate_layer() {
        let mut config = FsdConfig::default();
        config.analyzer.layers.push("shared".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn validate_catches_empty_alias() {
        let mut config = FsdConfig::default();
        config.analyzer.alias_prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_empty_base_prefix() {
        let config = FsdConfig::parse("[analyzer]\nbase_prefix = \"\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_prefix must not be empty"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = FsdConfig::parse("[analyzer\nbase_dir = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn json_matrix_override() {
        let matrix = AccessMatrix::from_json(r#"{"app": ["shared"], "shared": []}"#).unwrap();
        let config = FsdConfig::default().with_access_matrix(matrix);
        assert!(config.allowed_access.is_allowed("app", "shared"));
        assert!(!config.allowed_access.is_allowed("pages", "shared"));
        assert_eq!(config.allowed_access.iter().next().map(|(k, _)| k), Some("shared"));
    }
}
