//! Violation analyzer: orchestrates scanning, extraction, and classification.

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, FsdConfig};
use crate::extractor::ImportExtractor;
use crate::layer::classify;
use crate::matrix::AccessMatrix;
use crate::report::{DirectoryViolation, ImportViolation, Report, Violation};
use crate::resolver::PathResolver;
use crate::scanner::{self, ProjectStructure};

/// Errors that abort an analysis run.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum AnalyzerError {
    /// The base directory could not be read.
    #[error("cannot read base directory {path}: {source}")]
    #[diagnostic(
        code(fsd_lint::base_dir),
        help("point --base-dir (or analyzer.base_dir) at the directory holding the layers")
    )]
    BaseDir {
        /// Configured base directory.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// IO error reading a layer directory.
    #[error("IO error: {0}")]
    #[diagnostic(code(fsd_lint::io))]
    Io(#[from] std::io::Error),

    /// Directory listing failed.
    #[error("directory walk failed: {0}")]
    #[diagnostic(code(fsd_lint::walk))]
    Walk(#[from] walkdir::Error),

    /// Exclude glob pattern error.
    #[error("invalid exclude pattern: {0}")]
    #[diagnostic(code(fsd_lint::exclude))]
    Glob(#[from] glob::PatternError),

    /// Import pattern failed to compile.
    #[error("invalid import pattern: {0}")]
    #[diagnostic(code(fsd_lint::pattern))]
    Pattern(#[from] regex::Error),

    /// Worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    #[diagnostic(code(fsd_lint::thread_pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration error.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    config: Option<FsdConfig>,
    base_dir: Option<PathBuf>,
    allowed_access: Option<AccessMatrix>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: FsdConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the configured base directory.
    #[must_use]
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(path.into());
        self
    }

    /// Overrides the configured access matrix.
    #[must_use]
    pub fn allowed_access(mut self, matrix: AccessMatrix) -> Self {
        self.allowed_access = Some(matrix);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or an exclude
    /// pattern does not compile.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(dir) = self.base_dir {
            config.analyzer.base_dir = dir;
        }
        if let Some(matrix) = self.allowed_access {
            config = config.with_access_matrix(matrix);
        }
        config.validate()?;

        let settings = &config.analyzer;
        let extractor = ImportExtractor::new(&settings.alias_prefix, &settings.base_prefix)?;
        let resolver = PathResolver::new(&settings.alias_prefix, &settings.base_prefix);
        let exclude = settings
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            config,
            extractor,
            resolver,
            exclude,
        })
    }
}

/// One file queued for import analysis.
#[derive(Debug, Clone)]
struct SourceFile {
    layer: String,
    path: PathBuf,
    /// Base-relative, `/`-separated.
    relative: String,
}

/// Checks a source tree against the layer access matrix.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    config: FsdConfig,
    extractor: ImportExtractor,
    resolver: PathResolver,
    exclude: Vec<glob::Pattern>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the directory holding the layers.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.config.analyzer.base_dir
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &FsdConfig {
        &self.config
    }

    /// Discovers layers and slices under the base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory cannot be read.
    pub fn scan_structure(&self) -> Result<ProjectStructure, AnalyzerError> {
        scanner::scan(self.base_dir(), &self.config.analyzer.layers)
    }

    /// Scans the structure and analyzes every present layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory or a layer directory cannot be read.
    pub fn analyze(&self) -> Result<Report, AnalyzerError> {
        let structure = self.scan_structure()?;
        self.analyze_structure(structure)
    }

    /// Analyzes the layers recorded in a previously scanned `structure`.
    ///
    /// Violations are reported in declared layer order, then file name order
    /// within each layer, regardless of how many workers ran.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer directory cannot be listed. Unreadable
    /// source files are logged and skipped.
    pub fn analyze_structure(&self, structure: ProjectStructure) -> Result<Report, AnalyzerError> {
        info!("Starting analysis at {}", self.base_dir().display());

        let mut sources = Vec::new();
        for layer in structure.present_layers() {
            sources.extend(self.source_files(layer));
        }
        info!("Found {} files to analyze", sources.len());

        let per_file = self.check_files(&sources)?;

        let mut root_files = Vec::new();
        for layer in structure.present_layers() {
            for file in
                scanner::root_level_files(self.base_dir(), layer, &self.config.analyzer.manifest)?
            {
                root_files.push(Violation::Directory(DirectoryViolation::root_level_file(
                    layer, file,
                )));
            }
        }

        let (import_violations, directory_violations) =
            partition(per_file.into_iter().flatten().chain(root_files));

        info!(
            "Analysis complete: {} import violation(s), {} directory violation(s) in {} file(s)",
            import_violations.len(),
            directory_violations.len(),
            sources.len()
        );

        Ok(Report::new(
            structure,
            self.config.allowed_access.clone(),
            import_violations,
            directory_violations,
        ))
    }

    /// Runs [`Self::check_file`] over `sources`, keeping input order.
    fn check_files(&self, sources: &[SourceFile]) -> Result<Vec<Vec<Violation>>, AnalyzerError> {
        match self.config.analyzer.parallelism {
            Some(1) => Ok(sources.iter().map(|s| self.check_file(s)).collect()),
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                Ok(pool.install(|| self.check_files_parallel(sources)))
            }
            None => Ok(self.check_files_parallel(sources)),
        }
    }

    fn check_files_parallel(&self, sources: &[SourceFile]) -> Vec<Vec<Violation>> {
        sources.par_iter().map(|s| self.check_file(s)).collect()
    }

    /// Import violations in a single file. Read failures yield none.
    fn check_file(&self, source: &SourceFile) -> Vec<Violation> {
        debug!("Analyzing: {}", source.path.display());

        let content = match std::fs::read_to_string(&source.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", source.path.display(), e);
                return Vec::new();
            }
        };

        let layers = &self.config.analyzer.layers;
        let matrix = &self.config.allowed_access;

        self.extractor
            .extract(&content)
            .filter_map(|specifier| {
                let resolved = self.resolver.resolve(&source.relative, specifier)?;
                let target = classify(&resolved, layers)?;
                if matrix.is_allowed(&source.layer, target) {
                    return None;
                }
                Some(Violation::Import(ImportViolation::new(
                    source.path.clone(),
                    specifier,
                    source.layer.as_str(),
                    target,
                )))
            })
            .collect()
    }

    /// Source files under `base_dir/layer`, sorted by file name per directory.
    fn source_files(&self, layer: &str) -> Vec<SourceFile> {
        let root = self.base_dir().join(layer);
        let respect = self.config.analyzer.respect_gitignore;

        let mut builder = ignore::WalkBuilder::new(&root);
        builder
            .hidden(false)
            .ignore(respect)
            .parents(respect)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !self.has_source_extension(path) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(self.base_dir()) else {
                continue;
            };
            let relative = to_slash(relative);

            if self.should_exclude(&relative) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(SourceFile {
                layer: layer.to_owned(),
                path: path.to_path_buf(),
                relative,
            });
        }
        files
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        self.config
            .analyzer
            .extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }

    /// Checks a base-relative path against the exclude globs.
    fn should_exclude(&self, relative: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(relative))
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn partition(
    violations: impl Iterator<Item = Violation>,
) -> (Vec<ImportViolation>, Vec<DirectoryViolation>) {
    let mut imports = Vec::new();
    let mut directories = Vec::new();
    for v in violations {
        match v {
            Violation::Import(v) => imports.push(v),
            Violation::Directory(v) => directories.push(v),
        }
    }
    (imports, directories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let analyzer = Analyzer::builder()
            .build()
            .expect("Failed to build analyzer");
        assert_eq!(analyzer.base_dir(), Path::new("src"));
    }

    #[test]
    fn test_builder_rejects_invalid_matrix() {
        let matrix = AccessMatrix::from_json(r#"{"shared": ["core"]}"#).unwrap();
        let result = Analyzer::builder().allowed_access(matrix).build();
        assert!(matches!(result, Err(AnalyzerError::Config(_))));
    }

    #[test]
    fn test_builder_rejects_bad_glob() {
        let mut config = FsdConfig::default();
        config.analyzer.exclude.push("[".into());
        let result = Analyzer::builder().config(config).build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_exclude_patterns() {
        let mut config = FsdConfig::default();
        config.analyzer.exclude = vec!["**/*.test.ts".into(), "shared/legacy/**".into()];
        let analyzer = Analyzer::builder().config(config).build().unwrap();

        assert!(analyzer.should_exclude("shared/ui/Button.test.ts"));
        assert!(analyzer.should_exclude("shared/legacy/old.ts"));
        assert!(!analyzer.should_exclude("shared/ui/Button.ts"));
    }

    #[test]
    fn test_source_extension() {
        let analyzer = Analyzer::builder().build().unwrap();
        assert!(analyzer.has_source_extension(Path::new("a/b.tsx")));
        assert!(analyzer.has_source_extension(Path::new("a/b.d.ts")));
        assert!(!analyzer.has_source_extension(Path::new("a/b.css")));
        assert!(!analyzer.has_source_extension(Path::new("a/ts")));
    }
}
