//! # fsd-lint-core
//!
//! Layer-dependency checking for Feature-Sliced Design projects.
//!
//! The analysis is purely textual: source files are scanned for import
//! specifiers, each specifier is resolved to a base-relative path and
//! classified into a layer, and the resulting edge is checked against an
//! [`AccessMatrix`]. It includes:
//!
//! - [`scan`] for discovering layers and slices on disk
//! - [`ImportExtractor`], [`PathResolver`] and [`classify`] for the
//!   per-specifier pipeline
//! - [`Analyzer`] for orchestrating a run into a [`Report`]
//! - [`BoundaryRules`] for exporting the matrix as explicit allow/disallow rules
//!
//! ## Example
//!
//! ```no_run
//! use fsd_lint_core::{Analyzer, FsdConfig};
//!
//! let analyzer = Analyzer::builder()
//!     .config(FsdConfig::default())
//!     .base_dir("./src")
//!     .build()?;
//!
//! let report = analyzer.analyze()?;
//! println!("{} violation(s)", report.total_violations());
//! # Ok::<(), fsd_lint_core::AnalyzerError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod boundaries;
mod config;
mod extractor;
mod layer;
mod matrix;
mod report;
mod resolver;
mod scanner;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use boundaries::{BoundaryRule, BoundaryRules};
pub use config::{AnalyzerConfig, ConfigError, FsdConfig};
pub use extractor::ImportExtractor;
pub use layer::{classify, is_misplaced_root_file};
pub use matrix::{AccessMatrix, DEFAULT_LAYERS};
pub use report::{
    DirectoryViolation, DirectoryViolationKind, ImportViolation, Report, Violation,
};
pub use resolver::{normalize, PathResolver};
pub use scanner::{root_level_files, scan, ProjectStructure};
