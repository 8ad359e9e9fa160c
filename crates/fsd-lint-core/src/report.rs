//! Violations and the final report.
//!
//! The JSON form of [`Report`] is
//!
//! ```json
//! {
//!   "structure": { "layers": {..}, "missing_layers": [..], "directory_violations": [..] },
//!   "imports": { "violations": [..], "total": 0 },
//!   "rules": { "allowed_access": {..} }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::matrix::AccessMatrix;
use crate::scanner::ProjectStructure;

/// An import edge the access matrix does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportViolation {
    /// File containing the import.
    pub file: PathBuf,
    /// The specifier exactly as written.
    pub import: String,
    /// Layer of the importing file.
    pub from_layer: String,
    /// Layer the specifier resolves to.
    pub to_layer: String,
    /// Human-readable message.
    pub message: String,
}

impl ImportViolation {
    /// Creates a violation for `from_layer` importing `specifier` in `to_layer`.
    #[must_use]
    pub fn new(
        file: impl Into<PathBuf>,
        specifier: impl Into<String>,
        from_layer: impl Into<String>,
        to_layer: impl Into<String>,
    ) -> Self {
        let from_layer = from_layer.into();
        let to_layer = to_layer.into();
        Self {
            file: file.into(),
            import: specifier.into(),
            message: format!("Layer '{from_layer}' cannot import from '{to_layer}'"),
            from_layer,
            to_layer,
        }
    }
}

/// Kind of directory-structure problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryViolationKind {
    /// A file directly in a layer directory instead of inside a slice.
    RootLevelFile,
}

/// A file misplaced in the layer/slice layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryViolation {
    /// Problem kind.
    #[serde(rename = "type")]
    pub kind: DirectoryViolationKind,
    /// Layer whose root holds the file.
    pub layer: String,
    /// Offending file.
    pub file: PathBuf,
    /// Human-readable message.
    pub message: String,
}

impl DirectoryViolation {
    /// A file sitting at the root of `layer`.
    #[must_use]
    pub fn root_level_file(layer: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            kind: DirectoryViolationKind::RootLevelFile,
            layer: layer.into(),
            file: file.into(),
            message: "File should be within a slice, not at layer root".to_owned(),
        }
    }
}

/// Either kind of finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Disallowed layer dependency.
    Import(ImportViolation),
    /// File outside any slice.
    Directory(DirectoryViolation),
}

impl Violation {
    /// File the violation points at.
    #[must_use]
    pub fn file(&self) -> &Path {
        match self {
            Self::Import(v) => &v.file,
            Self::Directory(v) => &v.file,
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Import(v) => &v.message,
            Self::Directory(v) => &v.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StructureSection {
    #[serde(flatten)]
    project: ProjectStructure,
    directory_violations: Vec<DirectoryViolation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ImportsSection {
    violations: Vec<ImportViolation>,
    total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RulesSection {
    allowed_access: AccessMatrix,
}

/// Read-only result of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    structure: StructureSection,
    imports: ImportsSection,
    rules: RulesSection,
}

impl Report {
    /// Assembles a report from the analyzer's buffers.
    #[must_use]
    pub fn new(
        structure: ProjectStructure,
        allowed_access: AccessMatrix,
        import_violations: Vec<ImportViolation>,
        directory_violations: Vec<DirectoryViolation>,
    ) -> Self {
        Self {
            structure: StructureSection {
                project: structure,
                directory_violations,
            },
            imports: ImportsSection {
                total: import_violations.len(),
                violations: import_violations,
            },
            rules: RulesSection { allowed_access },
        }
    }

    /// Parses a report previously written as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the JSON does not have the report shape.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Loads a JSON report from disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Discovered layers and slices.
    #[must_use]
    pub fn structure(&self) -> &ProjectStructure {
        &self.structure.project
    }

    /// The access matrix the run was checked against.
    #[must_use]
    pub fn allowed_access(&self) -> &AccessMatrix {
        &self.rules.allowed_access
    }

    /// Import violations in discovery order.
    #[must_use]
    pub fn import_violations(&self) -> &[ImportViolation] {
        &self.imports.violations
    }

    /// Directory violations in discovery order.
    #[must_use]
    pub fn directory_violations(&self) -> &[DirectoryViolation] {
        &self.structure.directory_violations
    }

    /// All violations, imports first.
    pub fn violations(&self) -> impl Iterator<Item = Violation> + '_ {
        self.imports
            .violations
            .iter()
            .cloned()
            .map(Violation::Import)
            .chain(
                self.structure
                    .directory_violations
                    .iter()
                    .cloned()
                    .map(Violation::Directory),
            )
    }

    /// Number of import violations.
    #[must_use]
    pub fn import_total(&self) -> usize {
        self.imports.total
    }

    /// Number of directory violations.
    #[must_use]
    pub fn directory_total(&self) -> usize {
        self.structure.directory_violations.len()
    }

    /// Number of violations of either kind.
    #[must_use]
    pub fn total_violations(&self) -> usize {
        self.import_total() + self.directory_total()
    }

    /// Returns `true` when nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total_violations() == 0
    }

    /// Import violation counts per `(from, to)` layer pair, sorted by pair.
    #[must_use]
    pub fn layer_pairs(&self) -> Vec<((String, String), usize)> {
        let mut pairs: BTreeMap<(String, String), usize> = BTreeMap::new();
        for v in &self.imports.violations {
            *pairs
                .entry((v.from_layer.clone(), v.to_layer.clone()))
                .or_default() += 1;
        }
        pairs.into_iter().collect()
    }

    /// Keeps import violations from `from_layers` into `to_layers`.
    ///
    /// An empty filter list matches every layer. Directory violations and
    /// structure are carried over unchanged.
    #[must_use]
    pub fn filter_imports(&self, from_layers: &[String], to_layers: &[String]) -> Self {
        let keep = |layer: &str, filter: &[String]| {
            filter.is_empty() || filter.iter().any(|l| l == layer)
        };

        let violations: Vec<ImportViolation> = self
            .imports
            .violations
            .iter()
            .filter(|v| {
                keep(v.from_layer.as_str(), from_layers) && keep(v.to_layer.as_str(), to_layers)
            })
            .cloned()
            .collect();

        Self {
            structure: self.structure.clone(),
            imports: ImportsSection {
                total: violations.len(),
                violations,
            },
            rules: self.rules.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        let structure = ProjectStructure {
            layers: [
                ("shared", vec!["ui".to_owned()]),
                ("entities", vec!["user".to_owned(), "order".to_owned()]),
                ("pages", vec![]),
            ]
            .into_iter()
            .map(|(layer, slices)| (layer.to_owned(), slices))
            .collect(),
            missing_layers: vec!["pages".into()],
        };
        Report::new(
            structure,
            AccessMatrix::fsd_default(),
            vec![
                ImportViolation::new(
                    "src/shared/ui/Button.tsx",
                    "../../entities/user",
                    "shared",
                    "entities",
                ),
                ImportViolation::new(
                    "src/entities/user/api.ts",
                    "@/features/auth",
                    "entities",
                    "features",
                ),
                ImportViolation::new(
                    "src/shared/ui/Card.tsx",
                    "@/entities/order",
                    "shared",
                    "entities",
                ),
            ],
            vec![DirectoryViolation::root_level_file(
                "features",
                "src/features/login.ts",
            )],
        )
    }

    #[test]
    fn counts() {
        let r = sample();
        assert_eq!(r.import_total(), 3);
        assert_eq!(r.directory_total(), 1);
        assert_eq!(r.total_violations(), 4);
        assert!(!r.is_clean());
        assert_eq!(r.violations().count(), 4);
    }

    #[test]
    fn import_message() {
        let v = ImportViolation::new("a.ts", "@/entities/x", "shared", "entities");
        assert_eq!(v.message, "Layer 'shared' cannot import from 'entities'");
    }

    #[test]
    fn json_shape() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["imports"]["total"], 3);
        assert_eq!(json["structure"]["missing_layers"][0], "pages");
        assert_eq!(json["structure"]["layers"]["entities"][1], "order");
        assert_eq!(
            json["structure"]["directory_violations"][0]["type"],
            "root_level_file"
        );
        assert_eq!(json["imports"]["violations"][0]["from_layer"], "shared");
        assert_eq!(json["imports"]["violations"][0]["import"], "../../entities/user");
        assert_eq!(json["rules"]["allowed_access"]["shared"], serde_json::json!([]));
    }

    #[test]
    fn json_keeps_layer_order() {
        let text = sample().to_json_pretty().unwrap();
        let shared = text.find("\"shared\": [").unwrap();
        let entities = text.find("\"entities\": [").unwrap();
        assert!(shared < entities);
    }

    #[test]
    fn parses_own_json() {
        let report = sample();
        let text = report.to_json_pretty().unwrap();
        assert_eq!(Report::from_json(&text).unwrap(), report);
    }

    #[test]
    fn rejects_foreign_json() {
        assert!(Report::from_json(r#"{"violations": []}"#).is_err());
    }

    #[test]
    fn layer_pairs_are_grouped() {
        let pairs = sample().layer_pairs();
        assert_eq!(
            pairs,
            [
                (("entities".to_owned(), "features".to_owned()), 1),
                (("shared".to_owned(), "entities".to_owned()), 2),
            ]
        );
    }

    #[test]
    fn filter_by_source_layer() {
        let r = sample().filter_imports(&["shared".to_owned()], &[]);
        assert_eq!(r.import_total(), 2);
        assert!(r.import_violations().iter().all(|v| v.from_layer == "shared"));
        assert_eq!(r.directory_total(), 1);
    }

    #[test]
    fn filter_by_both_layers() {
        let r = sample().filter_imports(&["entities".to_owned()], &["entities".to_owned()]);
        assert_eq!(r.import_total(), 0);
    }

    #[test]
    fn empty_filters_keep_everything() {
        let r = sample();
        assert_eq!(r.filter_imports(&[], &[]), r);
    }
}
