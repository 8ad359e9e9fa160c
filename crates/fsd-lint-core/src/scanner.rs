//! Structure discovery: which layers exist on disk and which slices they hold.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::analyzer::AnalyzerError;
use crate::layer::is_misplaced_root_file;
use indexmap::IndexMap;

/// Layers and slices discovered under the base directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStructure {
    /// Every declared layer mapped to its slice names (empty when missing).
    pub layers: IndexMap<String, Vec<String>>,
    /// Declared layers without a directory on disk.
    pub missing_layers: Vec<String>,
}

impl ProjectStructure {
    /// Returns `true` if `layer` was found on disk.
    #[must_use]
    pub fn is_present(&self, layer: &str) -> bool {
        self.layers.contains_key(layer) && !self.missing_layers.iter().any(|l| l == layer)
    }

    /// Slices found in `layer`.
    #[must_use]
    pub fn slices(&self, layer: &str) -> &[String] {
        self.layers.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Layers present on disk, in declared order.
    pub fn present_layers(&self) -> impl Iterator<Item = &str> {
        self.layers
            .keys()
            .map(String::as_str)
            .filter(|l| self.is_present(l))
    }
}

/// Scans `base_dir` for the declared `layers`.
///
/// A missing layer directory is recorded, not treated as an error. Only the
/// immediate children of each layer directory are inspected; directories
/// become slices, files are left to [`root_level_files`].
///
/// # Errors
///
/// Returns [`AnalyzerError::BaseDir`] if `base_dir` cannot be read, or an IO
/// error if a present layer directory cannot be listed.
pub fn scan(base_dir: &Path, layers: &[String]) -> Result<ProjectStructure, AnalyzerError> {
    std::fs::read_dir(base_dir).map_err(|source| AnalyzerError::BaseDir {
        path: base_dir.to_path_buf(),
        source,
    })?;

    let mut structure = ProjectStructure::default();

    for layer in layers {
        let layer_dir = base_dir.join(layer);
        if !layer_dir.is_dir() {
            debug!("Layer '{}' not found at {}", layer, layer_dir.display());
            structure.missing_layers.push(layer.clone());
            structure.layers.insert(layer.clone(), Vec::new());
            continue;
        }

        let slices: Vec<String> = list_children(&layer_dir)?
            .into_iter()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();

        debug!("Layer '{}': {} slice(s)", layer, slices.len());
        structure.layers.insert(layer.clone(), slices);
    }

    Ok(structure)
}

/// Regular files sitting directly in `base_dir/layer` that should be in a slice.
///
/// # Errors
///
/// Returns an IO error if the layer directory cannot be listed.
pub fn root_level_files(
    base_dir: &Path,
    layer: &str,
    manifest: &str,
) -> Result<Vec<PathBuf>, AnalyzerError> {
    let files = list_children(&base_dir.join(layer))?
        .into_iter()
        .filter(|entry| entry.path().is_file())
        .filter(|entry| is_misplaced_root_file(&entry.file_name().to_string_lossy(), manifest))
        .map(DirEntry::into_path)
        .collect();
    Ok(files)
}

/// Immediate children of `dir`, sorted by name.
fn list_children(dir: &Path) -> Result<Vec<DirEntry>, AnalyzerError> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(AnalyzerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn discovers_slices_and_missing_layers() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        fs::create_dir_all(base.join("shared/ui")).unwrap();
        fs::create_dir_all(base.join("shared/lib")).unwrap();
        fs::create_dir_all(base.join("entities")).unwrap();
        fs::write(base.join("shared/index.ts"), "").unwrap();

        let s = scan(base, &layers(&["shared", "entities", "pages"])).unwrap();
        assert_eq!(s.slices("shared"), ["lib", "ui"]);
        assert!(s.slices("entities").is_empty());
        assert_eq!(s.missing_layers, ["pages"]);
        assert!(s.is_present("entities"));
        assert!(!s.is_present("pages"));
        assert_eq!(s.present_layers().collect::<Vec<_>>(), ["shared", "entities"]);
        assert_eq!(
            s.layers.keys().collect::<Vec<_>>(),
            ["shared", "entities", "pages"]
        );
    }

    #[test]
    fn slices_are_one_level_deep() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("features/auth/ui/form")).unwrap();

        let s = scan(tmp.path(), &layers(&["features"])).unwrap();
        assert_eq!(s.slices("features"), ["auth"]);
    }

    #[test]
    fn layer_path_that_is_a_file_counts_as_missing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app"), "").unwrap();

        let s = scan(tmp.path(), &layers(&["app"])).unwrap();
        assert_eq!(s.missing_layers, ["app"]);
    }

    #[test]
    fn missing_base_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = scan(&tmp.path().join("nope"), &layers(&["app"])).unwrap_err();
        assert!(matches!(err, AnalyzerError::BaseDir { .. }));
    }

    #[test]
    fn root_level_files_skip_manifest_and_hidden() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        fs::create_dir_all(base.join("features/auth")).unwrap();
        fs::write(base.join("features/login.ts"), "").unwrap();
        fs::write(base.join("features/index.ts"), "").unwrap();
        fs::write(base.join("features/.DS_Store"), "").unwrap();
        fs::write(base.join("features/auth/model.ts"), "").unwrap();

        let files = root_level_files(base, "features", "index.ts").unwrap();
        assert_eq!(files, [base.join("features/login.ts")]);
    }
}
