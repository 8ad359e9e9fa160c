//! Access matrix: which layers each layer may import from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::config::ConfigError;

/// Layers checked when no configuration overrides them, in declared order.
pub const DEFAULT_LAYERS: &[&str] = &[
    "shared",
    "entities",
    "features",
    "widgets",
    "pages",
    "app",
    "composers",
];

/// Declarative table mapping a layer to the set of layers it may depend on.
///
/// The table is authoritative: self-access is an explicit entry, and a layer
/// without an entry may import from nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessMatrix {
    rules: IndexMap<String, Vec<String>>,
}

impl AccessMatrix {
    /// The stock Feature-Sliced Design table.
    ///
    /// Every layer may import from the layers below it and from itself;
    /// `shared` may import from nothing and `composers` only from `shared`.
    #[must_use]
    pub fn fsd_default() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("shared", &[]),
            ("entities", &["shared", "entities"]),
            ("features", &["shared", "entities", "features"]),
            ("widgets", &["shared", "entities", "features", "widgets"]),
            (
                "pages",
                &["shared", "entities", "features", "widgets", "pages"],
            ),
            (
                "app",
                &["shared", "entities", "features", "widgets", "pages", "app"],
            ),
            ("composers", &["shared", "composers"]),
        ];
        table
            .iter()
            .map(|(layer, allowed)| {
                let allowed: Vec<String> = allowed.iter().map(|s| (*s).to_owned()).collect();
                (*layer, allowed)
            })
            .collect()
    }

    /// Parses a JSON object of `layer -> [allowed layers]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the JSON is not such an object.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Loads a JSON access table from disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid table.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Is `from` allowed to import from `to`?
    #[must_use]
    pub fn is_allowed(&self, from: &str, to: &str) -> bool {
        self.allowed(from).iter().any(|l| l == to)
    }

    /// The allowed set for `layer`; empty when the layer has no entry.
    #[must_use]
    pub fn allowed(&self, layer: &str) -> &[String] {
        self.rules.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of layers with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no layer has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks that every key and every allowed layer is declared.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first unknown layer.
    pub fn validate(&self, layers: &[String]) -> Result<(), ConfigError> {
        let declared: HashSet<&str> = layers.iter().map(String::as_str).collect();

        for (layer, allowed) in self.iter() {
            if !declared.contains(layer) {
                return Err(ConfigError::Validation(format!(
                    "allowed_access.{layer}: unknown layer"
                )));
            }
            for dep in allowed {
                if !declared.contains(dep.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "allowed_access.{layer}: unknown layer '{dep}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns a copy whose entries follow the declared layer order.
    ///
    /// Entries for undeclared layers are kept after the declared ones.
    #[must_use]
    pub fn ordered_by(&self, layers: &[String]) -> Self {
        let mut rules = IndexMap::new();
        for layer in layers {
            if let Some(allowed) = self.rules.get(layer) {
                rules.insert(layer.clone(), allowed.clone());
            }
        }
        for (layer, allowed) in &self.rules {
            if !rules.contains_key(layer) {
                rules.insert(layer.clone(), allowed.clone());
            }
        }
        Self { rules }
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for AccessMatrix {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_layers() -> Vec<String> {
        DEFAULT_LAYERS.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn shared_allows_nothing() {
        let m = AccessMatrix::fsd_default();
        for layer in DEFAULT_LAYERS {
            assert!(!m.is_allowed("shared", layer), "shared -> {layer}");
        }
    }

    #[test]
    fn self_access_is_explicit_for_every_layer_but_shared() {
        let m = AccessMatrix::fsd_default();
        for layer in DEFAULT_LAYERS.iter().filter(|l| **l != "shared") {
            assert!(m.is_allowed(layer, layer), "{layer} -> {layer}");
        }
    }

    #[test]
    fn upward_imports_are_denied() {
        let m = AccessMatrix::fsd_default();
        assert!(m.is_allowed("features", "entities"));
        assert!(!m.is_allowed("entities", "features"));
        assert!(!m.is_allowed("widgets", "pages"));
        assert!(!m.is_allowed("composers", "entities"));
    }

    #[test]
    fn missing_entry_allows_nothing() {
        let m: AccessMatrix = [("app", vec!["shared".to_owned()])].into_iter().collect();
        assert!(!m.is_allowed("pages", "shared"));
        assert!(m.allowed("pages").is_empty());
    }

    #[test]
    fn default_matrix_validates_against_default_layers() {
        assert!(AccessMatrix::fsd_default().validate(&default_layers()).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_key() {
        let m = AccessMatrix::from_json(r#"{"core": []}"#).unwrap();
        let err = m.validate(&default_layers()).unwrap_err();
        assert!(err.to_string().contains("core"));
    }

    #[test]
    fn validate_rejects_unknown_target() {
        let m = AccessMatrix::from_json(r#"{"shared": ["lib"]}"#).unwrap();
        let err = m.validate(&default_layers()).unwrap_err();
        assert!(err.to_string().contains("'lib'"));
    }

    #[test]
    fn from_json_rejects_non_table() {
        assert!(AccessMatrix::from_json(r#"["shared"]"#).is_err());
    }

    #[test]
    fn ordered_by_follows_declared_layers() {
        let m = AccessMatrix::from_json(r#"{"app": ["shared"], "shared": []}"#).unwrap();
        let ordered = m.ordered_by(&default_layers());
        let keys: Vec<&str> = ordered.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["shared", "app"]);
    }

    #[test]
    fn json_keeps_table_order() {
        let json = r#"{"pages":[],"app":["pages"],"entities":[]}"#;
        let m = AccessMatrix::from_json(json).unwrap();
        let keys: Vec<&str> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["pages", "app", "entities"]);
        assert_eq!(serde_json::to_string(&m).unwrap(), json);
    }
}
