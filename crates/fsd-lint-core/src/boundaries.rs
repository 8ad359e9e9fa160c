//! Boundary rule generation for external lint tooling.
//!
//! Expands the access matrix into explicit `allow`/`disallow` lists per layer,
//! alongside the slices discovered on disk.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::matrix::AccessMatrix;
use crate::scanner::ProjectStructure;

/// One boundary rule for a source layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryRule {
    /// Layers `from` may import.
    Allow {
        /// Source layer.
        from: String,
        /// Permitted target layers.
        allow: Vec<String>,
    },
    /// Declared layers `from` must not import.
    Disallow {
        /// Source layer.
        from: String,
        /// Forbidden target layers.
        disallow: Vec<String>,
    },
}

impl BoundaryRule {
    /// The source layer this rule applies to.
    #[must_use]
    pub fn from_layer(&self) -> &str {
        match self {
            Self::Allow { from, .. } | Self::Disallow { from, .. } => from,
        }
    }
}

/// Generated boundary document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryRules {
    /// Every declared layer mapped to its slices.
    pub layers: IndexMap<String, Vec<String>>,
    /// Allow and disallow rules, in declared layer order.
    pub rules: Vec<BoundaryRule>,
    /// The matrix the rules were derived from.
    pub allowed_access: AccessMatrix,
}

impl BoundaryRules {
    /// Derives rules for each declared layer from `matrix`.
    ///
    /// Empty `allow` or `disallow` lists are omitted, so a layer yields zero,
    /// one, or two rules.
    #[must_use]
    pub fn generate(
        structure: &ProjectStructure,
        matrix: &AccessMatrix,
        layers: &[String],
    ) -> Self {
        let mut rules = Vec::new();

        for from in layers {
            let allow = matrix.allowed(from);
            let disallow: Vec<String> = layers
                .iter()
                .filter(|l| !allow.contains(*l))
                .cloned()
                .collect();

            if !allow.is_empty() {
                rules.push(BoundaryRule::Allow {
                    from: from.clone(),
                    allow: allow.to_vec(),
                });
            }
            if !disallow.is_empty() {
                rules.push(BoundaryRule::Disallow {
                    from: from.clone(),
                    disallow,
                });
            }
        }

        let slices = layers
            .iter()
            .map(|layer| (layer.clone(), structure.slices(layer).to_vec()))
            .collect();

        Self {
            layers: slices,
            rules,
            allowed_access: matrix.ordered_by(layers),
        }
    }

    /// Serializes to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
