//! Pattern-based import extraction.
//!
//! Imports are matched as text, not parsed. Three shapes are recognised,
//! each matched independently over the whole file:
//!
//! - `import … from "x"`
//! - `import "x"`
//! - `require("x")`
//!
//! Matches inside comments or string literals are extracted too, and an
//! `import { … }` list spanning several lines is not seen. Both are known
//! limitations of the textual approach.

use regex::Regex;

const IMPORT_FROM: &str = r#"import\s+.*\s+from\s+['"](.+?)['"]"#;
const IMPORT_BARE: &str = r#"import\s+['"](.+?)['"]"#;
const REQUIRE_CALL: &str = r#"require\s*\(\s*['"](.+?)['"]"#;

/// Extracts import specifiers that can cross a layer boundary.
#[derive(Debug, Clone)]
pub struct ImportExtractor {
    patterns: [Regex; 3],
    alias_prefix: String,
    base_prefix: String,
}

impl ImportExtractor {
    /// Compiles the import patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new(
        alias_prefix: impl Into<String>,
        base_prefix: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: [
                Regex::new(IMPORT_FROM)?,
                Regex::new(IMPORT_BARE)?,
                Regex::new(REQUIRE_CALL)?,
            ],
            alias_prefix: alias_prefix.into(),
            base_prefix: base_prefix.into(),
        })
    }

    /// Project imports in `source`, lazily, in pattern order then text order.
    ///
    /// Duplicates are kept. Calling this again restarts the sequence.
    pub fn extract<'s>(&'s self, source: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.raw_specifiers(source)
            .filter(move |spec| self.is_project_import(spec))
    }

    /// Every specifier matched by any pattern, before filtering.
    pub fn raw_specifiers<'s>(&'s self, source: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.patterns.iter().flat_map(move |re| {
            re.captures_iter(source)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
    }

    /// Keeps multi-segment relative specifiers and alias/base-prefixed ones.
    ///
    /// Package imports (`react`) and bare `.`/`..` never leave the current
    /// layer tree in a way the checker can follow.
    #[must_use]
    pub fn is_project_import(&self, specifier: &str) -> bool {
        let relative = specifier.starts_with('.') && specifier.contains(['/', '\\']);
        relative
            || specifier.starts_with(self.alias_prefix.as_str())
            || specifier.starts_with(self.base_prefix.as_str())
    }
}
