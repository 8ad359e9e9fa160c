//! Import specifier resolution.
//!
//! All paths handled here are relative to the configured base directory and
//! use `/` as separator: a file at `src/shared/ui/Button.tsx` is known as
//! `shared/ui/Button.tsx`.

/// Resolves textual import specifiers to base-relative paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    alias_prefix: String,
    base_prefix: String,
}

impl PathResolver {
    /// Creates a resolver for the given alias (`@`) and base (`src/`) prefixes.
    #[must_use]
    pub fn new(alias_prefix: impl Into<String>, base_prefix: impl Into<String>) -> Self {
        Self {
            alias_prefix: alias_prefix.into(),
            base_prefix: base_prefix.into(),
        }
    }

    /// Resolves `specifier` as written in the file at `source_file`.
    ///
    /// Prefixed specifiers lose their prefix and are taken as base-relative.
    /// Specifiers starting with `.` are resolved against the directory of
    /// `source_file`. Anything else yields `None`.
    ///
    /// ```
    /// use fsd_lint_core::PathResolver;
    ///
    /// let r = PathResolver::new("@", "src/");
    /// assert_eq!(
    ///     r.resolve("shared/ui/Button.tsx", "../../entities/user").as_deref(),
    ///     Some("entities/user"),
    /// );
    /// assert_eq!(r.resolve("pages/home/ui.tsx", "@/features/auth").as_deref(), Some("features/auth"));
    /// assert_eq!(r.resolve("pages/home/ui.tsx", "react"), None);
    /// ```
    #[must_use]
    pub fn resolve(&self, source_file: &str, specifier: &str) -> Option<String> {
        if let Some(rest) = self.strip_absolute_prefix(specifier) {
            return Some(normalize(rest));
        }
        if specifier.starts_with('.') {
            return Some(resolve_relative(parent_dir(source_file), specifier));
        }
        None
    }

    fn strip_absolute_prefix<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        specifier
            .strip_prefix(self.alias_prefix.as_str())
            .or_else(|| specifier.strip_prefix(self.base_prefix.as_str()))
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn parent_dir(path: &str) -> &str {
    path.rfind(is_separator).map_or("", |i| &path[..i])
}

/// Walks up one directory per leading `../` and appends the remainder.
///
/// Climbing above the base directory keeps the surplus `..` segments; such
/// paths are left for the classifier to reject.
fn resolve_relative(source_dir: &str, specifier: &str) -> String {
    let specifier = specifier.strip_prefix("./").unwrap_or(specifier);
    let parts: Vec<&str> = specifier.split(is_separator).collect();
    let ups = parts.iter().take_while(|p| **p == "..").count();

    let mut dir: Vec<&str> = split_segments(source_dir).collect();
    let mut overflow = 0;
    for _ in 0..ups {
        if dir.pop().is_none() {
            overflow += 1;
        }
    }

    let joined = std::iter::repeat("..")
        .take(overflow)
        .chain(dir)
        .chain(parts[ups..].iter().copied());
    normalize_segments(joined)
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(is_separator).filter(|s| !s.is_empty())
}

/// Collapses `.`/`..` segments and empty components into a `/`-joined path.
///
/// Leading `..` segments that cannot be collapsed are kept.
#[must_use]
pub fn normalize(path: &str) -> String {
    normalize_segments(split_segments(path))
}

fn normalize_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for seg in segments {
        match seg {
            "" | "." => {}
            ".." => {
                if out.last().is_some_and(|last| *last != "..") {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("@", "src/")
    }

    /// Shortest `./` or `../` specifier leading from directory `from` to `to`.
    fn relative_specifier(from: &str, to: &str) -> String {
        let from: Vec<&str> = split_segments(from).collect();
        let to: Vec<&str> = split_segments(to).collect();
        let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
        let ups = from.len() - common;
        let rest = to[common..].join("/");
        if ups == 0 {
            format!("./{rest}")
        } else {
            format!("{}{rest}", "../".repeat(ups))
        }
    }

    #[test]
    fn resolves_parent_relative() {
        let r = resolver();
        assert_eq!(
            r.resolve("shared/ui/Button.tsx", "../../entities/user"),
            Some("entities/user".into())
        );
    }

    #[test]
    fn resolves_current_dir_relative() {
        let r = resolver();
        assert_eq!(
            r.resolve("features/auth/ui/Form.tsx", "./parts/Input"),
            Some("features/auth/ui/parts/Input".into())
        );
    }

    #[test]
    fn resolves_dot_segments_inside_specifier() {
        let r = resolver();
        assert_eq!(
            r.resolve("pages/home/ui/Page.tsx", "../lib/../model/./store"),
            Some("pages/home/model/store".into())
        );
        assert_eq!(
            r.resolve("pages/home/ui/Page.tsx", "./../model"),
            Some("pages/home/model".into())
        );
    }

    #[test]
    fn climbing_above_base_keeps_parent_segments() {
        let r = resolver();
        assert_eq!(
            r.resolve("shared/a.ts", "../../../outside/x"),
            Some("../../outside/x".into())
        );
    }

    #[test]
    fn alias_prefix_is_stripped() {
        let r = resolver();
        assert_eq!(
            r.resolve("app/index.tsx", "@/features/auth/foo"),
            Some("features/auth/foo".into())
        );
    }

    #[test]
    fn base_prefix_is_stripped() {
        let r = resolver();
        assert_eq!(
            r.resolve("app/index.tsx", "src/widgets/header"),
            Some("widgets/header".into())
        );
    }

    #[test]
    fn bare_package_is_unresolved() {
        let r = resolver();
        assert_eq!(r.resolve("app/index.tsx", "lodash"), None);
        assert_eq!(r.resolve("app/index.tsx", "react-dom/client"), None);
    }

    #[test]
    fn backslash_separators_are_accepted() {
        let r = resolver();
        assert_eq!(
            r.resolve("shared/ui/Button.tsx", "..\\..\\entities\\user"),
            Some("entities/user".into())
        );
    }

    #[test]
    fn normalize_collapses_segments() {
        assert_eq!(normalize("a/./b//c/../d"), "a/b/d");
        assert_eq!(normalize("/features/auth"), "features/auth");
        assert_eq!(normalize("../a/../../b"), "../../b");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn relative_specifier_round_trips() {
        let r = resolver();
        let targets = [
            "entities/user",
            "shared/ui/Button",
            "features/auth/model/store",
            "pages/home",
        ];
        let dirs = [
            "shared/ui",
            "entities/user/model",
            "features/auth",
            "pages/home/ui/parts",
            "app",
        ];
        for dir in dirs {
            for target in targets {
                let spec = relative_specifier(dir, target);
                let source_file = format!("{dir}/file.ts");
                assert_eq!(
                    r.resolve(&source_file, &spec).as_deref(),
                    Some(target),
                    "{dir} + {spec}"
                );
            }
        }
    }
}
