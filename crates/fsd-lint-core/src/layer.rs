//! Layer classification: maps base-relative paths to declared layers.

/// Returns the layer a base-relative path falls under.
///
/// The first path segment equal to a declared layer wins, except that a
/// layer name appearing only as the final (file name) segment does not count.
/// Paths that climb out of the base directory (`../…`) belong to no layer.
///
/// ```
/// use fsd_lint_core::classify;
///
/// let layers = vec!["shared".to_owned(), "entities".to_owned()];
/// assert_eq!(classify("entities/user/model", &layers), Some("entities"));
/// assert_eq!(classify("lib/shared", &layers), None);
/// ```
#[must_use]
pub fn classify<'a>(path: &str, layers: &'a [String]) -> Option<&'a str> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.first() == Some(&"..") {
        return None;
    }

    let (_, dirs) = segments.split_last()?;
    dirs.iter()
        .find_map(|seg| layers.iter().find(|layer| layer == seg))
        .map(String::as_str)
}

/// Should a file found directly at a layer root be reported?
///
/// Hidden files and the manifest (`index.ts` by default) may live there.
#[must_use]
pub fn is_misplaced_root_file(file_name: &str, manifest: &str) -> bool {
    !file_name.starts_with('.') && file_name != manifest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers() -> Vec<String> {
        ["shared", "entities", "features", "widgets", "pages", "app"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    }

    #[test]
    fn first_segment_layer() {
        assert_eq!(classify("features/auth/foo", &layers()), Some("features"));
    }

    #[test]
    fn nested_layer_segment() {
        assert_eq!(classify("legacy/widgets/header", &layers()), Some("widgets"));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(classify("pages/shared/x", &layers()), Some("pages"));
    }

    #[test]
    fn trailing_segment_does_not_count() {
        assert_eq!(classify("features", &layers()), None);
        assert_eq!(classify("lib/app", &layers()), None);
    }

    #[test]
    fn unknown_path() {
        assert_eq!(classify("lib/utils/format", &layers()), None);
        assert_eq!(classify("", &layers()), None);
    }

    #[test]
    fn path_above_base_is_unclassified() {
        assert_eq!(classify("../shared/ui", &layers()), None);
    }

    #[test]
    fn no_partial_segment_match() {
        assert_eq!(classify("sharedkit/ui/Button", &layers()), None);
    }

    #[test]
    fn root_file_policy() {
        assert!(is_misplaced_root_file("login.ts", "index.ts"));
        assert!(!is_misplaced_root_file("index.ts", "index.ts"));
        assert!(!is_misplaced_root_file(".eslintrc.js", "index.ts"));
        assert!(is_misplaced_root_file("index.tsx", "index.ts"));
    }
}
