//! Well-known backend selection from version strings.
//!
//! Version tokens are opaque strings matched by prefix, not semver:
//! toolchains in the wild ship versions like `2.0.1-RC2` and projects
//! pin lines like `2.0.`, so exact patch releases map to dedicated
//! identities and anything else on a known line falls back to that
//! line's latest backend.

use crate::backend::identity::{CompilerId, LATEST_COMPILER_ID};

fn matches_patch(version: &str, patch: &str) -> bool {
    version == patch || version.starts_with(&format!("{patch}-"))
}

/// Identity suggested by an explicit Zinc version or, failing that, a
/// framework version hint. `None` when neither narrows the choice.
pub fn suggested_compiler_id(
    zinc_version: Option<&str>,
    framework_version: Option<&str>,
) -> Option<CompilerId> {
    if let Some(zinc) = zinc_version.filter(|v| !v.is_empty()) {
        if zinc.starts_with("2.0.") {
            if matches_patch(zinc, "2.0.0") {
                return Some(CompilerId::Zinc200);
            }
            if matches_patch(zinc, "2.0.1") {
                return Some(CompilerId::Zinc201);
            }
            return Some(CompilerId::Zinc205);
        }
        if zinc.starts_with("1.9.") {
            return Some(CompilerId::Zinc19);
        }
    }

    if let Some(framework) = framework_version.filter(|v| !v.is_empty()) {
        if framework.starts_with("3.1.") || framework.starts_with("3.1-") {
            return Some(CompilerId::Zinc19);
        }
        if framework.starts_with("3.2.") || framework.starts_with("3.2-") {
            return Some(CompilerId::Zinc200);
        }
        if framework.starts_with("3.3.") || framework.starts_with("3.3-") {
            return Some(CompilerId::Zinc205);
        }
    }

    None
}

/// Identity to use for the given versions, falling back to the latest
/// known backend.
pub fn default_compiler_id(
    zinc_version: Option<&str>,
    framework_version: Option<&str>,
) -> CompilerId {
    suggested_compiler_id(zinc_version, framework_version).unwrap_or(LATEST_COMPILER_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedicated_patch_releases() {
        assert_eq!(suggested_compiler_id(Some("2.0.0"), None), Some(CompilerId::Zinc200));
        assert_eq!(suggested_compiler_id(Some("2.0.0-RC1"), None), Some(CompilerId::Zinc200));
        assert_eq!(suggested_compiler_id(Some("2.0.1"), None), Some(CompilerId::Zinc201));
    }

    #[test]
    fn test_line_prefix_falls_back_to_line_head() {
        // 2.0.3 has no dedicated backend; the generic 2.0. rule wins.
        assert_eq!(suggested_compiler_id(Some("2.0.3"), None), Some(CompilerId::Zinc205));
        assert_eq!(suggested_compiler_id(Some("2.0.11"), None), Some(CompilerId::Zinc205));
    }

    #[test]
    fn test_old_line() {
        assert_eq!(suggested_compiler_id(Some("1.9.6"), None), Some(CompilerId::Zinc19));
    }

    #[test]
    fn test_explicit_version_beats_framework_hint() {
        assert_eq!(
            suggested_compiler_id(Some("1.9.0"), Some("3.3.2")),
            Some(CompilerId::Zinc19)
        );
    }

    #[test]
    fn test_framework_hint() {
        assert_eq!(suggested_compiler_id(None, Some("3.1.5")), Some(CompilerId::Zinc19));
        assert_eq!(suggested_compiler_id(None, Some("3.2-M1")), Some(CompilerId::Zinc200));
        assert_eq!(suggested_compiler_id(None, Some("3.3.0")), Some(CompilerId::Zinc205));
    }

    #[test]
    fn test_unknown_versions_suggest_nothing() {
        assert_eq!(suggested_compiler_id(Some("0.7.1"), None), None);
        assert_eq!(suggested_compiler_id(None, Some("9.9.9")), None);
        assert_eq!(suggested_compiler_id(None, None), None);
        assert_eq!(suggested_compiler_id(Some(""), Some("")), None);
    }

    #[test]
    fn test_default_falls_back_to_latest() {
        assert_eq!(default_compiler_id(None, None), CompilerId::Zinc205);
        assert_eq!(default_compiler_id(Some("0.7.1"), None), CompilerId::Zinc205);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(default_compiler_id(Some("2.0.3"), Some("3.1.0")), CompilerId::Zinc205);
        }
    }
}
