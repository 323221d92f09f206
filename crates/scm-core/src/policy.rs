//! Version policy: map file-level changes to a semantic-version bump.
//!
//! The classification is a heuristic proxy for "did the public contract
//! change", preserved as-is: a non-breaking manifest metadata edit still
//! forces a major bump.

use scm_schema::version::{ChangeType, VersionPlan, next_version};
use scm_schema::MANIFEST_FILE;

use crate::error::Result;
use crate::fingerprint::{SnapshotDiff, is_code_file};

/// Files whose modification is treated as a breaking change.
const BREAKING_FILES: &[&str] = &[MANIFEST_FILE, "package.json"];

fn is_breaking_path(path: &str) -> bool {
    let filename = path.rsplit('/').next().unwrap_or(path);
    BREAKING_FILES.contains(&filename)
}

/// Classify a diff into a change type, in priority order:
///
/// 1. any touched path in the breaking-change file set → major;
/// 2. any *added* path with a source-code extension → minor;
/// 3. otherwise → patch.
pub fn classify(diff: &SnapshotDiff) -> ChangeType {
    if diff.touched().any(is_breaking_path) {
        return ChangeType::Major;
    }
    if diff.added.iter().any(|p| is_code_file(p)) {
        return ChangeType::Minor;
    }
    ChangeType::Patch
}

/// Build the full version plan for one publish attempt.
///
/// When `override_version` is given, the plan is `Manual` with that exact
/// version; otherwise the diff is classified and the next version derived
/// from `current`.
///
/// # Errors
///
/// Returns an error if `current` (or the override) is not valid semver.
pub fn plan_version(
    current: &str,
    diff: &SnapshotDiff,
    override_version: Option<&str>,
) -> Result<VersionPlan> {
    if let Some(v) = override_version {
        // Validate through the same path as computed bumps.
        let next = next_version(v, ChangeType::Manual)?;
        return Ok(VersionPlan {
            current: current.to_string(),
            next,
            change: ChangeType::Manual,
            has_changes: !diff.is_empty(),
        });
    }

    let change = classify(diff);
    Ok(VersionPlan {
        current: current.to_string(),
        next: next_version(current, change)?,
        change,
        has_changes: !diff.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(changed: &[&str], added: &[&str], removed: &[&str]) -> SnapshotDiff {
        SnapshotDiff {
            changed: changed.iter().map(|s| s.to_string()).collect(),
            added: added.iter().map(|s| s.to_string()).collect(),
            removed: removed.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_manifest_touch_is_major() {
        let d = diff(&["registry.json"], &[], &[]);
        assert_eq!(classify(&d), ChangeType::Major);
    }

    #[test]
    fn test_manifest_beats_everything_else() {
        // Even with new source files, a manifest touch stays major.
        let d = diff(&["registry.json"], &["new-widget.tsx"], &["old.tsx"]);
        assert_eq!(classify(&d), ChangeType::Major);
    }

    #[test]
    fn test_package_json_is_major() {
        let d = diff(&[], &[], &["package.json"]);
        assert_eq!(classify(&d), ChangeType::Major);
    }

    #[test]
    fn test_nested_manifest_is_major() {
        let d = diff(&["sub/package.json"], &[], &[]);
        assert_eq!(classify(&d), ChangeType::Major);
    }

    #[test]
    fn test_added_source_is_minor() {
        let d = diff(&["button.tsx"], &["use-hover.ts"], &[]);
        assert_eq!(classify(&d), ChangeType::Minor);
    }

    #[test]
    fn test_added_non_source_is_patch() {
        let d = diff(&[], &["readme.md", "theme.css"], &[]);
        assert_eq!(classify(&d), ChangeType::Patch);
    }

    #[test]
    fn test_changed_only_is_patch() {
        let d = diff(&["button.tsx", "styles.css"], &[], &[]);
        assert_eq!(classify(&d), ChangeType::Patch);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let d = diff(&["a.tsx"], &["b.tsx"], &["c.tsx"]);
        let first = classify(&d);
        for _ in 0..10 {
            assert_eq!(classify(&d), first);
        }
    }

    #[test]
    fn test_plan_minor_bump() {
        let d = diff(&[], &["new.tsx"], &[]);
        let plan = plan_version("1.0.0", &d, None).unwrap();
        assert_eq!(plan.next, "1.1.0");
        assert_eq!(plan.change, ChangeType::Minor);
        assert!(plan.has_changes);
    }

    #[test]
    fn test_plan_major_bump() {
        let d = diff(&["registry.json"], &["new.tsx"], &[]);
        let plan = plan_version("1.1.0", &d, None).unwrap();
        assert_eq!(plan.next, "2.0.0");
    }

    #[test]
    fn test_plan_manual_override() {
        let d = diff(&["a.tsx"], &[], &[]);
        let plan = plan_version("1.0.0", &d, Some("5.0.0")).unwrap();
        assert_eq!(plan.next, "5.0.0");
        assert_eq!(plan.change, ChangeType::Manual);
    }

    #[test]
    fn test_plan_invalid_base() {
        let d = SnapshotDiff::default();
        assert!(plan_version("not-semver", &d, None).is_err());
        assert!(plan_version("1.0.0", &d, Some("also-bad")).is_err());
    }
}
