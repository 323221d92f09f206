//! Semantic-version bump arithmetic and the publish version plan.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while computing a version bump.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The base version is not a valid semantic version.
    #[error("Invalid semantic version '{0}'")]
    Invalid(String),
}

/// The kind of change a publish represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Breaking-change file touched (component or package manifest).
    Major,
    /// New source file added: new capability surface.
    Minor,
    /// Anything else.
    Patch,
    /// Version explicitly supplied by the publisher.
    Manual,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Outcome of version planning for one publish attempt.
///
/// Produced once per publish and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPlan {
    /// The version currently recorded in the manifest.
    pub current: String,
    /// The version this publish will be released as.
    pub next: String,
    /// How the bump was classified.
    pub change: ChangeType,
    /// Whether any file-level changes were detected since the last publish.
    pub has_changes: bool,
}

/// Apply standard semantic-version increment semantics.
///
/// Major resets minor and patch to zero; minor resets patch to zero;
/// patch increments the last component. `Manual` returns the base
/// unchanged (the caller substitutes the explicit version).
///
/// # Errors
///
/// Returns [`VersionError::Invalid`] if `base` does not parse as semver.
pub fn next_version(base: &str, change: ChangeType) -> Result<String, VersionError> {
    let mut v =
        semver::Version::parse(base).map_err(|_| VersionError::Invalid(base.to_string()))?;

    // A bump always produces a plain release: drop pre-release/build metadata.
    v.pre = semver::Prerelease::EMPTY;
    v.build = semver::BuildMetadata::EMPTY;

    match change {
        ChangeType::Major => {
            v.major += 1;
            v.minor = 0;
            v.patch = 0;
        }
        ChangeType::Minor => {
            v.minor += 1;
            v.patch = 0;
        }
        ChangeType::Patch => {
            v.patch += 1;
        }
        ChangeType::Manual => {}
    }

    Ok(v.to_string())
}

/// Whether `v` parses as a valid semantic version.
pub fn is_valid_version(v: &str) -> bool {
    semver::Version::parse(v).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_resets() {
        assert_eq!(next_version("1.2.3", ChangeType::Major).unwrap(), "2.0.0");
    }

    #[test]
    fn test_minor_resets_patch() {
        assert_eq!(next_version("1.2.3", ChangeType::Minor).unwrap(), "1.3.0");
        assert_eq!(next_version("1.0.0", ChangeType::Minor).unwrap(), "1.1.0");
    }

    #[test]
    fn test_patch_increments() {
        assert_eq!(next_version("1.2.3", ChangeType::Patch).unwrap(), "1.2.4");
    }

    #[test]
    fn test_invalid_base() {
        assert_eq!(
            next_version("not-a-version", ChangeType::Patch),
            Err(VersionError::Invalid("not-a-version".to_string()))
        );
        assert!(next_version("1.2", ChangeType::Patch).is_err());
    }

    #[test]
    fn test_bump_is_strictly_greater() {
        for base in ["0.1.0", "1.2.3", "10.20.30"] {
            for change in [ChangeType::Major, ChangeType::Minor, ChangeType::Patch] {
                let next = next_version(base, change).unwrap();
                let b = semver::Version::parse(base).unwrap();
                let n = semver::Version::parse(&next).unwrap();
                assert!(n > b, "{next} should be greater than {base}");
            }
        }
    }

    #[test]
    fn test_exactly_one_component_raised() {
        let base = semver::Version::parse("3.4.5").unwrap();
        for change in [ChangeType::Major, ChangeType::Minor, ChangeType::Patch] {
            let next = semver::Version::parse(&next_version("3.4.5", change).unwrap()).unwrap();
            let raised = [
                next.major > base.major,
                next.minor > base.minor,
                next.patch > base.patch,
            ];
            assert_eq!(raised.iter().filter(|r| **r).count(), 1);
        }
    }

    #[test]
    fn test_manual_keeps_base() {
        assert_eq!(next_version("1.2.3", ChangeType::Manual).unwrap(), "1.2.3");
    }

    #[test]
    fn test_prerelease_dropped_on_bump() {
        assert_eq!(
            next_version("1.2.3-beta.1", ChangeType::Patch).unwrap(),
            "1.2.4"
        );
    }
}
