//! Component identifiers and user-supplied specs.
//!
//! Supports:
//! - Latest: `acme/button` or `acme/button@latest`
//! - Exact: `acme/button@1.2.3`

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::LATEST;
use crate::reserved::is_reserved;

/// Errors raised while validating identifiers and specs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    /// The namespace does not look like a GitHub username.
    #[error("Invalid namespace '{0}': expected 1-39 characters (letters, digits, '-', '_')")]
    InvalidNamespace(String),

    /// The component name violates the naming rule.
    #[error("Invalid component name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// What specifically was wrong with it.
        reason: &'static str,
    },

    /// The name belongs to the upstream design-system vendor.
    #[error("'{0}' is a reserved component name owned by the upstream vendor")]
    Reserved(String),

    /// The spec string is not of the form `namespace/name[@version]`.
    #[error("Invalid component spec '{0}': expected namespace/name[@version]")]
    InvalidSpec(String),

    /// The version token is neither a semantic version nor `latest`.
    #[error("Invalid version '{0}': expected a semantic version or 'latest'")]
    InvalidVersion(String),
}

/// A validated `(namespace, name)` pair identifying one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    namespace: String,
    name: String,
}

impl ComponentId {
    /// Build an identifier from its parts, validating both.
    pub fn new(namespace: &str, name: &str) -> Result<Self, IdentError> {
        validate_namespace(namespace)?;
        validate_name(name)?;
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse the canonical `namespace/name` string form.
    pub fn parse(s: &str) -> Result<Self, IdentError> {
        let (namespace, name) = s
            .split_once('/')
            .ok_or_else(|| IdentError::InvalidSpec(s.to_string()))?;
        Self::new(namespace, name)
    }

    /// The publishing identity this component belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The bare component name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Parsed component specifier with an optional version.
///
/// A missing or explicit `@latest` suffix both mean "newest published".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    /// The component being referred to.
    pub id: ComponentId,
    /// Pinned version, or `None` for latest.
    pub version: Option<String>,
}

impl ComponentSpec {
    /// Parse a spec like `acme/button` or `acme/button@1.2.3`.
    pub fn parse(spec: &str) -> Result<Self, IdentError> {
        let (ident, version) = match spec.split_once('@') {
            Some((ident, version)) => {
                if ident.is_empty() || version.is_empty() {
                    return Err(IdentError::InvalidSpec(spec.to_string()));
                }
                (ident, Some(version))
            }
            None => (spec, None),
        };

        let id = ComponentId::parse(ident)?;

        // Treat "latest" as no version
        let version = match version {
            Some(LATEST) | None => None,
            Some(v) => {
                if semver::Version::parse(v).is_err() {
                    return Err(IdentError::InvalidVersion(v.to_string()));
                }
                Some(v.to_string())
            }
        };

        Ok(Self { id, version })
    }

    /// The version token to request from the registry.
    pub fn requested_version(&self) -> &str {
        self.version.as_deref().unwrap_or(LATEST)
    }

    /// Check if this specifier requests a specific version.
    pub fn is_pinned(&self) -> bool {
        self.version.is_some()
    }
}

impl fmt::Display for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.id, v),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Validate a GitHub-username-shaped namespace: 1-39 chars, alnum/hyphen/underscore.
pub fn validate_namespace(namespace: &str) -> Result<(), IdentError> {
    let ok = !namespace.is_empty()
        && namespace.len() <= 39
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(IdentError::InvalidNamespace(namespace.to_string()))
    }
}

/// Validate a component name's shape: `^[a-z][a-z0-9-]*[a-z0-9]$`,
/// 2-50 chars, no consecutive hyphens.
///
/// Reserved-name membership is checked separately by [`validate_new_name`]
/// since installs of vendor dependencies must redirect, not reject.
pub fn validate_name(name: &str) -> Result<(), IdentError> {
    let err = |reason| IdentError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.len() < 2 || name.len() > 50 {
        return Err(err("must be 2-50 characters"));
    }
    let bytes = name.as_bytes();
    if !bytes[0].is_ascii_lowercase() {
        return Err(err("must start with a lowercase letter"));
    }
    if !(bytes[bytes.len() - 1].is_ascii_lowercase() || bytes[bytes.len() - 1].is_ascii_digit()) {
        return Err(err("must end with a letter or digit"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(err("may only contain lowercase letters, digits, and hyphens"));
    }
    if name.contains("--") {
        return Err(err("must not contain consecutive hyphens"));
    }
    Ok(())
}

/// Validate a name being claimed for a new component (create or fork target).
///
/// On top of the shape rule this rejects names owned by the upstream vendor.
pub fn validate_new_name(name: &str) -> Result<(), IdentError> {
    validate_name(name)?;
    if is_reserved(name) {
        return Err(IdentError::Reserved(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let spec = ComponentSpec::parse("acme/button").unwrap();
        assert_eq!(spec.id.namespace(), "acme");
        assert_eq!(spec.id.name(), "button");
        assert_eq!(spec.version, None);
    }

    #[test]
    fn test_parse_versioned() {
        let spec = ComponentSpec::parse("acme/button@1.2.3").unwrap();
        assert_eq!(spec.version.as_deref(), Some("1.2.3"));
        assert!(spec.is_pinned());
    }

    #[test]
    fn test_parse_latest() {
        let spec = ComponentSpec::parse("acme/button@latest").unwrap();
        assert_eq!(spec.version, None);
        assert_eq!(spec.requested_version(), "latest");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(ComponentSpec::parse("button").is_err());
        assert!(ComponentSpec::parse("acme/button@").is_err());
        assert!(ComponentSpec::parse("@1.0.0").is_err());
        assert!(ComponentSpec::parse("acme/button@not-semver").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let spec = ComponentSpec::parse("acme/button@1.2.3").unwrap();
        assert_eq!(spec.to_string(), "acme/button@1.2.3");
        let unpinned = ComponentSpec::parse("acme/button").unwrap();
        assert_eq!(unpinned.to_string(), "acme/button");
    }

    #[test]
    fn test_namespace_rules() {
        assert!(validate_namespace("acme").is_ok());
        assert!(validate_namespace("a_b-c9").is_ok());
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace(&"x".repeat(40)).is_err());
        assert!(validate_namespace("bad.dot").is_err());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("button").is_ok());
        assert!(validate_name("my-button2").is_ok());
        assert!(validate_name("x").is_err()); // too short
        assert!(validate_name("9button").is_err()); // digit start
        assert!(validate_name("button-").is_err()); // hyphen end
        assert!(validate_name("my--button").is_err()); // consecutive hyphens
        assert!(validate_name("MyButton").is_err()); // uppercase
        assert!(validate_name(&"a".repeat(51)).is_err()); // too long
    }

    #[test]
    fn test_new_name_rejects_reserved() {
        assert!(validate_new_name("my-button").is_ok());
        let err = validate_new_name("card").unwrap_err();
        assert!(matches!(err, IdentError::Reserved(_)));
    }
}
