//! The registry manifest model (`registry.json`).
//!
//! Every document read from the network or from disk is deserialized into
//! these types and validated at the boundary; nothing downstream works
//! with untyped JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ident::{validate_name, validate_namespace};
use crate::version::is_valid_version;

/// Errors raised while validating a registry manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// A required field is missing or empty.
    #[error("Manifest field '{0}' is missing or empty")]
    EmptyField(&'static str),

    /// The declared version is not valid semver.
    #[error("Manifest declares invalid version '{0}'")]
    InvalidVersion(String),

    /// The component name violates the naming rule.
    #[error("Manifest declares invalid name: {0}")]
    InvalidName(String),

    /// A registry dependency is not `namespace/name` shaped.
    #[error("Registry dependency '{0}' is not of the form namespace/name")]
    InvalidDependency(String),

    /// A file entry of kind `file` or `page` has no install target.
    #[error("File entry '{0}' of kind {1} must declare a target path")]
    MissingTarget(String, &'static str),

    /// A file path failed the safety check.
    #[error("Unsafe file path '{path}': {reason}")]
    UnsafePath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Kind of a published component or of one of its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// A reusable UI component (default for `create`).
    Ui,
    /// A React-style hook.
    Hook,
    /// A theme bundle (CSS variables, no runtime code).
    Theme,
    /// A composed block of several components.
    Block,
    /// A routable page; installs to an explicit target.
    Page,
    /// Shared library code.
    Lib,
    /// A loose file; installs to an explicit target.
    File,
    /// A stylesheet.
    Style,
    /// Generic component (legacy kind).
    Component,
}

impl ComponentKind {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Hook => "hook",
            Self::Theme => "theme",
            Self::Block => "block",
            Self::Page => "page",
            Self::Lib => "lib",
            Self::File => "file",
            Self::Style => "style",
            Self::Component => "component",
        }
    }
}

/// One file belonging to a component. Owned by its [`RegistryItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the component root in the registry.
    pub path: String,
    /// What kind of file this is.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Inline content, present when the manifest embeds the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Install destination inside the consuming project.
    /// Required for `file` and `page` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// CSS variables bundled with a component, split by scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssVars {
    /// Scope-independent variables merged into `:root`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theme: BTreeMap<String, String>,
    /// Light-mode variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub light: BTreeMap<String, String>,
    /// Dark-mode variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dark: BTreeMap<String, String>,
}

impl CssVars {
    /// Whether no variables are declared in any scope.
    pub fn is_empty(&self) -> bool {
        self.theme.is_empty() && self.light.is_empty() && self.dark.is_empty()
    }
}

/// Metadata for one published component: the parsed `registry.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    /// Bare component name (without namespace).
    pub name: String,
    /// What kind of component this is.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Short description shown in search results.
    #[serde(default)]
    pub description: String,
    /// Original author, `name <email>` style.
    #[serde(default)]
    pub author: String,
    /// Published version of this manifest.
    pub version: String,
    /// RFC 3339 timestamp of the publish, set by the publish flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Account that pushed this version (may differ from author).
    #[serde(default)]
    pub publisher: String,
    /// npm runtime dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// npm dev-dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dev_dependencies: Vec<String>,
    /// Other registry components this one depends on (`namespace/name`,
    /// or a bare vendor name for upstream primitives).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,
    /// Free-form discovery categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Ordered list of files making up the component.
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Optional CSS variable bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_vars: Option<CssVars>,
    /// Optional raw CSS appended verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    /// Optional documentation text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    /// Optional opaque metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, serde_json::Value>>,
}

impl RegistryItem {
    /// Validate the manifest at the boundary (after reading from network
    /// or disk, before anything acts on it).
    ///
    /// # Errors
    ///
    /// Returns the first [`ManifestError`] encountered: empty required
    /// fields, malformed version or name, malformed registry dependency,
    /// a `file`/`page` entry without a target, or an unsafe path.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.is_empty() {
            return Err(ManifestError::EmptyField("name"));
        }
        validate_name(&self.name).map_err(|e| ManifestError::InvalidName(e.to_string()))?;

        if self.version.is_empty() {
            return Err(ManifestError::EmptyField("version"));
        }
        if !is_valid_version(&self.version) {
            return Err(ManifestError::InvalidVersion(self.version.clone()));
        }

        for dep in &self.registry_dependencies {
            // Bare names are allowed only for vendor primitives, which the
            // install flow redirects; everything else must be namespaced.
            if !dep.contains('/') && !crate::reserved::is_reserved(dep) {
                return Err(ManifestError::InvalidDependency(dep.clone()));
            }
            if let Some((ns, name)) = dep.split_once('/') {
                if validate_namespace(ns).is_err() || validate_name(name).is_err() {
                    return Err(ManifestError::InvalidDependency(dep.clone()));
                }
            }
        }

        for file in &self.files {
            validate_install_path(&file.path)?;
            match file.target.as_deref() {
                Some(target) => validate_install_path(target)?,
                None if matches!(file.kind, ComponentKind::File | ComponentKind::Page) => {
                    return Err(ManifestError::MissingTarget(
                        file.path.clone(),
                        file.kind.as_str(),
                    ));
                }
                None => {}
            }
        }

        Ok(())
    }
}

/// One record in the registry-wide flat index used for search and
/// latest-version lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryIndexEntry {
    /// Full `namespace/name` identifier.
    pub name: String,
    /// Latest published version.
    pub version: String,
    /// Component kind, if the index carries it.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComponentKind>,
    /// Short description for search output.
    #[serde(default)]
    pub description: String,
    /// Discovery categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// Filenames that must never be written by an install.
const SENSITIVE_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "cargo.lock",
];

/// Reject traversal, absolute prefixes, home-dir expansion, shell
/// interpolation, and known-sensitive filenames.
pub fn validate_install_path(path: &str) -> Result<(), ManifestError> {
    let err = |reason| ManifestError::UnsafePath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(err("empty path"));
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(err("absolute paths are not allowed"));
    }
    // Windows drive prefix, e.g. "C:\"
    if path.len() >= 2 && path.as_bytes()[1] == b':' && path.as_bytes()[0].is_ascii_alphabetic() {
        return Err(err("absolute paths are not allowed"));
    }
    if path.starts_with('~') {
        return Err(err("home-directory expansion is not allowed"));
    }
    if path.contains("$(") || path.contains('`') || path.contains("${") {
        return Err(err("shell interpolation markers are not allowed"));
    }

    for component in path.split(['/', '\\']) {
        if component == ".." {
            return Err(err("path traversal is not allowed"));
        }
        let lower = component.to_ascii_lowercase();
        if lower.starts_with(".git") {
            return Err(err("git metadata paths are not allowed"));
        }
        if lower == ".env" || lower.starts_with(".env.") {
            return Err(err("environment files are not allowed"));
        }
        if SENSITIVE_FILES.contains(&lower.as_str()) {
            return Err(err("lockfiles are not allowed"));
        }
    }

    Ok(())
}
