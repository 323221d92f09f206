//! Dependency normalization, conflict detection, and cycle tracking.
//!
//! Components declare two dependency sets: npm packages (installed by the
//! consumer's own package manager) and registry components (fetched and
//! installed by scm). A name appearing verbatim in both sets is reported
//! as a conflict but is not fatal. During transitive installs an explicit
//! visited set makes circular references a membership check.

use std::collections::HashSet;

use scm_schema::is_reserved;

use crate::error::{Error, Result};

/// Normalized dependency sets for one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepResolution {
    /// Deduplicated npm dependencies, declaration order preserved.
    pub npm: Vec<String>,
    /// Deduplicated registry dependencies, declaration order preserved.
    pub registry: Vec<String>,
    /// Names that appear verbatim in both input sets.
    pub conflicts: Vec<String>,
}

/// Where a registry dependency should be installed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepTarget {
    /// A community component, fetched from the scm registry.
    Registry(String),
    /// A vendor-owned name, redirected to the external vendor installer.
    Vendor(String),
}

/// Trim, drop empties, and deduplicate while preserving first-seen order.
fn normalize(deps: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    deps.iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .filter(|d| seen.insert(d.to_string()))
        .map(str::to_string)
        .collect()
}

/// Normalize both dependency lists and record same-name conflicts.
///
/// Conflicts are informational: the component may legitimately need an
/// npm package and a registry component that happen to share a name, but
/// the collision is worth surfacing to the author.
pub fn resolve_deps(npm_deps: &[String], registry_deps: &[String]) -> DepResolution {
    let npm = normalize(npm_deps);
    let registry = normalize(registry_deps);

    let npm_set: HashSet<&str> = npm.iter().map(String::as_str).collect();
    let conflicts = registry
        .iter()
        .filter(|d| npm_set.contains(d.as_str()))
        .cloned()
        .collect();

    DepResolution {
        npm,
        registry,
        conflicts,
    }
}

/// Classify one registry dependency: vendor names are redirected, not fetched.
pub fn classify_dep(dep: &str) -> DepTarget {
    // Bare names can only be vendor primitives; namespaced ones are
    // community components unless the name part shadows the vendor
    // (which creation prevents, but published data is not trusted).
    match dep.split_once('/') {
        None => {
            if is_reserved(dep) {
                DepTarget::Vendor(dep.to_string())
            } else {
                DepTarget::Registry(dep.to_string())
            }
        }
        Some((_, name)) if is_reserved(name) => DepTarget::Vendor(name.to_string()),
        Some(_) => DepTarget::Registry(dep.to_string()),
    }
}

/// Identifiers already entered during one top-level install.
///
/// Seeded with the component being installed; scoped to a single
/// invocation, so independent commands never share cycle state.
#[derive(Debug, Default)]
pub struct VisitedSet {
    entered: HashSet<String>,
}

impl VisitedSet {
    /// Start a visited set seeded with the root component's identifier.
    pub fn seeded(root: &str) -> Self {
        let mut set = Self::default();
        set.entered.insert(root.to_string());
        set
    }

    /// Mark `id` as entered before recursing into it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Circular`] if `id` was already entered, which
    /// covers both self-references and longer cycles. The caller skips
    /// the offending dependency and continues with its siblings.
    pub fn enter(&mut self, id: &str) -> Result<()> {
        if !self.entered.insert(id.to_string()) {
            return Err(Error::Circular(id.to_string()));
        }
        Ok(())
    }

    /// Whether `id` has been entered already.
    pub fn contains(&self, id: &str) -> bool {
        self.entered.contains(id)
    }
}
