//! Version resolution: pin a requested version token to a concrete release.

use scm_schema::{ComponentId, LATEST};
use tracing::{debug, warn};

use crate::error::Result;
use crate::net::RegistryClient;

/// Resolve `requested` for `id` to a concrete version string.
///
/// An explicit version is returned unchanged. For `latest` the
/// registry-wide index is consulted first; if the index is unavailable or
/// has no entry for the component, the component's own `latest`-tagged
/// metadata is fetched directly. If both paths fail the literal string
/// `"latest"` is returned: callers must treat that as "could not
/// resolve", never as a real version.
pub async fn resolve_version(
    registry: &RegistryClient,
    id: &ComponentId,
    requested: &str,
) -> Result<String> {
    if requested != LATEST {
        return Ok(requested.to_string());
    }

    // 1. Registry-wide index lookup.
    match registry.fetch_index().await {
        Ok(index) => {
            let full_name = id.to_string();
            if let Some(entry) = index.iter().find(|e| e.name == full_name) {
                debug!("Resolved {full_name}@latest to {} via index", entry.version);
                return Ok(entry.version.clone());
            }
            debug!("Index has no entry for {full_name}; falling back to direct lookup");
        }
        Err(e) => {
            warn!("Registry index fetch failed: {e}; falling back to direct lookup");
        }
    }

    // 2. Direct lookup of the latest-tagged metadata.
    match registry.fetch_item(id, LATEST).await {
        Ok(item) => {
            debug!("Resolved {id}@latest to {} via direct lookup", item.version);
            Ok(item.version)
        }
        Err(e) => {
            // Degraded mode: surface the sentinel, not a fake version.
            warn!("Direct latest lookup for {id} failed: {e}");
            Ok(LATEST.to_string())
        }
    }
}

/// Whether a resolution result is usable as a concrete version.
pub fn is_resolved(version: &str) -> bool {
    version != LATEST
}
