//! scm - source component manager engine
//!
//! Core logic for publishing, resolving, and installing UI component
//! bundles stored as plain files in a GitHub-hosted registry.
//!
//! # Architecture
//!
//! - **Boundary validation**: every manifest read from the network or
//!   disk becomes a typed [`scm_schema::RegistryItem`] and is validated
//!   before anything acts on it.
//! - **Explicit context**: HTTP client, cache, and config are constructed
//!   once per invocation and passed through [`Context`]; there is no
//!   process-wide mutable state.
//! - **In-process recursion**: transitive installs carry an explicit
//!   visited set, so circular dependencies are a set-membership check.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.scm/
//! ├── config.json          # Credentials (0600)
//! ├── cache/               # TTL-cached remote fetches
//! └── version-hashes.json  # Fingerprint snapshots keyed by component dir
//! ```

pub mod cache;
pub mod config;
pub mod css;
pub mod deps;
pub mod error;
pub mod fingerprint;
pub mod fork;
pub mod install;
pub mod ledger;
pub mod net;
pub mod policy;
pub mod publish;
pub mod resolver;

pub use error::{Error, Result};
pub use install::Context;

use dirs::home_dir;
use std::path::PathBuf;

/// Returns the primary configuration directory, or None if the user's home cannot be resolved.
pub fn try_scm_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("SCM_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".scm"))
}

/// Returns the canonical scm home directory (`~/.scm`).
///
/// # Panics
/// Panics if the home directory cannot be determined.
pub fn scm_home() -> PathBuf {
    try_scm_home().expect("Could not determine home directory. Set SCM_HOME to override.")
}

/// Credential store path: ~/.scm/config.json
pub fn config_path() -> PathBuf {
    scm_home().join("config.json")
}

/// Cache path: ~/.scm/cache
pub fn cache_path() -> PathBuf {
    scm_home().join("cache")
}

/// Fingerprint snapshot store: ~/.scm/version-hashes.json
pub fn snapshot_store_path() -> PathBuf {
    scm_home().join("version-hashes.json")
}

/// Per-project install ledger filename.
pub const LEDGER_FILE: &str = ".scm-installed.json";

/// User Agent string
pub const USER_AGENT: &str = concat!("scm/", env!("CARGO_PKG_VERSION"));
