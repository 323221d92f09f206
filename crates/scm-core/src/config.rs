//! Per-user credential store at `~/.scm/config.json`.
//!
//! Written atomically (full file then rename) and restricted to
//! owner-only permissions, so a crash mid-write leaves either the old
//! file or a fresh one.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Persisted user configuration and credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OAuth bearer token, if logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// GitHub username the token belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Registry base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
}

impl Config {
    /// Load the config, treating a missing or corrupt file as empty.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Corrupt config at {}: {e}; starting fresh", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist atomically, then restrict permissions to the owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// write, rename, or permission change fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Whether a token is present (not necessarily still valid).
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Drop credentials, keeping non-auth settings.
    pub fn clear_credentials(&mut self) {
        self.token = None;
        self.username = None;
    }
}
