//! Per-project install ledger (`.scm-installed.json`).
//!
//! Records which components are installed in a project so the update
//! flow knows what to refresh. Tracking failures must never abort an
//! otherwise-successful install, so every write path degrades to a
//! logged warning.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::LEDGER_FILE;
use crate::error::Result;

/// What the ledger knows about one installed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Installed version.
    pub version: String,
    /// When the install (or last update) happened.
    pub installed_at: DateTime<Utc>,
}

/// The per-project install ledger.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InstallLedger {
    /// `namespace/name` → entry.
    #[serde(default)]
    components: BTreeMap<String, LedgerEntry>,

    #[serde(skip)]
    path: PathBuf,
}

impl InstallLedger {
    /// Open the ledger for a project root; missing or corrupt files load
    /// as empty.
    pub fn open(project_root: &Path) -> Self {
        let path = project_root.join(LEDGER_FILE);
        let mut ledger = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<Self>(&content).unwrap_or_else(|e| {
                warn!("Corrupt install ledger at {}: {e}; starting fresh", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        ledger.path = path;
        ledger
    }

    /// Upsert an entry for `name` at `version` with the current timestamp
    /// and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; callers log it as a warning
    /// rather than failing the install (see [`record_non_fatal`]).
    ///
    /// [`record_non_fatal`]: InstallLedger::record_non_fatal
    pub fn record(&mut self, name: &str, version: &str) -> Result<()> {
        self.components.insert(
            name.to_string(),
            LedgerEntry {
                version: version.to_string(),
                installed_at: Utc::now(),
            },
        );
        self.save()
    }

    /// [`record`](InstallLedger::record), demoted to a warning on failure.
    pub fn record_non_fatal(&mut self, name: &str, version: &str) {
        if let Err(e) = self.record(name, version) {
            warn!("Failed to update install ledger for {name}: {e}");
        }
    }

    /// Every tracked component as `(name, entry)` pairs.
    pub fn read_all(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The tracked entry for one component, if any.
    pub fn get(&self, name: &str) -> Option<&LedgerEntry> {
        self.components.get(name)
    }

    /// Number of tracked components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether nothing is tracked yet.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
