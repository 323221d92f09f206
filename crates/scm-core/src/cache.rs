//! TTL cache for remote fetches (registry index, per-component metadata).
//!
//! One JSON file per entry under the cache directory, named by the
//! SHA-256 of the logical key. Expired and corrupt entries self-heal by
//! deletion on read. The cache is an explicitly constructed instance
//! handed to commands; there is no process-wide singleton.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;

/// Default lifetime for cached registry metadata.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// One persisted cache entry wrapping arbitrary JSON data.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    data: serde_json::Value,
    /// UNIX epoch seconds when the entry was written.
    timestamp: u64,
    /// Lifetime in seconds.
    ttl: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) > self.ttl
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// On-disk TTL cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    /// Open (or lazily create) a cache rooted at `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Stable filename for a logical key.
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(hasher.finalize())))
    }

    /// Look up a fresh entry for `key`, deserializing its data.
    ///
    /// Misses, expired entries, and corrupt files all return `None`;
    /// the latter two are deleted on the way out.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Corrupt cache entry for '{key}': {e}; deleting");
                fs::remove_file(&path).ok();
                return None;
            }
        };

        if entry.is_expired(now_secs()) {
            debug!("Cache entry for '{key}' expired; deleting");
            fs::remove_file(&path).ok();
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(data) => {
                debug!("Cache hit for '{key}'");
                Some(data)
            }
            Err(e) => {
                warn!("Cache entry for '{key}' has incompatible shape: {e}; deleting");
                fs::remove_file(&path).ok();
                None
            }
        }
    }

    /// Store `data` under `key` with the given lifetime.
    ///
    /// The write is atomic (temp file then rename) so a concurrent reader
    /// observes either the old entry or the new one, never a torn file.
    pub fn put<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let entry = CacheEntry {
            key: key.to_string(),
            data: serde_json::to_value(data)?,
            timestamp: now_secs(),
            ttl: ttl.as_secs(),
        };

        let path = self.entry_path(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string(&entry)?)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Drop one entry, if present.
    pub fn invalidate(&self, key: &str) {
        fs::remove_file(self.entry_path(key)).ok();
    }

    /// Remove every entry in the cache directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn clear(&self) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().extension().is_some_and(|e| e == "json") {
                fs::remove_file(entry.path()).ok();
            }
        }
        Ok(())
    }
}
