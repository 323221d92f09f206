//! Content fingerprinting for change detection between publishes.
//!
//! A snapshot maps each source-relevant file (relative path) to a SHA-256
//! digest. Two snapshots are comparable only if they were built with the
//! same file-selection rule, which is why the allow-list and skip-list
//! live here and nowhere else.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::Result;

/// Path → content-hash map for one component directory.
pub type Snapshot = BTreeMap<String, String>;

/// File extensions considered part of a component's publishable surface.
const SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "rs", "svelte", "vue", "css", "scss", "html", "md", "mdx", "json",
];

/// Extensions that count as executable source when classifying additions.
const CODE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "rs", "svelte", "vue"];

/// Directories never descended into.
const SKIP_DIRS: &[&str] = &["node_modules", "target", "dist", "build", "out"];

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Present in both with differing hashes.
    pub changed: Vec<String>,
    /// Present only in the current snapshot.
    pub added: Vec<String>,
    /// Present only in the previous snapshot.
    pub removed: Vec<String>,
}

impl SnapshotDiff {
    /// Whether any file-level change was detected.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    /// Every path touched by this diff, in no particular order.
    pub fn touched(&self) -> impl Iterator<Item = &str> {
        self.changed
            .iter()
            .chain(self.added.iter())
            .chain(self.removed.iter())
            .map(String::as_str)
    }
}

/// Whether `path` has one of the fingerprinted extensions.
fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Whether `path` counts as executable source code (for minor-bump detection).
pub fn is_code_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || SKIP_DIRS.contains(&name)
}

/// Hash every source-relevant file under `root` into a [`Snapshot`].
///
/// Dependency, build, and dot-directories are skipped entirely.
/// Unreadable files and directories are skipped with a warning; they are
/// never fatal.
///
/// # Errors
///
/// Returns an error only if `root` itself does not exist or is not a
/// directory.
pub fn compute_snapshot(root: &Path) -> Result<Snapshot> {
    if !root.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("not a directory: {}", root.display()),
        )
        .into());
    }

    let mut snapshot = Snapshot::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !is_skipped_dir(name))
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }

        let content = match fs::read(entry.path()) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping unreadable file {}: {e}", entry.path().display());
                continue;
            }
        };

        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        let mut hasher = Sha256::new();
        hasher.update(&content);
        snapshot.insert(rel, hex::encode(hasher.finalize()));
    }

    Ok(snapshot)
}

/// Compare two snapshots. Pure function; persistence is the caller's job.
pub fn diff_snapshots(previous: &Snapshot, current: &Snapshot) -> SnapshotDiff {
    let mut diff = SnapshotDiff::default();

    for (path, hash) in current {
        match previous.get(path) {
            Some(prev_hash) if prev_hash != hash => diff.changed.push(path.clone()),
            Some(_) => {}
            None => diff.added.push(path.clone()),
        }
    }
    for path in previous.keys() {
        if !current.contains_key(path) {
            diff.removed.push(path.clone());
        }
    }

    diff
}

/// Persisted snapshots, keyed by component directory name.
///
/// Lives at `~/.scm/version-hashes.json` so the next publish can diff
/// against the previous one. A corrupt or missing file loads as empty.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SnapshotStore {
    /// Component directory name → last published snapshot.
    #[serde(default)]
    pub components: BTreeMap<String, Snapshot>,
}

impl SnapshotStore {
    /// Load the store from `path`, treating corrupt or missing files as empty.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Corrupt snapshot store at {}: {e}; starting fresh", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist the store atomically: write a temp file, then rename.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// write/rename fails. Callers treat this as non-critical bookkeeping.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// The stored snapshot for a component directory, if any.
    pub fn get(&self, component_dir: &str) -> Option<&Snapshot> {
        self.components.get(component_dir)
    }

    /// Replace the stored snapshot for a component directory.
    pub fn insert(&mut self, component_dir: &str, snapshot: Snapshot) {
        self.components.insert(component_dir.to_string(), snapshot);
    }
}
