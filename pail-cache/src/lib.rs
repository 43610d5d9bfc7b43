//! Completion cache for pail
//!
//! Interactive path completion against an object store would need a
//! live listing call per keystroke. This crate persists a small index
//! of bucket contents so completion can answer from disk, falling back
//! to a live listing only when no cached entry covers the request.
//!
//! Entries are advisory: nothing here detects staleness, and two
//! concurrent updaters race last-writer-wins. Both are documented
//! properties, not bugs to fix with locking.

use chrono::{DateTime, Utc};
use pail_core::{PailError, PailResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// One cached scan: the paths found under a prefix, how deep the scan
/// went, and when it was captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub children: Vec<String>,
    pub depth: u32,
    pub captured_at: DateTime<Utc>,
}

/// On-disk completion index, keyed by URI prefix.
#[derive(Debug)]
pub struct CompletionCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl CompletionCache {
    /// Load the cache at `path`, or start empty if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> PailResult<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data)
                .map_err(|e| PailError::Cache(format!("unreadable cache file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(PailError::Io(e)),
        };
        Ok(Self { path, entries })
    }

    /// Conventional cache file location for this user.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "pail", "pail")
            .map(|dirs| dirs.cache_dir().join("complete.json"))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every entry covered by `prefix` with one fresh scan.
    pub fn update(&mut self, prefix: &str, depth: u32, children: Vec<String>) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        self.entries.insert(
            prefix.to_string(),
            CacheEntry {
                children,
                depth,
                captured_at: Utc::now(),
            },
        );
    }

    /// Candidates for a partial path, if some cached entry covers it at
    /// sufficient depth. `None` means the caller should list live.
    pub fn lookup(&self, partial: &str) -> Option<Vec<String>> {
        let (key, entry) = self
            .entries
            .iter()
            .filter(|(key, _)| partial.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())?;

        let needed = partial[key.len()..].matches('/').count() as u32 + 1;
        if entry.depth < needed {
            debug!(%partial, cached_depth = entry.depth, needed, "cache entry too shallow");
            return None;
        }

        Some(
            entry
                .children
                .iter()
                .filter(|c| c.starts_with(partial))
                .cloned()
                .collect(),
        )
    }

    /// Drop entries under a prefix, or everything.
    pub fn clear(&mut self, prefix: Option<&str>) {
        match prefix {
            Some(p) => self.entries.retain(|key, _| !key.starts_with(p)),
            None => self.entries.clear(),
        }
    }

    /// Persist to disk. Last writer wins when two processes race.
    pub fn save(&self) -> PailResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| PailError::Cache(e.to_string()))?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    /// Remove the cache file entirely.
    pub fn delete_file(&mut self) -> PailResult<()> {
        self.entries.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PailError::Io(e)),
        }
    }
}

/// Once-per-user staleness notice, tracked by a sentinel file passed in
/// explicitly so tests never touch the real cache directory.
#[derive(Debug)]
pub struct StaleWarning {
    sentinel: PathBuf,
}

impl StaleWarning {
    pub fn new(sentinel: impl Into<PathBuf>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    pub fn default_sentinel() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "pail", "pail")
            .map(|dirs| dirs.cache_dir().join("complete.warned"))
    }

    pub fn should_warn(&self) -> bool {
        !self.sentinel.exists()
    }

    pub fn mark_warned(&self) -> PailResult<()> {
        if let Some(parent) = self.sentinel.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.sentinel, b"")?;
        Ok(())
    }
}
