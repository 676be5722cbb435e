//! Time-limited, per-repository snapshot cache.
//!
//! This module defines [`ProjectCache`], the only shared mutable state of the
//! engine, and [`SnapshotStore`], which persists full snapshots between CLI runs.
//!
//! # Cache Strategy
//! - **Freshness**: an entry is fresh while `now - last_update < ttl`; stale entries
//!   are kept and only cause a refresh
//! - **Single refresh**: the `refreshing` flag allows one background refresh per path
//! - **Whole-entry writes**: every update replaces the snapshot, never merges it
//! - **Locking**: one reader/writer lock guards the whole map
//!
//! # Persistence
//! Snapshots are stored as JSON at `<cache dir>/gover/<md5 of repo path>/snapshot.json`
//! with their last-update time, so a later process keeps honouring the TTL.

use crate::core::dirs::get_cache_directory;
use crate::core::error::{GoverError, Result};
use crate::core::state::ProjectSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// `None` for a placeholder created when a refresh starts on an empty slot.
    pub snapshot: Option<ProjectSnapshot>,
    pub last_update: SystemTime,
    pub refreshing: bool,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: SystemTime) -> bool {
        // A clock that went backwards counts as zero age.
        let age = now.duration_since(self.last_update).unwrap_or_default();
        age < ttl
    }
}

#[derive(Debug)]
pub struct ProjectCache {
    ttl: Duration,
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

impl Default for ProjectCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ProjectCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the snapshot for `path` if present and fresh.
    pub fn get(&self, path: &Path) -> Option<ProjectSnapshot> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(path)?;
        if !entry.is_fresh(self.ttl, SystemTime::now()) {
            return None;
        }
        entry.snapshot.clone()
    }

    /// Store a full snapshot, resetting freshness and clearing the refresh flag.
    pub fn put(&self, path: &Path, snapshot: ProjectSnapshot) {
        self.put_at(path, snapshot, SystemTime::now());
    }

    /// Store a snapshot with an explicit last-update time.
    pub fn put_at(&self, path: &Path, snapshot: ProjectSnapshot, updated: SystemTime) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            path.to_path_buf(),
            CacheEntry {
                snapshot: Some(snapshot),
                last_update: updated,
                refreshing: false,
            },
        );
    }

    /// Toggle the in-progress flag, creating a placeholder when setting it on an
    /// empty slot.
    pub fn mark_refreshing(&self, path: &Path, refreshing: bool) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(path) {
            Some(entry) => entry.refreshing = refreshing,
            None if refreshing => {
                entries.insert(
                    path.to_path_buf(),
                    CacheEntry {
                        snapshot: None,
                        last_update: SystemTime::now(),
                        refreshing: true,
                    },
                );
            }
            None => {}
        }
    }

    /// Set the in-progress flag unless it is already set or the entry became
    /// fresh in the meantime.
    ///
    /// Returns `true` when the caller now owns the refresh for `path`.
    pub fn try_begin_refresh(&self, path: &Path) -> bool {
        let now = SystemTime::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(path) {
            Some(entry) if entry.refreshing => false,
            Some(entry) if entry.snapshot.is_some() && entry.is_fresh(self.ttl, now) => false,
            Some(entry) => {
                entry.refreshing = true;
                true
            }
            None => {
                entries.insert(
                    path.to_path_buf(),
                    CacheEntry {
                        snapshot: None,
                        last_update: SystemTime::now(),
                        refreshing: true,
                    },
                );
                true
            }
        }
    }

    pub fn is_refreshing(&self, path: &Path) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(path).is_some_and(|entry| entry.refreshing)
    }

    /// Drop the entry for `path`. A refresh already in progress keeps its claim
    /// through a placeholder, so no second refresh can start meanwhile.
    pub fn invalidate(&self, path: &Path) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.remove(path) {
            if entry.refreshing {
                entries.insert(
                    path.to_path_buf(),
                    CacheEntry {
                        snapshot: None,
                        last_update: entry.last_update,
                        refreshing: true,
                    },
                );
            }
        }
    }

    /// Copy of the raw entry, fresh or not.
    pub fn entry(&self, path: &Path) -> Option<CacheEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(path).cloned()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSnapshot {
    snapshot: ProjectSnapshot,
    updated_at: SystemTime,
}

/// On-disk copy of full snapshots, one file per repository path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted in the platform cache directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(get_cache_directory()?))
    }

    fn file_for(&self, repo_path: &Path) -> PathBuf {
        let repo_hash = format!("{:x}", md5::compute(repo_path.to_string_lossy().as_bytes()));
        self.root.join(repo_hash).join("snapshot.json")
    }

    pub fn save(
        &self,
        repo_path: &Path,
        snapshot: &ProjectSnapshot,
        updated_at: SystemTime,
    ) -> Result<()> {
        let file = self.file_for(repo_path);
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir).map_err(|source| GoverError::CacheWriteFailed {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let persisted = PersistedSnapshot {
            snapshot: snapshot.clone(),
            updated_at,
        };
        let json = serde_json::to_string_pretty(&persisted)?;
        fs::write(&file, json).map_err(|source| GoverError::CacheWriteFailed {
            path: file.clone(),
            source,
        })?;

        log::debug!("Saved snapshot for {} to {}", repo_path.display(), file.display());
        Ok(())
    }

    /// Load the persisted snapshot for `repo_path`, if any.
    pub fn load(&self, repo_path: &Path) -> Result<Option<(ProjectSnapshot, SystemTime)>> {
        let file = self.file_for(repo_path);
        if !file.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&file)?;
        let persisted: PersistedSnapshot =
            serde_json::from_str(&content).map_err(|source| GoverError::CacheParseFailed {
                path: file.clone(),
                source,
            })?;
        Ok(Some((persisted.snapshot, persisted.updated_at)))
    }
}
