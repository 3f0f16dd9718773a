//! Set-backed key/value storage.
//!
//! The [`SetStore`] trait is the storage boundary used by the artifact
//! registry. Every key holds a set of string members; `add` is an atomic
//! add-if-absent so concurrent registrations converge.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use super::fs_util::{FileLock, write_atomic};

/// Abstraction over set-valued storage backends.
pub trait SetStore: Send + Sync {
    /// Add `member` to the set at `key`. Returns true if it was not present.
    fn add(&self, key: &str, member: &str) -> Result<bool>;

    /// True if `member` is in the set at `key`.
    fn contains(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of the set at `key`. Missing keys are empty sets.
    fn members(&self, key: &str) -> Result<Vec<String>>;
}

/// Members of every set, keyed by set name.
pub type Sets = BTreeMap<String, BTreeSet<String>>;

/// Process-local store, used by tests and embedders without persistence.
#[derive(Debug, Default)]
pub struct InMemorySetStore {
    sets: Mutex<Sets>,
}

impl InMemorySetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Sets>> {
        self.sets
            .lock()
            .map_err(|_| anyhow!("in-memory set store lock poisoned"))
    }
}

impl SetStore for InMemorySetStore {
    fn add(&self, key: &str, member: &str) -> Result<bool> {
        let mut sets = self.lock()?;
        Ok(sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    fn contains(&self, key: &str, member: &str) -> Result<bool> {
        let sets = self.lock()?;
        Ok(sets.get(key).is_some_and(|set| set.contains(member)))
    }

    fn members(&self, key: &str) -> Result<Vec<String>> {
        let sets = self.lock()?;
        Ok(sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}

/// JSON-file store (`.keel/sets.json`).
///
/// Every operation holds an advisory lock on `sets.json.lock`: writers take it
/// exclusively for the whole read-modify-write, readers take it shared. The
/// file itself is replaced atomically, so separate processes and handles on
/// the same file converge like a single store.
#[derive(Debug, Clone)]
pub struct FileSetStore {
    path: PathBuf,
}

impl FileSetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Sets> {
        let _lock = FileLock::shared(&self.path)?;
        load_sets(&self.path)
    }
}

impl SetStore for FileSetStore {
    fn add(&self, key: &str, member: &str) -> Result<bool> {
        let _lock = FileLock::exclusive(&self.path)?;
        let mut sets = load_sets(&self.path)?;
        let added = sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        if added {
            debug!(path = %self.path.display(), key, "adding set member");
            write_sets(&self.path, &sets)?;
        }
        Ok(added)
    }

    fn contains(&self, key: &str, member: &str) -> Result<bool> {
        let sets = self.read()?;
        Ok(sets.get(key).is_some_and(|set| set.contains(member)))
    }

    fn members(&self, key: &str) -> Result<Vec<String>> {
        let mut sets = self.read()?;
        Ok(sets
            .remove(key)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default())
    }
}

/// Load all sets from disk. A missing file is an empty store.
pub fn load_sets(path: &Path) -> Result<Sets> {
    if !path.exists() {
        return Ok(Sets::new());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read set store {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse set store {}", path.display()))
}

/// Atomically replace the set store file.
///
/// Does not take the store lock; callers racing [`FileSetStore::add`] must
/// hold it themselves.
pub fn write_sets(path: &Path, sets: &Sets) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(sets).context("serialize set store")?;
    buf.push('\n');
    write_atomic(path, &buf).context("write set store")
}
