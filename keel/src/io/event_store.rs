//! Read access to per-resource event history.
//!
//! Recording events belongs to upstream actuation logic. These adapters only
//! read an existing newest-first history and never append to it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::core::types::ResourceHistoryEvent;

/// Bounded "most recent N" view over a resource's event log.
pub trait EventHistoryStore: Send + Sync {
    /// Up to `limit` most recent events for `resource_id`, newest first.
    fn event_history(&self, resource_id: &str, limit: usize) -> Result<Vec<ResourceHistoryEvent>>;
}

/// Fixed histories held in memory, keyed by resource id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventHistory {
    histories: HashMap<String, Vec<ResourceHistoryEvent>>,
}

impl InMemoryEventHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full newest-first history of a resource.
    pub fn with_history(
        mut self,
        resource_id: impl Into<String>,
        events: Vec<ResourceHistoryEvent>,
    ) -> Self {
        self.histories.insert(resource_id.into(), events);
        self
    }
}

impl EventHistoryStore for InMemoryEventHistory {
    fn event_history(&self, resource_id: &str, limit: usize) -> Result<Vec<ResourceHistoryEvent>> {
        Ok(self
            .histories
            .get(resource_id)
            .map(|events| events.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Histories stored as one JSON array per resource (`.keel/events/<id>.json`).
#[derive(Debug, Clone)]
pub struct FileEventHistory {
    dir: PathBuf,
}

impl FileEventHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the history of `resource_id`.
    pub fn history_path(&self, resource_id: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.json", history_file_stem(resource_id)?)))
    }
}

impl EventHistoryStore for FileEventHistory {
    fn event_history(&self, resource_id: &str, limit: usize) -> Result<Vec<ResourceHistoryEvent>> {
        let path = self.history_path(resource_id)?;
        if !path.exists() {
            debug!(resource_id, path = %path.display(), "no event history on disk");
            return Ok(Vec::new());
        }
        let mut events = load_history(&path)?;
        events.truncate(limit);
        debug!(resource_id, events = events.len(), "event history loaded");
        Ok(events)
    }
}

fn load_history(path: &Path) -> Result<Vec<ResourceHistoryEvent>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read history {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse history {}", path.display()))
}

/// Map a resource id (e.g. `ec2:cluster:prod:fnord`) onto a file stem.
///
/// Bytes outside `[A-Za-z0-9._~-]` are percent-encoded, `%` included, so
/// distinct ids always get distinct files. A leading `.` is encoded too, which
/// keeps `.` and `..` inside the events directory.
fn history_file_stem(resource_id: &str) -> Result<String> {
    if resource_id.is_empty() {
        return Err(anyhow!("invalid resource id '{}'", resource_id));
    }
    let encoded = urlencoding::encode(resource_id).into_owned();
    if let Some(rest) = encoded.strip_prefix('.') {
        return Ok(format!("%2E{}", rest));
    }
    Ok(encoded)
}
