//! Durable actuation pause flags.
//!
//! Pause records live apart from event history and survive its deletion, so a
//! resource whose history was cleared stays paused until explicitly resumed.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fs_util::write_atomic;

/// Read-only view of pause flags.
pub trait ActuationPauseTracker: Send + Sync {
    /// True if the resource or its owning application is paused.
    fn is_paused(&self, resource_id: &str) -> Result<bool>;
}

/// Pause records (`.keel/paused.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseRecords {
    /// Individually paused resource ids.
    pub resources: BTreeSet<String>,
    /// Paused application names.
    pub applications: BTreeSet<String>,
    /// Owning application of each known resource.
    pub resource_applications: BTreeMap<String, String>,
}

impl PauseRecords {
    pub fn pause_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resources.insert(resource_id.into());
        self
    }

    pub fn pause_application(mut self, application: impl Into<String>) -> Self {
        self.applications.insert(application.into());
        self
    }

    pub fn with_owner(
        mut self,
        resource_id: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        self.resource_applications
            .insert(resource_id.into(), application.into());
        self
    }

    pub fn is_paused(&self, resource_id: &str) -> bool {
        if self.resources.contains(resource_id) {
            return true;
        }
        self.resource_applications
            .get(resource_id)
            .is_some_and(|application| self.applications.contains(application))
    }
}

/// Pause records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPauseTracker {
    records: PauseRecords,
}

impl InMemoryPauseTracker {
    pub fn new(records: PauseRecords) -> Self {
        Self { records }
    }
}

impl ActuationPauseTracker for InMemoryPauseTracker {
    fn is_paused(&self, resource_id: &str) -> Result<bool> {
        Ok(self.records.is_paused(resource_id))
    }
}

/// Pause records read from a JSON file on every query.
#[derive(Debug, Clone)]
pub struct FilePauseTracker {
    path: PathBuf,
}

impl FilePauseTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ActuationPauseTracker for FilePauseTracker {
    fn is_paused(&self, resource_id: &str) -> Result<bool> {
        let records = load_pause_records(&self.path)?;
        let paused = records.is_paused(resource_id);
        debug!(resource_id, paused, "pause flag checked");
        Ok(paused)
    }
}

/// Load pause records. A missing file means nothing is paused.
pub fn load_pause_records(path: &Path) -> Result<PauseRecords> {
    if !path.exists() {
        return Ok(PauseRecords::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read pause records {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parse pause records {}", path.display()))
}

/// Write pause records with canonical formatting.
pub fn write_pause_records(path: &Path, records: &PauseRecords) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(records).context("serialize pause records")?;
    buf.push('\n');
    write_atomic(path, &buf).context("write pause records")
}
