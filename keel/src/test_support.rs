//! Test-only helpers for building histories, artifacts and `.keel/` workspaces.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::types::{
    ArtifactType, DeliveryArtifact, DeliveryArtifactVersion, ResourceHistoryEvent, ResourceStatus,
};
use crate::io::event_store::FileEventHistory;
use crate::io::init::{InitOptions, KeelPaths, init_keel};
use crate::io::pause_store::{PauseRecords, write_pause_records};

/// Veto event with optional reason and suggested status.
pub fn veto(reason: Option<&str>, suggested_status: Option<ResourceStatus>) -> ResourceHistoryEvent {
    ResourceHistoryEvent::ActuationVetoed {
        reason: reason.map(str::to_string),
        suggested_status,
    }
}

/// `len` alternating diff/launch events, newest first, starting with a diff.
pub fn flapping_history(len: usize) -> Vec<ResourceHistoryEvent> {
    (0..len)
        .map(|i| {
            if i % 2 == 0 {
                ResourceHistoryEvent::DeltaDetected
            } else {
                ResourceHistoryEvent::ActuationLaunched
            }
        })
        .collect()
}

/// Debian artifact with the given name.
pub fn deb(name: &str) -> DeliveryArtifact {
    DeliveryArtifact::new(name, ArtifactType::Deb)
}

/// Version record without metadata.
pub fn version_of(artifact: &DeliveryArtifact, version: &str) -> DeliveryArtifactVersion {
    DeliveryArtifactVersion::new(artifact.clone(), version)
}

/// Temporary project root with an initialized `.keel/`.
pub struct TestWorkspace {
    temp: TempDir,
    paths: KeelPaths,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let paths = init_keel(temp.path(), &InitOptions { force: false })?;
        Ok(Self { temp, paths })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn paths(&self) -> &KeelPaths {
        &self.paths
    }

    /// Write a newest-first history for `resource_id`.
    pub fn write_history(&self, resource_id: &str, events: &[ResourceHistoryEvent]) -> Result<()> {
        let path = FileEventHistory::new(&self.paths.events_dir).history_path(resource_id)?;
        let mut buf = serde_json::to_string_pretty(events)?;
        buf.push('\n');
        fs::write(&path, buf).with_context(|| format!("write history {}", path.display()))
    }

    pub fn write_pauses(&self, records: &PauseRecords) -> Result<()> {
        write_pause_records(&self.paths.paused_path, records)
    }
}
