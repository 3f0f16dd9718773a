//! Shared deterministic types for keel core logic.
//!
//! These types define stable contracts between the classifier, the artifact
//! registry and the storage adapters. They must not depend on external state
//! and their serialized forms must remain stable across runs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operational status of a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    Unknown,
    Paused,
    Happy,
    MissingDependency,
    Unhappy,
    Diff,
    Actuating,
    DiffNotActionable,
    Error,
    Created,
    Resumed,
    CurrentlyUnresolvable,
}

impl ResourceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceStatus::Unknown => "UNKNOWN",
            ResourceStatus::Paused => "PAUSED",
            ResourceStatus::Happy => "HAPPY",
            ResourceStatus::MissingDependency => "MISSING_DEPENDENCY",
            ResourceStatus::Unhappy => "UNHAPPY",
            ResourceStatus::Diff => "DIFF",
            ResourceStatus::Actuating => "ACTUATING",
            ResourceStatus::DiffNotActionable => "DIFF_NOT_ACTIONABLE",
            ResourceStatus::Error => "ERROR",
            ResourceStatus::Created => "CREATED",
            ResourceStatus::Resumed => "RESUMED",
            ResourceStatus::CurrentlyUnresolvable => "CURRENTLY_UNRESOLVABLE",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a resource's lifecycle history.
///
/// Events are recorded by upstream actuation logic and never mutated here.
/// A resource's history is always handled newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceHistoryEvent {
    Created,
    ActuationLaunched,
    ActuationResumed,
    ApplicationActuationResumed,
    ActuationPaused,
    ApplicationActuationPaused,
    DeltaDetected,
    DeltaResolved,
    Missing,
    Valid,
    DiffNotActionable,
    CheckError,
    CheckUnresolvable,
    TaskSucceeded,
    TaskFailed,
    ActuationVetoed {
        #[serde(default)]
        reason: Option<String>,
        /// Explicit status chosen by the veto. Older producers leave this unset.
        #[serde(default)]
        suggested_status: Option<ResourceStatus>,
    },
}

impl ResourceHistoryEvent {
    /// Stable label matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceHistoryEvent::Created => "Created",
            ResourceHistoryEvent::ActuationLaunched => "ActuationLaunched",
            ResourceHistoryEvent::ActuationResumed => "ActuationResumed",
            ResourceHistoryEvent::ApplicationActuationResumed => "ApplicationActuationResumed",
            ResourceHistoryEvent::ActuationPaused => "ActuationPaused",
            ResourceHistoryEvent::ApplicationActuationPaused => "ApplicationActuationPaused",
            ResourceHistoryEvent::DeltaDetected => "DeltaDetected",
            ResourceHistoryEvent::DeltaResolved => "DeltaResolved",
            ResourceHistoryEvent::Missing => "Missing",
            ResourceHistoryEvent::Valid => "Valid",
            ResourceHistoryEvent::DiffNotActionable => "DiffNotActionable",
            ResourceHistoryEvent::CheckError => "CheckError",
            ResourceHistoryEvent::CheckUnresolvable => "CheckUnresolvable",
            ResourceHistoryEvent::TaskSucceeded => "TaskSucceeded",
            ResourceHistoryEvent::TaskFailed => "TaskFailed",
            ResourceHistoryEvent::ActuationVetoed { .. } => "ActuationVetoed",
        }
    }
}

/// Packaging format of a delivery artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Deb,
    Docker,
}

impl ArtifactType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactType::Deb => "deb",
            ArtifactType::Docker => "docker",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "deb" => Ok(ArtifactType::Deb),
            "docker" => Ok(ArtifactType::Docker),
            other => Err(format!(
                "unknown artifact type '{}' (expected deb or docker)",
                other
            )),
        }
    }
}

/// Identity of a deployable unit, independent of any version.
///
/// Field order is part of the stored encoding; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryArtifact {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArtifactType,
}

impl DeliveryArtifact {
    pub fn new(name: impl Into<String>, kind: ArtifactType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for DeliveryArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// A concrete, orderable version discovered for a registered artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryArtifactVersion {
    pub artifact: DeliveryArtifact,
    pub version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl DeliveryArtifactVersion {
    pub fn new(artifact: DeliveryArtifact, version: impl Into<String>) -> Self {
        Self {
            artifact,
            version: version.into(),
            metadata: BTreeMap::new(),
        }
    }
}
