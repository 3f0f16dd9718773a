//! Keel configuration stored under `.keel/config.toml`.

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::fs_util::write_atomic;

/// Keel configuration (TOML).
///
/// Intended to be edited by humans. Missing fields default to the standard
/// `.keel/` layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct KeelConfig {
    pub store: StoreConfig,
}

/// Locations of the file-backed collaborators, relative to `.keel/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Artifact and version sets.
    pub sets_file: String,
    /// Directory of per-resource event histories.
    pub events_dir: String,
    /// Durable pause records.
    pub paused_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sets_file: "sets.json".to_string(),
            events_dir: "events".to_string(),
            paused_file: "paused.json".to_string(),
        }
    }
}

impl KeelConfig {
    pub fn validate(&self) -> Result<()> {
        validate_relative("store.sets_file", &self.store.sets_file)?;
        validate_relative("store.events_dir", &self.store.events_dir)?;
        validate_relative("store.paused_file", &self.store.paused_file)?;
        Ok(())
    }
}

fn validate_relative(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{} must be non-empty", field));
    }
    let escapes = Path::new(value)
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(anyhow!("{} must be a relative path inside .keel", field));
    }
    Ok(())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `KeelConfig::default()`.
pub fn load_config(path: &Path) -> Result<KeelConfig> {
    if !path.exists() {
        let cfg = KeelConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: KeelConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically replace the config file.
pub fn write_config(path: &Path, cfg: &KeelConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
