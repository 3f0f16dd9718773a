//! `.keel/` layout and scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use super::config::{KeelConfig, load_config, write_config};
use super::pause_store::{PauseRecords, write_pause_records};
use super::set_store::{Sets, write_sets};

/// All canonical paths within `.keel/` for a project root.
#[derive(Debug, Clone)]
pub struct KeelPaths {
    pub keel_dir: PathBuf,
    pub config_path: PathBuf,
    pub sets_path: PathBuf,
    pub events_dir: PathBuf,
    pub paused_path: PathBuf,
}

impl KeelPaths {
    /// Paths for the default layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, &KeelConfig::default())
    }

    /// Paths with store locations taken from `cfg`.
    pub fn with_config(root: impl Into<PathBuf>, cfg: &KeelConfig) -> Self {
        let keel_dir = root.into().join(".keel");
        Self {
            config_path: keel_dir.join("config.toml"),
            sets_path: keel_dir.join(&cfg.store.sets_file),
            events_dir: keel_dir.join(&cfg.store.events_dir),
            paused_path: keel_dir.join(&cfg.store.paused_file),
            keel_dir,
        }
    }

    /// Resolve paths for an existing workspace, honoring `.keel/config.toml`.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let cfg = load_config(&Self::new(&root).config_path)?;
        Ok(Self::with_config(root, &cfg))
    }
}

/// Options for `init_keel`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing keel-owned files.
    pub force: bool,
}

/// Create `.keel/` scaffolding in `root`.
///
/// Fails if `.keel/` already exists unless `options.force` is set. A forced
/// re-init keeps a valid existing `config.toml` and resets the stores at the
/// locations it names; an unreadable config is replaced with the defaults.
/// Event histories already present are left untouched either way.
pub fn init_keel(root: &Path, options: &InitOptions) -> Result<KeelPaths> {
    let defaults = KeelPaths::new(root);
    if defaults.keel_dir.exists() && !options.force {
        return Err(anyhow!(
            "keel init: .keel already exists (use --force to overwrite)"
        ));
    }
    if defaults.keel_dir.exists() && !defaults.keel_dir.is_dir() {
        return Err(anyhow!("keel init: .keel exists but is not a directory"));
    }

    let cfg = match load_config(&defaults.config_path) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(error = %format!("{:#}", err), "replacing unreadable config with defaults");
            KeelConfig::default()
        }
    };
    let paths = KeelPaths::with_config(root, &cfg);

    create_dir(&paths.keel_dir)?;
    create_dir(&paths.events_dir)?;

    write_config(&paths.config_path, &cfg)?;
    write_sets(&paths.sets_path, &Sets::new())?;
    write_pause_records(&paths.paused_path, &PauseRecords::default())?;

    Ok(paths)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))
}
