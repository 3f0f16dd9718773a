//! Small filesystem helpers shared by the file-backed stores.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` via a uniquely named sibling temp file.
///
/// Readers see either the old or the new contents, never a partial write, and
/// concurrent writers never share a temp file.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = parent_dir(path)?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// Advisory lock on a `<file>.lock` sidecar, released on drop.
#[derive(Debug)]
pub(crate) struct FileLock {
    _file: File,
}

impl FileLock {
    /// Block until no other process or handle holds the lock for `path`.
    pub(crate) fn exclusive(path: &Path) -> Result<Self> {
        let lock_path = lock_path(path)?;
        let file = open_lock_file(&lock_path)?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("lock {}", lock_path.display()))?;
        Ok(Self { _file: file })
    }

    /// Block until no writer holds the lock for `path`.
    pub(crate) fn shared(path: &Path) -> Result<Self> {
        let lock_path = lock_path(path)?;
        let file = open_lock_file(&lock_path)?;
        FileExt::lock_shared(&file).with_context(|| format!("lock {}", lock_path.display()))?;
        Ok(Self { _file: file })
    }
}

fn lock_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("path missing file name {}", path.display()))?;
    let mut lock_name = name.to_os_string();
    lock_name.push(".lock");
    Ok(path.with_file_name(lock_name))
}

fn open_lock_file(lock_path: &Path) -> Result<File> {
    let parent = parent_dir(lock_path)?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)
        .with_context(|| format!("open lock file {}", lock_path.display()))
}

fn parent_dir(path: &Path) -> Result<&Path> {
    path.parent()
        .with_context(|| format!("path missing parent {}", path.display()))
}
