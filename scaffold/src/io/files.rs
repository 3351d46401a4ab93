//! Filesystem helpers: path resolution, JSON files and directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Resolve a user-supplied path: expand a leading `~` and make it absolute.
///
/// Returns `None` for empty input.
pub fn resolve_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let expanded = expand_home(raw);
    match std::path::absolute(&expanded) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!(path = %expanded.display(), err = %err, "cannot make path absolute");
            Some(expanded)
        }
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if cfg!(windows) {
        return PathBuf::from(raw);
    }
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Read and parse a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Serialize `value` as pretty JSON with a trailing newline and write it
/// atomically (temp file + rename), creating parent directories.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value).context("serialize json")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// Copy the tree at `src` into `dest`, preserving relative structure.
///
/// Directories are created before the files they contain. Existing files at
/// the destination are overwritten.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("create directory {}", dest.display()))?;
    let mut entries = fs::read_dir(src)
        .with_context(|| format!("read directory {}", src.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("read entry in {}", src.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let from = entry.path();
        let to = dest.join(entry.file_name());
        let kind = entry
            .file_type()
            .with_context(|| format!("stat {}", from.display()))?;
        if kind.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
        }
    }
    debug!(src = %src.display(), dest = %dest.display(), "directory copied");
    Ok(())
}

/// Delete the tree at `path`. A missing directory is logged and ignored.
pub fn delete_dir_recursive(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "directory not deleted: not found");
            return Ok(());
        }
        Err(err) => return Err(err).with_context(|| format!("stat {}", path.display())),
    };
    if !meta.is_dir() {
        return fs::remove_file(path).with_context(|| format!("remove {}", path.display()));
    }

    for entry in fs::read_dir(path).with_context(|| format!("read directory {}", path.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", path.display()))?;
        let child = entry.path();
        let kind = entry
            .file_type()
            .with_context(|| format!("stat {}", child.display()))?;
        if kind.is_dir() {
            delete_dir_recursive(&child)?;
        } else {
            fs::remove_file(&child).with_context(|| format!("remove {}", child.display()))?;
        }
    }
    fs::remove_dir(path).with_context(|| format!("remove directory {}", path.display()))
}
