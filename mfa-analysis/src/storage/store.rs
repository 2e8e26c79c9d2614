//! JSON file persistence.
//!
//! Reports are written through a temp file and renamed into place, so a
//! crashed run never leaves a half-written report where the dashboard
//! would read it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use mfa_common::{Error, Result};

/// Reads and writes JSON report files.
pub struct JsonStore;

impl JsonStore {
    /// Persist a value as pretty-printed JSON, creating parent directories.
    pub fn save(path: &Path, value: &serde_json::Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::persistence(path.display().to_string(), format!("create dirs: {}", e))
            })?;
        }

        let body = serde_json::to_string_pretty(value).map_err(|e| {
            Error::persistence(path.display().to_string(), format!("encode: {}", e))
        })?;

        let tmp = tmp_path(path);
        fs::write(&tmp, body).map_err(|e| {
            Error::persistence(tmp.display().to_string(), format!("write: {}", e))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            Error::persistence(path.display().to_string(), format!("rename: {}", e))
        })?;

        debug!(path = %path.display(), "Saved JSON report");
        Ok(())
    }

    /// Load a JSON file into a value.
    pub fn load(path: &Path) -> Result<serde_json::Value> {
        let body = fs::read_to_string(path).map_err(|e| {
            Error::persistence(path.display().to_string(), format!("read: {}", e))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            Error::persistence(path.display().to_string(), format!("decode: {}", e))
        })
    }

    /// Run dates available under a report root: 8-digit directory names,
    /// ascending. A missing root is an empty list, not an error.
    pub fn list_date_dirs(root: &Path) -> Result<Vec<String>> {
        Ok(Self::entries(root)?
            .into_iter()
            .filter(|(name, is_dir)| *is_dir && name.len() == 8 && name.chars().all(|c| c.is_ascii_digit()))
            .map(|(name, _)| name)
            .collect())
    }

    /// Subdirectory names, ascending.
    pub fn list_subdirs(dir: &Path) -> Result<Vec<String>> {
        Ok(Self::entries(dir)?
            .into_iter()
            .filter(|(_, is_dir)| *is_dir)
            .map(|(name, _)| name)
            .collect())
    }

    /// Stems of `.json` files, ascending. Temp files are ignored.
    pub fn list_json_stems(dir: &Path) -> Result<Vec<String>> {
        Ok(Self::entries(dir)?
            .into_iter()
            .filter(|(name, is_dir)| !is_dir && name.ends_with(".json"))
            .map(|(name, _)| name.trim_end_matches(".json").to_string())
            .collect())
    }

    /// Sorted `(name, is_dir)` pairs for a directory; empty when absent.
    fn entries(dir: &Path) -> Result<Vec<(String, bool)>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let read = fs::read_dir(dir).map_err(|e| {
            Error::persistence(dir.display().to_string(), format!("read dir: {}", e))
        })?;
        for entry in read {
            let entry = entry.map_err(|e| {
                Error::persistence(dir.display().to_string(), format!("read dir: {}", e))
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.path().is_dir();
            entries.push((name, is_dir));
        }

        entries.sort();
        Ok(entries)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.json".to_string());
    file_name.push_str(".tmp");
    path.with_file_name(file_name)
}

// ============================================================================
// Tests
// ============================================================================
