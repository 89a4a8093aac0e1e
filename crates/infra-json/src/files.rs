// JSON file helpers shared by the adapters

use serde::de::DeserializeOwned;
use serde::Serialize;
use shopfloor_core::error::{AppError, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

fn map_io_error(action: &str, path: &Path, err: std::io::Error) -> AppError {
    AppError::Persistence(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Read a JSON object keyed by identifier.
///
/// Returns `Ok(None)` if the file does not exist. An unreadable or
/// unparsable file is an error.
pub(crate) async fn read_json_map<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<BTreeMap<String, T>>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(map_io_error("read", path, e)),
    };

    if content.trim().is_empty() {
        return Ok(Some(BTreeMap::new()));
    }

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| AppError::Persistence(format!("Corrupt JSON in {}: {}", path.display(), e)))
}

/// Temp path used before the atomic rename (`jobs.json` -> `jobs.json.tmp`)
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Serialize `value` to the temp file next to `path`. Returns the temp path.
pub(crate) async fn write_tmp<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| map_io_error("create directory", parent, e))?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::Persistence(format!("Failed to serialize {}: {}", path.display(), e))
    })?;

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| map_io_error("write", &tmp, e))?;
    Ok(tmp)
}

/// Atomically replace `path` with the temp file written by [`write_tmp`]
pub(crate) async fn commit_tmp(tmp: &Path, path: &Path) -> Result<()> {
    tokio::fs::rename(tmp, path)
        .await
        .map_err(|e| map_io_error("rename", tmp, e))
}

/// Best-effort cleanup of a temp file after a failed save
pub(crate) async fn discard_tmp(tmp: &Path) {
    let _ = tokio::fs::remove_file(tmp).await;
}
