//! Crash-safe file writes
//!
//! Content goes to a temporary file in the target directory, is flushed to
//! disk, then renamed over the target. Readers see the old file or the new
//! one, never a torn write.

use crate::utils::error::{ClassifierError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

async fn write_and_sync(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await
}

#[cfg(unix)]
async fn sync_parent(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::File::open(parent).await?.sync_all().await,
        None => Ok(()),
    }
}

#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Atomically replace `path` with `content`
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            ClassifierError::storage(format!("Failed to create directory {}: {}", parent.display(), e))
        })?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_and_sync(&tmp, content).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ClassifierError::storage(format!(
            "Failed to write {}: {}",
            tmp.display(),
            e
        )));
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ClassifierError::storage(format!(
            "Failed to move {} into place: {}",
            path.display(),
            e
        )));
    }

    sync_parent(path).await.map_err(|e| {
        ClassifierError::storage(format!("Failed to sync directory of {}: {}", path.display(), e))
    })
}

/// Atomically write `value` as pretty JSON
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &content).await
}

/// Read JSON from `path`; a missing file is `Ok(None)`
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ClassifierError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    serde_json::from_slice(&content).map(Some).map_err(|e| {
        ClassifierError::storage(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Remove `path` if it exists
pub async fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ClassifierError::storage(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}
