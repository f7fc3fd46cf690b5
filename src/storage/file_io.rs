//! File I/O utilities with atomic writes
//!
//! Table files are written to a sibling temp file, synced, then renamed into
//! place. A transaction stages every modified table before renaming any of
//! them.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::OrtomatError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, OrtomatError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| OrtomatError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| OrtomatError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON next to `path` without touching `path` itself
///
/// Returns the temp file path, to be passed to [`commit_staged`].
pub fn stage_json<T, P>(path: P, data: &T) -> Result<PathBuf, OrtomatError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            OrtomatError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target, so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| OrtomatError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    let written = serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| OrtomatError::Storage(format!("Failed to serialize data: {}", e)))
        .and_then(|_| {
            writer
                .flush()
                .map_err(|e| OrtomatError::Storage(format!("Failed to flush data: {}", e)))
        })
        .and_then(|_| {
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| OrtomatError::Storage(format!("Failed to sync data: {}", e)))
        });

    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(temp_path)
}

/// Move a staged temp file over its target
pub fn commit_staged(temp_path: &Path, path: &Path) -> Result<(), OrtomatError> {
    fs::rename(temp_path, path).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        OrtomatError::Storage(format!("Failed to rename temp file: {}", e))
    })
}

/// Drop staged temp files that will not be committed
pub fn discard_staged(temp_paths: &[PathBuf]) {
    for temp_path in temp_paths {
        let _ = fs::remove_file(temp_path);
    }
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), OrtomatError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = stage_json(path, data)?;
    commit_staged(&temp_path, path)
}
