//! Snapshot files on disk
//!
//! Reading, writing, listing and resolving `backup-*.json` files in a
//! backup directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{OrtomatError, OrtomatResult};
use crate::storage::write_json_atomic;

use super::snapshot::Snapshot;

/// Metadata about a snapshot file
#[derive(Debug, Clone)]
pub struct BackupFile {
    pub filename: String,
    pub path: PathBuf,
    /// Export time taken from the file name
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Write a snapshot as pretty JSON into `dir`, named after its timestamp
pub fn write_snapshot_file(dir: &Path, snapshot: &Snapshot) -> OrtomatResult<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| OrtomatError::Io(format!("Failed to create backup directory: {}", e)))?;

    let path = dir.join(snapshot.filename());
    write_json_atomic(&path, snapshot)?;

    Ok(path)
}

/// Read the raw JSON document of a snapshot file without validating it
pub fn read_document(path: &Path) -> OrtomatResult<serde_json::Value> {
    let contents = fs::read_to_string(path)
        .map_err(|e| OrtomatError::Io(format!("Failed to read backup file: {}", e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| OrtomatError::Format(format!("{} is not valid JSON: {}", path.display(), e)))
}

/// Read and validate a snapshot file
pub fn read_snapshot_file(path: &Path) -> OrtomatResult<Snapshot> {
    Snapshot::from_value(read_document(path)?)
}

/// List snapshot files in a directory, newest first
pub fn list_backups(dir: &Path) -> OrtomatResult<Vec<BackupFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();

    for entry in fs::read_dir(dir)
        .map_err(|e| OrtomatError::Io(format!("Failed to read backup directory: {}", e)))?
    {
        let entry = entry
            .map_err(|e| OrtomatError::Io(format!("Failed to read directory entry: {}", e)))?;

        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == "json") {
            if let Some(info) = parse_backup_file(&path) {
                backups.push(info);
            }
        }
    }

    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(backups)
}

/// Resolve `latest`, a path, or a file name inside `dir`
pub fn resolve_backup_path(dir: &Path, backup: &str) -> OrtomatResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return list_backups(dir)?
            .into_iter()
            .next()
            .map(|b| b.path)
            .ok_or_else(|| OrtomatError::backup_not_found("latest"));
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    let in_dir = dir.join(backup);
    if in_dir.exists() {
        return Ok(in_dir);
    }

    let with_ext = dir.join(format!("{}.json", backup));
    if with_ext.exists() {
        return Ok(with_ext);
    }

    Err(OrtomatError::backup_not_found(backup))
}

fn parse_backup_file(path: &Path) -> Option<BackupFile> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let stamp = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(stamp)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupFile {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
    })
}

/// Parse the timestamp part of a file name (`2026-10-18T09-30-12-345Z`)
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H-%M-%S-%3fZ").ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}
