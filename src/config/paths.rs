//! Path management for Ortomat
//!
//! Provides XDG-compliant path resolution for configuration, table files,
//! backups and the audit journal.
//!
//! ## Path Resolution Order
//!
//! 1. `ORTOMAT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/ortomat` or `~/.config/ortomat`
//! 3. Windows: `%APPDATA%\ortomat`

use std::path::PathBuf;

use crate::error::OrtomatError;
use crate::models::EntityKind;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "ORTOMAT_DATA_DIR";

/// Manages all paths used by Ortomat
#[derive(Debug, Clone)]
pub struct OrtomatPaths {
    /// Base directory for all Ortomat data
    base_dir: PathBuf,
}

impl OrtomatPaths {
    /// Create a new OrtomatPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if neither the override nor a home directory can be
    /// determined.
    pub fn new() -> Result<Self, OrtomatError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create OrtomatPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/ortomat/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory holding one JSON file per table
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the default directory for snapshot files
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit journal
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to the table file for a kind (e.g. data/accounts.json)
    pub fn table_file(&self, kind: EntityKind) -> PathBuf {
        self.data_dir().join(format!("{}.json", kind.key()))
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), OrtomatError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| OrtomatError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| OrtomatError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| OrtomatError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default base directory based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, OrtomatError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                OrtomatError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("ortomat"))
}

/// Resolve the default base directory based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, OrtomatError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| OrtomatError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("ortomat"))
}
