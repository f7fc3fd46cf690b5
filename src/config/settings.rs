//! Operator settings for Ortomat
//!
//! Controls backup limits, the temporary password handed out on restore,
//! password hashing cost and the default log filter.

use serde::{Deserialize, Serialize};

use super::paths::OrtomatPaths;
use crate::backup::{DEFAULT_ACTIVITY_LOG_LIMIT, DEFAULT_TEMPORARY_PASSWORD};
use crate::error::OrtomatError;

/// Backup and restore behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSettings {
    /// Most recent activity-log records included in an export
    pub activity_log_limit: usize,
    /// Plaintext every restored account's password is reset to
    pub temporary_password: String,
    /// Export the current state before a forced restore
    pub pre_restore_backup: bool,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            activity_log_limit: DEFAULT_ACTIVITY_LOG_LIMIT,
            temporary_password: DEFAULT_TEMPORARY_PASSWORD.to_string(),
            pre_restore_backup: true,
        }
    }
}

/// Argon2 cost parameters for password hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_cost: argon2::Params::DEFAULT_M_COST,
            time_cost: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Settings for Ortomat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default tracing filter when neither RUST_LOG nor -v is given
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub backup: BackupSettings,

    #[serde(default)]
    pub hashing: HashingParams,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            log_filter: default_log_filter(),
            backup: BackupSettings::default(),
            hashing: HashingParams::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &OrtomatPaths) -> Result<Self, OrtomatError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                OrtomatError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                OrtomatError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Reject settings the backup subsystem cannot run with
    pub fn validate(&self) -> Result<(), OrtomatError> {
        if self.backup.temporary_password.is_empty() {
            return Err(OrtomatError::Config(
                "backup.temporary_password cannot be empty".into(),
            ));
        }
        if self.backup.activity_log_limit == 0 {
            return Err(OrtomatError::Config(
                "backup.activity_log_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &OrtomatPaths) -> Result<(), OrtomatError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            OrtomatError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            OrtomatError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backup.activity_log_limit, 1000);
        assert_eq!(settings.backup.temporary_password, "password123");
        assert!(settings.backup.pre_restore_backup);
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OrtomatPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.backup.activity_log_limit = 50;
        settings.hashing.memory_cost = 1024;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.backup.activity_log_limit, 50);
        assert_eq!(loaded.hashing.memory_cost, 1024);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OrtomatPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{"backup": {"pre_restore_backup": false}}"#,
        )
        .unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert!(!loaded.backup.pre_restore_backup);
        assert_eq!(loaded.backup.activity_log_limit, 1000);
        assert_eq!(loaded.hashing, HashingParams::default());
    }

    #[test]
    fn test_empty_password_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OrtomatPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{"backup": {"temporary_password": ""}}"#,
        )
        .unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, OrtomatError::Config(_)));
    }
}
