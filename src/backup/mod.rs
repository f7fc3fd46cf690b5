//! Backup system for Ortomat
//!
//! Exports the whole data store to a versioned snapshot document and
//! restores a store from one.
//!
//! # Architecture
//!
//! - `BackupExporter`: reads every entity kind into a `Snapshot`, stripping
//!   account passwords and capping activity logs
//! - `BackupRestorer`: validates an untrusted snapshot, then deletes and
//!   re-inserts every kind inside one store transaction
//! - `Snapshot`: the shared document format and its validator
//! - `files`: reading, writing and listing `backup-*.json` files
//!
//! # Snapshot Format
//!
//! - `timestamp`: when the export started (RFC 3339)
//! - `version`: format tag, currently `"1.0"`
//! - `data`: one array of records per entity kind, keyed `accounts`,
//!   `machines`, `products`, `cells`, `doctorMachines`, `courierMachines`,
//!   `inviteTokens`, `payments`, `sales`, `activityLogs`, `settings`
//!
//! # Example
//!
//! ```rust,ignore
//! use ortomat::backup::{BackupExporter, BackupRestorer};
//! use ortomat::crypto::Argon2Hasher;
//!
//! let snapshot = BackupExporter::new(&store).export()?;
//! let hasher = Argon2Hasher::default();
//! let result = BackupRestorer::new(&store, &hasher).restore(&snapshot)?;
//! println!("{}", result.summary());
//! ```

mod exporter;
mod files;
mod restore;
mod snapshot;

pub use exporter::{BackupExporter, DEFAULT_ACTIVITY_LOG_LIMIT};
pub use files::{
    list_backups, read_document, read_snapshot_file, resolve_backup_path, write_snapshot_file,
    BackupFile,
};
pub use restore::{BackupRestorer, RestoreResult, DEFAULT_TEMPORARY_PASSWORD};
pub use snapshot::{backup_filename, EntityBundle, Snapshot, SNAPSHOT_VERSION, SUPPORTED_VERSIONS};
