//! Service layer for Ortomat
//!
//! Services sit between the CLI and the backup engine, adding operator
//! checks and audit journaling.

pub mod backup;

pub use backup::BackupService;
