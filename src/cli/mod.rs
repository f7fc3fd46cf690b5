//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod status;

pub use backup::{handle_backup_command, BackupCommands};
pub use status::format_status;
