//! Backup CLI commands
//!
//! Implements the export / restore / inspect / list / history commands.

use std::path::PathBuf;

use clap::Subcommand;

use crate::audit::AuditLogger;
use crate::backup::{list_backups, read_document, read_snapshot_file, resolve_backup_path, Snapshot};
use crate::config::paths::OrtomatPaths;
use crate::config::settings::Settings;
use crate::crypto::Argon2Hasher;
use crate::error::OrtomatResult;
use crate::services::BackupService;
use crate::storage::Store;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Export the whole store to a timestamped snapshot file
    Export {
        /// Directory to write the snapshot into (defaults to the backup directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Email of the ADMIN account running the export
        #[arg(long, env = "ORTOMAT_OPERATOR")]
        operator: Option<String>,
    },

    /// Replace ALL data with a snapshot
    Restore {
        /// Snapshot filename or path (use 'latest' for most recent)
        backup: String,

        /// Email of the ADMIN account running the restore
        #[arg(long, env = "ORTOMAT_OPERATOR")]
        operator: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a snapshot and show what it contains
    Inspect {
        /// Snapshot filename or path
        backup: String,
    },

    /// List snapshot files in the backup directory
    List,

    /// Show recent backup operations from the audit journal
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    store: &Store,
    paths: &OrtomatPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> OrtomatResult<()> {
    let hasher = Argon2Hasher::new(&settings.hashing)?;
    let service = BackupService::new(
        store,
        &settings.backup,
        &hasher,
        AuditLogger::new(paths.audit_log()),
    );

    match cmd {
        BackupCommands::Export { output, operator } => {
            let operator = service.resolve_operator(operator.as_deref())?;
            let dir = output.unwrap_or_else(|| paths.backup_dir());

            println!("Exporting backup...");
            let path = service.write_export(&operator, &dir)?;
            let snapshot = read_snapshot_file(&path)?;

            println!("Backup created: {}", snapshot.filename());
            println!("Location: {}", path.display());
            print_counts(&snapshot);
        }

        BackupCommands::Restore {
            backup,
            operator,
            force,
        } => {
            let backup_path = resolve_backup_path(&paths.backup_dir(), &backup)?;
            let operator = service.resolve_operator(operator.as_deref())?;

            let document = read_document(&backup_path)?;
            let snapshot = match Snapshot::from_value(document.clone()) {
                Ok(snapshot) => snapshot,
                // Hand it to the service so the rejection is journaled
                Err(e) => return service.restore(&operator, document).and(Err(e)),
            };

            println!("Backup Information");
            println!("==================");
            println!("File: {}", backup_path.display());
            println!(
                "Created: {}",
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Version: {}", snapshot.version);
            print_counts(&snapshot);
            println!();

            if !force {
                println!("WARNING: This will replace ALL current data!");
                println!("Every restored account will be reset to the temporary password.");
                println!("To proceed, run again with --force flag:");
                println!("  ortomat backup restore {} --force", backup);
                return Ok(());
            }

            if settings.backup.pre_restore_backup {
                println!("Creating backup of current data before restore...");
                let pre_restore = service.write_export(&operator, &paths.backup_dir())?;
                println!("Pre-restore backup saved: {}", pre_restore.display());
                println!();
            }

            println!("Restoring from backup...");
            let result = service.restore(&operator, document)?;

            println!("Restore complete!");
            println!("{}", result.summary());
            if result.temporary_credentials > 0 {
                println!();
                println!(
                    "{} account(s) now use the temporary password and must change it.",
                    result.temporary_credentials
                );
            }
        }

        BackupCommands::Inspect { backup } => {
            let backup_path = resolve_backup_path(&paths.backup_dir(), &backup)?;
            let snapshot = read_snapshot_file(&backup_path)?;
            let metadata = std::fs::metadata(&backup_path)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!("Size: {}", format_size(metadata.len()));
            println!(
                "Created: {}",
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Version: {}", snapshot.version);
            println!();
            print_counts(&snapshot);
        }

        BackupCommands::List => {
            let backups = list_backups(&paths.backup_dir())?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: ortomat backup export");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            for (i, backup) in backups.iter().enumerate() {
                println!(
                    "  {}. {} ({})",
                    i + 1,
                    backup.filename,
                    format_size(backup.size_bytes)
                );
            }
            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::History { limit } => {
            let entries = AuditLogger::new(paths.audit_log()).read_recent(limit)?;

            if entries.is_empty() {
                println!("No backup operations recorded.");
                return Ok(());
            }

            for entry in entries.iter().rev() {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}

fn print_counts(snapshot: &Snapshot) {
    println!("Contents:");
    for (kind, count) in snapshot.counts() {
        println!("  {:<22} {:>6}", kind.label(), count);
    }
    println!("  {:<22} {:>6}", "Total", snapshot.data.total_records());
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
