//! Backup service
//!
//! Guarded entry points for export and restore: only ADMIN operators may run
//! them, and every outcome is written to the audit journal.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::audit::{AuditEntry, AuditLogger};
use crate::backup::{write_snapshot_file, BackupExporter, BackupRestorer, RestoreResult, Snapshot};
use crate::config::BackupSettings;
use crate::crypto::CredentialHasher;
use crate::error::{OrtomatError, OrtomatResult};
use crate::models::{EntityKind, Operator};
use crate::storage::Store;

/// Operator name used when nobody is identified on an empty store
const BOOTSTRAP_OPERATOR: &str = "bootstrap";

/// Service for guarded backup operations
pub struct BackupService<'a> {
    store: &'a Store,
    settings: &'a BackupSettings,
    hasher: &'a dyn CredentialHasher,
    audit: AuditLogger,
}

impl<'a> BackupService<'a> {
    /// Create a new backup service
    pub fn new(
        store: &'a Store,
        settings: &'a BackupSettings,
        hasher: &'a dyn CredentialHasher,
        audit: AuditLogger,
    ) -> Self {
        Self {
            store,
            settings,
            hasher,
            audit,
        }
    }

    /// Identify the operator running a command
    ///
    /// An empty store has no accounts to check against, so whoever runs the
    /// command there is treated as an administrator.
    pub fn resolve_operator(&self, email: Option<&str>) -> OrtomatResult<Operator> {
        let has_accounts = self
            .store
            .counts()?
            .iter()
            .any(|&(kind, count)| kind == EntityKind::Accounts && count > 0);

        if !has_accounts {
            return Ok(Operator::bootstrap(email.unwrap_or(BOOTSTRAP_OPERATOR)));
        }

        let email = email.ok_or_else(|| {
            OrtomatError::Forbidden("an operator email is required once accounts exist".into())
        })?;

        let account = self
            .store
            .find_account_by_email(email)?
            .ok_or_else(|| OrtomatError::NotFound {
                entity_type: "Account",
                identifier: email.to_string(),
            })?;

        Operator::from_account(&account)
    }

    /// Export a snapshot of the whole store
    pub fn export(&self, operator: &Operator) -> OrtomatResult<Snapshot> {
        operator.require_admin("Backup export")?;

        let snapshot = BackupExporter::new(self.store)
            .with_activity_log_limit(self.settings.activity_log_limit)
            .export()?;

        info!(
            operator = %operator.email,
            records = snapshot.data.total_records(),
            "backup exported"
        );
        self.audit.log(&AuditEntry::export(&operator.email, &snapshot))?;

        Ok(snapshot)
    }

    /// Export a snapshot and write it into `dir`, returning the file path
    pub fn write_export(&self, operator: &Operator, dir: &Path) -> OrtomatResult<PathBuf> {
        let snapshot = self.export(operator)?;
        write_snapshot_file(dir, &snapshot)
    }

    /// Replace the store with an untrusted snapshot document
    pub fn restore(&self, operator: &Operator, document: Value) -> OrtomatResult<RestoreResult> {
        let outcome = operator
            .require_admin("Backup restore")
            .and_then(|()| {
                BackupRestorer::new(self.store, self.hasher)
                    .with_temporary_password(self.settings.temporary_password.clone())
                    .restore_document(document)
            });

        match outcome {
            Ok(result) => {
                info!(operator = %operator.email, "{}", result.summary());
                self.audit.log(&AuditEntry::restore(&operator.email, &result))?;
                Ok(result)
            }
            Err(e) => {
                self.audit
                    .log(&AuditEntry::restore_rejected(&operator.email, e.to_string()))?;
                Err(e)
            }
        }
    }
}
