//! Snapshot restoration
//!
//! Replaces the contents of every entity kind with a snapshot's records.
//! The whole delete-then-insert sequence runs in one store transaction, so a
//! failure part way through leaves the store exactly as it was.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::crypto::CredentialHasher;
use crate::error::OrtomatResult;
use crate::models::{EntityKind, Record, CREDENTIAL_FIELD};
use crate::storage::{Persistence, Store};

use super::snapshot::Snapshot;

/// Plaintext password given to restored accounts unless configured otherwise
pub const DEFAULT_TEMPORARY_PASSWORD: &str = "password123";

/// Restores snapshots into a store
pub struct BackupRestorer<'a, H: CredentialHasher + ?Sized> {
    store: &'a Store,
    hasher: &'a H,
    temporary_password: String,
}

impl<'a, H: CredentialHasher + ?Sized> BackupRestorer<'a, H> {
    /// Create a restorer using the default temporary password
    pub fn new(store: &'a Store, hasher: &'a H) -> Self {
        Self {
            store,
            hasher,
            temporary_password: DEFAULT_TEMPORARY_PASSWORD.to_string(),
        }
    }

    /// Set the plaintext every restored account's password is reset to
    pub fn with_temporary_password(mut self, password: impl Into<String>) -> Self {
        self.temporary_password = password.into();
        self
    }

    /// Validate an untrusted document, then restore it
    ///
    /// A document that fails validation performs no deletions or insertions.
    pub fn restore_document(&self, document: Value) -> OrtomatResult<RestoreResult> {
        let snapshot = Snapshot::from_value(document)?;
        self.restore(&snapshot)
    }

    /// Replace every entity kind with the snapshot's contents
    pub fn restore(&self, snapshot: &Snapshot) -> OrtomatResult<RestoreResult> {
        // One hash for the whole restore, computed before the store is locked
        let has_accounts = snapshot
            .data
            .get(EntityKind::Accounts)
            .map_or(false, |accounts| !accounts.is_empty());
        let temporary_hash = if has_accounts {
            Some(self.hasher.hash(&self.temporary_password)?)
        } else {
            None
        };

        let mut result = RestoreResult {
            version: snapshot.version.clone(),
            backup_date: snapshot.timestamp,
            ..RestoreResult::default()
        };

        self.store.transaction(|tx| {
            for &kind in &EntityKind::DELETE_ORDER {
                result.deleted += tx.delete_all(kind)?;
            }

            for &kind in &EntityKind::INSERT_ORDER {
                let Some(records) = snapshot.data.get(kind) else {
                    continue;
                };
                if records.is_empty() {
                    continue;
                }

                let mut records = records.to_vec();
                if kind == EntityKind::Accounts {
                    if let Some(hash) = &temporary_hash {
                        reset_credentials(&mut records, hash);
                    }
                    result.temporary_credentials = records.len();
                }

                let inserted = tx.create_many(kind, records)?;
                info!(kind = %kind, count = inserted, "restored records");
                result.restored.insert(kind, inserted);
            }

            Ok(())
        })?;

        if result.temporary_credentials > 0 {
            warn!(
                accounts = result.temporary_credentials,
                "{} restored account(s) now share the temporary password and must change it",
                result.temporary_credentials
            );
        }

        Ok(result)
    }
}

fn reset_credentials(accounts: &mut [Record], hash: &str) {
    for account in accounts {
        account.insert(CREDENTIAL_FIELD.to_string(), Value::String(hash.to_string()));
    }
}

/// Result of a restore operation
#[derive(Debug, Default)]
pub struct RestoreResult {
    /// Version tag of the restored snapshot
    pub version: String,
    /// When the snapshot was exported
    pub backup_date: DateTime<Utc>,
    /// Rows removed from the store before inserting
    pub deleted: usize,
    /// Rows inserted per kind (kinds absent or empty in the snapshot are omitted)
    pub restored: BTreeMap<EntityKind, usize>,
    /// Accounts now holding the shared temporary password
    pub temporary_credentials: usize,
}

impl RestoreResult {
    /// Rows restored for a kind
    pub fn restored_count(&self, kind: EntityKind) -> usize {
        self.restored.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_restored(&self) -> usize {
        self.restored.values().sum()
    }

    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        if self.restored.is_empty() {
            return "Restored: nothing (snapshot holds no records)".to_string();
        }

        let parts: Vec<String> = self
            .restored
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect();
        format!("Restored: {}", parts.join(", "))
    }
}
