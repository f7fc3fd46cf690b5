//! Snapshot export
//!
//! Reads every entity kind from storage into a single [`Snapshot`]. Account
//! passwords never leave the store; activity logs are capped to the most
//! recent entries.

use chrono::Utc;
use tracing::info;

use crate::error::OrtomatResult;
use crate::models::{EntityKind, Record, CREATED_AT_FIELD, CREDENTIAL_FIELD};
use crate::storage::{FindOptions, Persistence};

use super::snapshot::Snapshot;

/// Default cap on exported activity-log entries
pub const DEFAULT_ACTIVITY_LOG_LIMIT: usize = 1000;

/// Builds snapshots from a store
pub struct BackupExporter<'a, P: Persistence + ?Sized> {
    store: &'a P,
    activity_log_limit: usize,
}

impl<'a, P: Persistence + ?Sized> BackupExporter<'a, P> {
    /// Create an exporter with the default activity-log cap
    pub fn new(store: &'a P) -> Self {
        Self {
            store,
            activity_log_limit: DEFAULT_ACTIVITY_LOG_LIMIT,
        }
    }

    /// Set how many of the newest activity-log entries are exported
    pub fn with_activity_log_limit(mut self, limit: usize) -> Self {
        self.activity_log_limit = limit;
        self
    }

    /// Export every entity kind
    ///
    /// Any read failure aborts the whole export.
    pub fn export(&self) -> OrtomatResult<Snapshot> {
        let mut snapshot = Snapshot::new(Utc::now());

        for &kind in EntityKind::all() {
            let records = match kind {
                EntityKind::Accounts => self
                    .store
                    .find_all(kind, &FindOptions::all())?
                    .into_iter()
                    .map(strip_credentials)
                    .collect(),
                EntityKind::ActivityLogs => self.store.find_all(
                    kind,
                    &FindOptions::newest_first(CREATED_AT_FIELD, self.activity_log_limit),
                )?,
                _ => self.store.find_all(kind, &FindOptions::all())?,
            };

            info!(kind = %kind, count = records.len(), "exported records");
            snapshot.data.insert(kind, records);
        }

        Ok(snapshot)
    }
}

fn strip_credentials(mut account: Record) -> Record {
    account.remove(CREDENTIAL_FIELD);
    account
}
