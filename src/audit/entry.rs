//! Audit entry data structures
//!
//! One entry per backup operation: who ran it, what kind of operation it
//! was, and how many records of each kind were involved.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backup::{RestoreResult, Snapshot};
use crate::models::EntityKind;

/// Types of backup operations that are journaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// A snapshot was exported
    Export,
    /// A snapshot replaced the store contents
    Restore,
    /// A restore was refused or failed before completing
    RestoreRejected,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Export => write!(f, "EXPORT"),
            Operation::Restore => write!(f, "RESTORE"),
            Operation::RestoreRejected => write!(f, "RESTORE REJECTED"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,

    /// When the operation finished (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// Email of the operator who ran it
    pub operator: String,

    /// Snapshot version involved, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Records per kind exported or restored
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<EntityKind, usize>,

    /// Free-form detail (file name, rejection reason)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEntry {
    fn new(operation: Operation, operator: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            operation,
            operator: operator.into(),
            version: None,
            counts: BTreeMap::new(),
            detail: None,
        }
    }

    /// Entry for a completed export
    pub fn export(operator: impl Into<String>, snapshot: &Snapshot) -> Self {
        Self {
            version: Some(snapshot.version.clone()),
            counts: snapshot.counts().into_iter().collect(),
            ..Self::new(Operation::Export, operator)
        }
    }

    /// Entry for a completed restore
    pub fn restore(operator: impl Into<String>, result: &RestoreResult) -> Self {
        Self {
            version: Some(result.version.clone()),
            counts: result.restored.clone(),
            detail: Some(format!(
                "{} row(s) replaced, {} account(s) on temporary password",
                result.deleted, result.temporary_credentials
            )),
            ..Self::new(Operation::Restore, operator)
        }
    }

    /// Entry for a restore that did not complete
    pub fn restore_rejected(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            detail: Some(reason.into()),
            ..Self::new(Operation::RestoreRejected, operator)
        }
    }

    /// Attach a detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn total_records(&self) -> usize {
        self.counts.values().sum()
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} by {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.operator
        );

        if let Some(version) = &self.version {
            output.push_str(&format!(" (v{})", version));
        }

        if !self.counts.is_empty() {
            output.push_str(&format!(" - {} record(s)", self.total_records()));
        }

        if let Some(detail) = &self.detail {
            output.push_str(&format!("\n  {}", detail));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Export.to_string(), "EXPORT");
        assert_eq!(Operation::RestoreRejected.to_string(), "RESTORE REJECTED");
    }

    #[test]
    fn test_export_entry() {
        let mut snapshot = Snapshot::new(Utc::now());
        snapshot.data.insert(EntityKind::Machines, vec![serde_json::Map::new()]);
        snapshot.data.insert(EntityKind::Sales, Vec::new());

        let entry = AuditEntry::export("a@x.com", &snapshot);
        assert_eq!(entry.operation, Operation::Export);
        assert_eq!(entry.version.as_deref(), Some("1.0"));
        assert_eq!(entry.counts.get(&EntityKind::Machines), Some(&1));
        assert_eq!(entry.total_records(), 1);
    }

    #[test]
    fn test_serialization() {
        let entry = AuditEntry::restore_rejected("a@x.com", "missing data field");

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"restore_rejected\""));
        assert!(!json.contains("counts"));

        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.operation, Operation::RestoreRejected);
        assert_eq!(deserialized.id, entry.id);
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::restore_rejected("ops@x.com", "Forbidden").with_detail("wrong role");
        let formatted = entry.format_human_readable();
        assert!(formatted.contains("RESTORE REJECTED by ops@x.com"));
        assert!(formatted.contains("wrong role"));
    }
}
