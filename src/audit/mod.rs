//! Audit journal for backup operations
//!
//! Every export, restore, and rejected restore is appended to
//! `audit.log` as one JSON line, so operators can see who replaced the data
//! and when.

pub mod entry;
pub mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::AuditLogger;
