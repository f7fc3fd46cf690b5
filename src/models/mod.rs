//! Core data models for Ortomat backups
//!
//! Records themselves are opaque JSON objects; this module holds what the
//! backup subsystem knows about them: the entity kinds, their relations, and
//! the roles that decide who may run a backup.

pub mod kind;
pub mod record;
pub mod role;

pub use kind::{EntityKind, ForeignKey, CREATED_AT_FIELD, CREDENTIAL_FIELD, ID_FIELD};
pub use record::{compare_by_field, has_value, record_id, str_field, Record};
pub use role::{Operator, Role};
