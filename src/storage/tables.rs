//! In-memory table set with integrity checks
//!
//! Holds the rows of every kind and enforces primary keys, foreign keys and
//! the settings singleton on each write. Both the live store and a staged
//! transaction operate on a `Tables` value.

use std::collections::{BTreeMap, HashSet};

use crate::error::{OrtomatError, OrtomatResult};
use crate::models::{compare_by_field, has_value, record_id, str_field, EntityKind, Record};

/// Sort direction for [`OrderBy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Field ordering for `find_all`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Options for `find_all`; the default returns every row in natural order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl FindOptions {
    /// Every row, in insertion order
    pub fn all() -> Self {
        Self::default()
    }

    /// At most `limit` rows, latest `field` first
    pub fn newest_first(field: impl Into<String>, limit: usize) -> Self {
        Self {
            order_by: Some(OrderBy {
                field: field.into(),
                direction: SortDirection::Descending,
            }),
            limit: Some(limit),
        }
    }
}

/// Rows of every entity kind
#[derive(Debug, Clone, Default)]
pub struct Tables {
    rows: BTreeMap<EntityKind, Vec<Record>>,
}

impl Tables {
    /// Build tables from already-persisted rows without re-checking them
    pub(crate) fn from_rows(rows: BTreeMap<EntityKind, Vec<Record>>) -> Self {
        Self { rows }
    }

    /// Rows of a kind in natural order
    pub fn rows(&self, kind: EntityKind) -> &[Record] {
        self.rows.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.rows(kind).len()
    }

    pub fn find_all(&self, kind: EntityKind, options: &FindOptions) -> Vec<Record> {
        let mut rows = self.rows(kind).to_vec();

        if let Some(order) = &options.order_by {
            // Stable sort keeps natural order among equal keys
            rows.sort_by(|a, b| {
                let ordering = compare_by_field(a, b, &order.field);
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = options.limit {
            rows.truncate(limit);
        }

        rows
    }

    /// Remove every row of a kind
    ///
    /// Fails while another kind still holds rows referencing this one.
    pub fn delete_all(&mut self, kind: EntityKind) -> OrtomatResult<usize> {
        for (child, fk) in kind.dependents() {
            let referencing = self
                .rows(child)
                .iter()
                .filter(|r| has_value(r, fk.field))
                .count();
            if referencing > 0 {
                return Err(OrtomatError::constraint(
                    kind,
                    format!(
                        "cannot delete: {} {} row(s) still reference it via {}",
                        referencing, child, fk.field
                    ),
                ));
            }
        }

        Ok(self.rows.remove(&kind).map_or(0, |rows| rows.len()))
    }

    /// Append rows to a kind after checking every constraint
    ///
    /// The batch is all-or-nothing: nothing is inserted if any row fails.
    pub fn create_many(&mut self, kind: EntityKind, records: Vec<Record>) -> OrtomatResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        if kind.is_singleton() && self.count(kind) + records.len() > 1 {
            return Err(OrtomatError::constraint(
                kind,
                "only one settings record may exist",
            ));
        }

        let mut ids: HashSet<String> = self
            .rows(kind)
            .iter()
            .filter_map(|r| record_id(r).map(str::to_string))
            .collect();

        // Parent ids are collected once per batch, not once per row
        let parent_ids: BTreeMap<EntityKind, HashSet<&str>> = kind
            .foreign_keys()
            .iter()
            .map(|fk| {
                let parent_rows: HashSet<&str> =
                    self.rows(fk.parent).iter().filter_map(record_id).collect();
                (fk.parent, parent_rows)
            })
            .collect();

        for (index, record) in records.iter().enumerate() {
            let id = record_id(record).ok_or_else(|| {
                OrtomatError::constraint(kind, format!("row {} has no string id", index))
            })?;

            if !ids.insert(id.to_string()) {
                return Err(OrtomatError::constraint(
                    kind,
                    format!("duplicate id '{}'", id),
                ));
            }

            if let Some(field) = kind.required_fields().iter().find(|f| !has_value(record, f)) {
                return Err(OrtomatError::constraint(
                    kind,
                    format!("row '{}' is missing required {}", id, field),
                ));
            }

            check_foreign_keys(kind, id, record, &parent_ids)?;
        }

        let count = records.len();
        self.rows.entry(kind).or_default().extend(records);
        Ok(count)
    }
}

fn check_foreign_keys(
    kind: EntityKind,
    id: &str,
    record: &Record,
    parent_ids: &BTreeMap<EntityKind, HashSet<&str>>,
) -> OrtomatResult<()> {
    for fk in kind.foreign_keys() {
        if !has_value(record, fk.field) {
            if fk.optional {
                continue;
            }
            return Err(OrtomatError::constraint(
                kind,
                format!("row '{}' is missing required {}", id, fk.field),
            ));
        }

        let parent_id = str_field(record, fk.field).ok_or_else(|| {
            OrtomatError::constraint(
                kind,
                format!("row '{}' has a non-string {}", id, fk.field),
            )
        })?;

        let known = parent_ids
            .get(&fk.parent)
            .map_or(false, |ids| ids.contains(parent_id));
        if !known {
            return Err(OrtomatError::constraint(
                kind,
                format!(
                    "row '{}' references missing {} '{}' via {}",
                    id, fk.parent, parent_id, fk.field
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rec(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn seeded() -> Tables {
        let mut tables = Tables::default();
        tables
            .create_many(EntityKind::Machines, vec![rec(json!({"id": "m-1"}))])
            .unwrap();
        tables
            .create_many(EntityKind::Products, vec![rec(json!({"id": "p-1"}))])
            .unwrap();
        tables
            .create_many(
                EntityKind::Cells,
                vec![rec(json!({"id": "c-1", "machineId": "m-1", "productId": "p-1"}))],
            )
            .unwrap();
        tables
    }

    #[test]
    fn test_create_and_find() {
        let tables = seeded();
        let cells = tables.find_all(EntityKind::Cells, &FindOptions::all());
        assert_eq!(cells.len(), 1);
        assert_eq!(record_id(&cells[0]), Some("c-1"));
    }

    #[test]
    fn test_missing_parent_rejected() {
        let mut tables = seeded();
        let err = tables
            .create_many(
                EntityKind::Cells,
                vec![rec(json!({"id": "c-2", "machineId": "m-404"}))],
            )
            .unwrap_err();
        assert!(err.to_string().contains("m-404"));
        assert_eq!(tables.count(EntityKind::Cells), 1);
    }

    #[test]
    fn test_optional_foreign_key_may_be_null() {
        let mut tables = seeded();
        let inserted = tables
            .create_many(
                EntityKind::Cells,
                vec![rec(json!({"id": "c-2", "machineId": "m-1", "productId": null}))],
            )
            .unwrap();
        assert_eq!(inserted, 1);
    }

    #[test]
    fn test_required_foreign_key_enforced() {
        let mut tables = seeded();
        let err = tables
            .create_many(EntityKind::Cells, vec![rec(json!({"id": "c-2"}))])
            .unwrap_err();
        assert!(err.to_string().contains("missing required machineId"));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut tables = Tables::default();
        let err = tables.create_many(
            EntityKind::Machines,
            vec![rec(json!({"id": "m-1"})), rec(json!({"id": "m-1"}))],
        );
        assert!(err.is_err());
        assert_eq!(tables.count(EntityKind::Machines), 0);
    }

    #[test]
    fn test_delete_parent_before_child_fails() {
        let mut tables = seeded();
        let err = tables.delete_all(EntityKind::Machines).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(tables.count(EntityKind::Machines), 1);

        assert_eq!(tables.delete_all(EntityKind::Cells).unwrap(), 1);
        assert_eq!(tables.delete_all(EntityKind::Machines).unwrap(), 1);
    }

    #[test]
    fn test_settings_singleton() {
        let mut tables = Tables::default();
        tables
            .create_many(EntityKind::Settings, vec![rec(json!({"id": "global"}))])
            .unwrap();
        let err = tables
            .create_many(EntityKind::Settings, vec![rec(json!({"id": "second"}))])
            .unwrap_err();
        assert!(err.to_string().contains("only one settings record"));
    }

    #[test]
    fn test_newest_first_with_limit() {
        let mut tables = Tables::default();
        let logs = (0..5)
            .map(|i| rec(json!({"id": format!("l-{}", i), "createdAt": format!("2026-01-0{}T00:00:00Z", i + 1)})))
            .collect();
        tables.create_many(EntityKind::ActivityLogs, logs).unwrap();

        let found = tables.find_all(
            EntityKind::ActivityLogs,
            &FindOptions::newest_first("createdAt", 3),
        );
        let ids: Vec<_> = found.iter().filter_map(record_id).collect();
        assert_eq!(ids, vec!["l-4", "l-3", "l-2"]);
    }

    #[test]
    fn test_account_without_required_fields_rejected() {
        let mut tables = Tables::default();
        let err = tables
            .create_many(
                EntityKind::Accounts,
                vec![rec(json!({"id": "u-1", "phone": "+380", "role": "DOCTOR"}))],
            )
            .unwrap_err();
        assert!(err.to_string().contains("missing required email"));
        assert_eq!(tables.count(EntityKind::Accounts), 0);

        let err = tables
            .create_many(
                EntityKind::Accounts,
                vec![rec(json!({"id": "u-1", "email": "a@x.com", "role": null}))],
            )
            .unwrap_err();
        assert!(err.to_string().contains("missing required role"));
    }

    #[test]
    fn test_large_batches_with_foreign_keys() {
        let mut tables = Tables::default();
        tables
            .create_many(EntityKind::Machines, vec![rec(json!({"id": "m-1"}))])
            .unwrap();

        let payments: Vec<Record> = (0..20_000)
            .map(|i| rec(json!({"id": format!("pay-{}", i), "machineId": "m-1"})))
            .collect();
        assert_eq!(tables.create_many(EntityKind::Payments, payments).unwrap(), 20_000);

        let sales: Vec<Record> = (0..20_000)
            .map(|i| rec(json!({"id": format!("s-{}", i), "paymentId": format!("pay-{}", i)})))
            .collect();
        let started = std::time::Instant::now();
        assert_eq!(tables.create_many(EntityKind::Sales, sales).unwrap(), 20_000);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        let orphan = rec(json!({"id": "s-orphan", "paymentId": "pay-20000"}));
        assert!(tables.create_many(EntityKind::Sales, vec![orphan]).is_err());
    }

    #[test]
    fn test_newest_first_across_timestamp_formats() {
        let mut tables = Tables::default();
        let logs = vec![
            rec(json!({"id": "older", "createdAt": "2026-05-01T10:00:00Z"})),
            rec(json!({"id": "newer", "createdAt": "2026-05-01T10:00:00.500Z"})),
            rec(json!({"id": "newest_offset", "createdAt": "2026-05-01T12:30:00+02:00"})),
        ];
        tables.create_many(EntityKind::ActivityLogs, logs).unwrap();

        let found = tables.find_all(
            EntityKind::ActivityLogs,
            &FindOptions::newest_first("createdAt", 2),
        );
        let ids: Vec<_> = found.iter().filter_map(record_id).collect();
        assert_eq!(ids, vec!["newest_offset", "newer"]);
    }
}
