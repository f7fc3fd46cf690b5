//! Opaque record helpers
//!
//! Records are JSON objects whose shape belongs to the application; the
//! backup subsystem only reads ids, foreign keys and a few named fields.

use std::cmp::Ordering;

use chrono::DateTime;
use serde_json::Value;

use super::kind::ID_FIELD;

/// A single stored row
pub type Record = serde_json::Map<String, Value>;

/// Get the primary key of a record
pub fn record_id(record: &Record) -> Option<&str> {
    record
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Read a string field, treating JSON null as absent
pub fn str_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// Whether a field is present with a non-null value
pub fn has_value(record: &Record, field: &str) -> bool {
    record.get(field).map_or(false, |v| !v.is_null())
}

/// Compare two records by a field
///
/// RFC 3339 timestamps compare chronologically whatever their precision or
/// offset, other strings lexically, numbers numerically. Missing or null
/// values sort before anything else.
pub fn compare_by_field(a: &Record, b: &Record, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record_id(&rec(json!({"id": "m-1"}))), Some("m-1"));
        assert_eq!(record_id(&rec(json!({"id": ""}))), None);
        assert_eq!(record_id(&rec(json!({"id": 7}))), None);
        assert_eq!(record_id(&rec(json!({"name": "x"}))), None);
    }

    #[test]
    fn test_compare_timestamps() {
        let older = rec(json!({"createdAt": "2026-01-01T10:00:00.000Z"}));
        let newer = rec(json!({"createdAt": "2026-03-01T10:00:00.000Z"}));
        assert_eq!(compare_by_field(&older, &newer, "createdAt"), Ordering::Less);
    }

    #[test]
    fn test_compare_mixed_timestamp_formats() {
        let older = rec(json!({"createdAt": "2026-05-01T10:00:00Z"}));
        let newer = rec(json!({"createdAt": "2026-05-01T10:00:00.500Z"}));
        // 09:30 UTC, earlier than both despite the larger local hour
        let offset = rec(json!({"createdAt": "2026-05-01T11:30:00+02:00"}));

        assert_eq!(compare_by_field(&older, &newer, "createdAt"), Ordering::Less);
        assert_eq!(compare_by_field(&offset, &older, "createdAt"), Ordering::Less);
    }

    #[test]
    fn test_compare_missing_sorts_first() {
        let missing = rec(json!({}));
        let null = rec(json!({"createdAt": null}));
        let present = rec(json!({"createdAt": "2026-01-01T00:00:00Z"}));
        assert_eq!(compare_by_field(&missing, &present, "createdAt"), Ordering::Less);
        assert_eq!(compare_by_field(&present, &null, "createdAt"), Ordering::Greater);
        assert_eq!(compare_by_field(&missing, &null, "createdAt"), Ordering::Equal);
    }

    #[test]
    fn test_compare_numbers() {
        let a = rec(json!({"price": 9.5}));
        let b = rec(json!({"price": 12}));
        assert_eq!(compare_by_field(&a, &b, "price"), Ordering::Less);
    }

    #[test]
    fn test_has_value() {
        let record = rec(json!({"productId": null, "machineId": "m-1"}));
        assert!(!has_value(&record, "productId"));
        assert!(has_value(&record, "machineId"));
        assert!(!has_value(&record, "cellId"));
    }
}
