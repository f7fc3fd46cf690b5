//! Snapshot document format
//!
//! A snapshot is the only wire/file format of the backup subsystem:
//!
//! ```json
//! { "timestamp": "2026-10-18T09:30:12.345Z",
//!   "version": "1.0",
//!   "data": { "accounts": [...], "machines": [...], ... } }
//! ```
//!
//! Documents handed to a restore are untrusted, so [`Snapshot::from_value`]
//! checks the whole shape before anything destructive happens.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OrtomatError, OrtomatResult};
use crate::models::{has_value, record_id, EntityKind, Record};

/// Version written by this build
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Versions this build can restore
pub const SUPPORTED_VERSIONS: &[&str] = &[SNAPSHOT_VERSION];

/// Records of each entity kind carried by a snapshot
///
/// A kind missing from the bundle was not part of the backup, which is
/// different from a kind present with no rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityBundle {
    kinds: BTreeMap<EntityKind, Vec<Record>>,
}

impl EntityBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, records: Vec<Record>) {
        self.kinds.insert(kind, records);
    }

    pub fn get(&self, kind: EntityKind) -> Option<&[Record]> {
        self.kinds.get(&kind).map(Vec::as_slice)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    /// Kinds present in the bundle, in insertion order
    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.kinds.keys().copied()
    }

    pub fn total_records(&self) -> usize {
        self.kinds.values().map(Vec::len).sum()
    }
}

/// A point-in-time export of every entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the export started
    pub timestamp: DateTime<Utc>,
    /// Format version tag
    pub version: String,
    pub data: EntityBundle,
}

impl Snapshot {
    /// Create an empty snapshot stamped with the current version
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            version: SNAPSHOT_VERSION.to_string(),
            data: EntityBundle::new(),
        }
    }

    /// Parse a snapshot document from JSON text
    pub fn from_json(contents: &str) -> OrtomatResult<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| OrtomatError::Format(format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Validate an untrusted document and convert it into a snapshot
    pub fn from_value(value: Value) -> OrtomatResult<Self> {
        let Value::Object(mut document) = value else {
            return Err(OrtomatError::Format(
                "backup document must be a JSON object".into(),
            ));
        };

        let data = match document.remove("data") {
            None | Some(Value::Null) => {
                return Err(OrtomatError::Format("missing data field".into()));
            }
            Some(Value::Object(data)) => data,
            Some(_) => return Err(OrtomatError::Format("data must be an object".into())),
        };

        let version = match document.get("version") {
            Some(Value::String(version)) => version.clone(),
            Some(_) => return Err(OrtomatError::Format("version must be a string".into())),
            None => return Err(OrtomatError::Format("missing version field".into())),
        };
        if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
            return Err(OrtomatError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.join(", "),
            });
        }

        let timestamp = document
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| OrtomatError::Format("missing timestamp field".into()))?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| OrtomatError::Format(format!("invalid timestamp '{}': {}", timestamp, e)))?
            .with_timezone(&Utc);

        let mut bundle = EntityBundle::new();
        for (key, value) in data {
            let kind = EntityKind::from_key(&key)
                .ok_or_else(|| OrtomatError::Format(format!("unknown entity kind '{}'", key)))?;
            if value.is_null() {
                continue;
            }
            bundle.insert(kind, validate_records(kind, value)?);
        }

        Ok(Self {
            timestamp,
            version,
            data: bundle,
        })
    }

    /// Records per kind present in the snapshot, in insertion order
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        self.data
            .kinds()
            .map(|kind| (kind, self.data.get(kind).map_or(0, <[Record]>::len)))
            .collect()
    }

    /// Suggested file name for this snapshot
    pub fn filename(&self) -> String {
        backup_filename(self.timestamp)
    }
}

/// File name embedding the export time, with ':' and '.' made filesystem-safe
///
/// e.g. `backup-2026-10-18T09-30-12-345Z.json`
pub fn backup_filename(timestamp: DateTime<Utc>) -> String {
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("backup-{}.json", stamp)
}

fn validate_records(kind: EntityKind, value: Value) -> OrtomatResult<Vec<Record>> {
    let Value::Array(items) = value else {
        return Err(OrtomatError::Format(format!("{} must be an array", kind)));
    };

    if kind.is_singleton() && items.len() > 1 {
        return Err(OrtomatError::Format(format!(
            "{} holds {} records, at most one is allowed",
            kind,
            items.len()
        )));
    }

    let mut ids = HashSet::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(record) = item else {
            return Err(OrtomatError::Format(format!(
                "{}[{}] must be an object",
                kind, index
            )));
        };

        let id = record_id(&record).ok_or_else(|| {
            OrtomatError::Format(format!("{}[{}] has no string id", kind, index))
        })?;
        if !ids.insert(id.to_string()) {
            return Err(OrtomatError::Format(format!(
                "{} contains duplicate id '{}'",
                kind, id
            )));
        }

        let required = kind
            .required_fields()
            .iter()
            .copied()
            .chain(kind.foreign_keys().iter().filter(|fk| !fk.optional).map(|fk| fk.field));
        for field in required {
            if !has_value(&record, field) {
                return Err(OrtomatError::Format(format!(
                    "{}[{}] is missing {}",
                    kind, index, field
                )));
            }
        }

        records.push(record);
    }

    Ok(records)
}
