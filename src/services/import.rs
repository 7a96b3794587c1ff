//! Import of upstream query results
//!
//! Reads the material-activity and labor-ledger query results the CLI is
//! pointed at. A file holds either a bare JSON array or an object wrapping
//! the array under one of a few well-known keys. Each entry is deserialized
//! on its own: an entry with a badly typed field becomes a `MalformedRecord`
//! error for the validation policy to decide on, and the rest still load.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{SiteCostError, SiteCostResult};
use crate::models::{RawLaborEntry, RawMaterialActivity, RawMaterialLine};

/// Wrapper keys accepted around an activity array
pub const ACTIVITY_KEYS: [&str; 2] = ["activities", "data"];

/// Wrapper keys accepted around a labor array
pub const LABOR_KEYS: [&str; 4] = ["labor", "labour", "entries", "data"];

/// Records read from one input, with the entries that failed to deserialize
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRecords<T> {
    pub records: Vec<T>,
    /// `MalformedRecord` errors in file order
    pub malformed: Vec<SiteCostError>,
}

impl<T> ImportedRecords<T> {
    /// Total number of entries in the input
    pub fn len(&self) -> usize {
        self.records.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ImportedRecords<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            malformed: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for ImportedRecords<T> {
    fn from(records: Vec<T>) -> Self {
        Self {
            records,
            malformed: Vec::new(),
        }
    }
}

/// Parse material activities from JSON text
pub fn parse_activities(json: &str) -> SiteCostResult<ImportedRecords<RawMaterialActivity>> {
    parse_records(json, &ACTIVITY_KEYS, "activity", activity_field)
}

/// Parse labor entries from JSON text
pub fn parse_labor(json: &str) -> SiteCostResult<ImportedRecords<RawLaborEntry>> {
    parse_records(json, &LABOR_KEYS, "labor", offending_field::<RawLaborEntry>)
}

/// Read material activities from a file
pub fn read_activities(path: &Path) -> SiteCostResult<ImportedRecords<RawMaterialActivity>> {
    let imported = parse_activities(&read_file(path)?)?;
    debug!(
        path = %path.display(),
        count = imported.records.len(),
        malformed = imported.malformed.len(),
        "read activity records"
    );
    Ok(imported)
}

/// Read labor entries from a file
pub fn read_labor(path: &Path) -> SiteCostResult<ImportedRecords<RawLaborEntry>> {
    let imported = parse_labor(&read_file(path)?)?;
    debug!(
        path = %path.display(),
        count = imported.records.len(),
        malformed = imported.malformed.len(),
        "read labor records"
    );
    Ok(imported)
}

fn read_file(path: &Path) -> SiteCostResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        SiteCostError::Import(format!("Failed to read {}: {}", path.display(), e))
    })
}

fn parse_records<T: DeserializeOwned>(
    json: &str,
    keys: &[&str],
    what: &str,
    locate: fn(&Map<String, Value>) -> Option<String>,
) -> SiteCostResult<ImportedRecords<T>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SiteCostError::Import(format!("{} input is not valid JSON: {}", what, e)))?;

    let array = match value {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.into_iter().find(|(key, _)| keys.contains(&key.as_str())) {
            Some((_, Value::Array(entries))) => entries,
            Some((key, _)) => {
                return Err(SiteCostError::Import(format!(
                    "{} input key '{}' does not hold an array",
                    what, key
                )))
            }
            None => {
                return Err(SiteCostError::Import(format!(
                    "{} input object has none of the keys: {}",
                    what,
                    keys.join(", ")
                )))
            }
        },
        _ => {
            return Err(SiteCostError::Import(format!(
                "{} input must be a JSON array or object",
                what
            )))
        }
    };

    let mut imported = ImportedRecords::default();
    for (index, entry) in array.into_iter().enumerate() {
        match serde_json::from_value::<T>(entry.clone()) {
            Ok(record) => imported.records.push(record),
            Err(e) => {
                let err = malformed(what, index, &entry, e.to_string(), locate);
                warn!(record = err.record().unwrap_or("unknown"), "{}", err);
                imported.malformed.push(err);
            }
        }
    }
    Ok(imported)
}

/// Build the error for an entry that failed to deserialize
fn malformed(
    what: &str,
    index: usize,
    entry: &Value,
    reason: String,
    locate: fn(&Map<String, Value>) -> Option<String>,
) -> SiteCostError {
    let object = entry.as_object();
    let record = object
        .and_then(|map| map.get("_id").or_else(|| map.get("id")))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}[{}]", what, index));

    SiteCostError::MalformedRecord {
        record,
        field: object.and_then(locate),
        reason,
    }
}

/// First top-level key that fails to deserialize on its own
///
/// Every field of the raw records is optional, so a single-key object
/// deserializes unless that key's value has the wrong type.
fn offending_field<T: DeserializeOwned>(object: &Map<String, Value>) -> Option<String> {
    object.iter().find_map(|(key, value)| {
        let single: Map<String, Value> = std::iter::once((key.clone(), value.clone())).collect();
        serde_json::from_value::<T>(Value::Object(single))
            .err()
            .map(|_| key.clone())
    })
}

/// Like `offending_field`, descending into the material lines
fn activity_field(object: &Map<String, Value>) -> Option<String> {
    let field = offending_field::<RawMaterialActivity>(object)?;
    if field != "materials" {
        return Some(field);
    }
    let Some(Value::Array(lines)) = object.get("materials") else {
        return Some(field);
    };
    let line_field = lines.iter().enumerate().find_map(|(i, line)| match line {
        Value::Object(map) => offending_field::<RawMaterialLine>(map)
            .map(|inner| format!("materials[{}].{}", i, inner)),
        _ => Some(format!("materials[{}]", i)),
    });
    Some(line_field.unwrap_or(field))
}
