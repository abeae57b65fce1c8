// Loading records and filter/sort state from files

use crate::dates::parse_date_ms;
use crate::filter::FilterState;
use crate::record::{Record, UPDATED_AT_FIELDS};
use crate::sort::SortState;
use eyre::{Context, Result, eyre};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Read records from a JSON array file or a JSONL file
///
/// JSONL lines that fail to parse, and values that are not objects, are
/// skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read records file {:?}", path))?;
    let records = parse_records(&content, path)?;

    info!(file = ?path, count = records.len(), "Loaded records");
    Ok(records)
}

fn parse_records(content: &str, path: &Path) -> Result<Vec<Record>> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(trimmed).with_context(|| format!("Failed to parse JSON array in {:?}", path))?;
        return Ok(values.into_iter().filter_map(|v| object_or_warn(v, path, None)).collect());
    }

    let mut records = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
                continue;
            }
        };

        records.extend(object_or_warn(value, path, Some(line_num + 1)));
    }

    Ok(records)
}

fn object_or_warn(value: Value, path: &Path, line: Option<usize>) -> Option<Record> {
    let record = Record::from_value(value);
    if record.is_none() {
        warn!(file = ?path, line, "Value is not an object, skipping");
    }
    record
}

/// Keep the newest version of each record id
///
/// Versions are compared by `updatedAt`/`updated_at`; a later duplicate with an
/// equal or missing timestamp does not replace the earlier one. Output keeps
/// the position where each id was first seen. Records without an id pass
/// through unchanged.
pub fn latest_by_id(records: Vec<Record>) -> Vec<Record> {
    let mut out: Vec<Record> = Vec::with_capacity(records.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(id) = record.id() else {
            out.push(record);
            continue;
        };

        match positions.get(&id) {
            Some(&pos) => {
                if updated_at(&record) > updated_at(&out[pos]) {
                    out[pos] = record;
                }
            }
            None => {
                positions.insert(id, out.len());
                out.push(record);
            }
        }
    }

    out
}

fn updated_at(record: &Record) -> i64 {
    record.first(UPDATED_AT_FIELDS).and_then(parse_date_ms).unwrap_or(0)
}

/// Read a filter state from a YAML or JSON file
pub fn read_filter_state(path: &Path) -> Result<FilterState> {
    read_state(path)
}

/// Read a sort state from a YAML or JSON file
pub fn read_sort_state(path: &Path) -> Result<SortState> {
    read_state(path)
}

fn read_state<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read state file {:?}", path))?;

    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
    match ext {
        "json" => serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON state {:?}", path)),
        "yaml" | "yml" | "" => {
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML state {:?}", path))
        }
        other => Err(eyre!("Unsupported state file extension: {} ({:?})", other, path)),
    }
}
