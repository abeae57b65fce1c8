// Tiered normalization of semi-structured list and tag fields
//
// Each tier is total: a failed decode only hands the input to the next, less
// structured tier. Nothing here returns an error.

use crate::record::{Record, scalar_text};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

const WRAPPER_KEYS: &[&str] = &["items", "data"];
const TAG_LABEL_KEYS: &[&str] = &["name", "label", "value"];

/// Normalize a list field into a sequence
///
/// Tiers, most structured first:
/// 1. already an array: returned as-is
/// 2. a string holding a JSON array, or a JSON object with an `items`/`data` array
/// 3. comma-separated text, trimmed, empties dropped
///
/// Missing, null and boolean input yield an empty list. A bare number is a
/// single identifier.
pub fn normalize_list(raw: Option<&Value>) -> Vec<Value> {
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(_)) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => unwrap_items(map).unwrap_or_default(),
        Some(Value::Number(n)) => vec![Value::Number(n.clone())],
        Some(Value::String(s)) => normalize_list_str(s),
    }
}

/// String tiers of [`normalize_list`]
pub fn normalize_list_str(raw: &str) -> Vec<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => return items,
        Ok(Value::Object(map)) => {
            if let Some(items) = unwrap_items(&map) {
                return items;
            }
            debug!(raw = trimmed, "normalize_list: object without items, splitting on commas");
        }
        // A JSON-encoded string still carries the comma-separated payload
        Ok(Value::String(inner)) => return split_csv(&inner),
        Ok(_) => {}
        Err(e) => {
            debug!(raw = trimmed, error = %e, "normalize_list: not JSON, splitting on commas");
        }
    }

    split_csv(trimmed)
}

fn unwrap_items(map: &Map<String, Value>) -> Option<Vec<Value>> {
    WRAPPER_KEYS.iter().find_map(|key| match map.get(*key) {
        Some(Value::Array(items)) => Some(items.clone()),
        _ => None,
    })
}

fn split_csv(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| Value::String(part.to_string()))
        .collect()
}

/// Normalize a tag field into labels
///
/// Labels keep their first spelling and original order; case-insensitive
/// duplicates are dropped. Object entries contribute their `name`, `label` or
/// `value`.
pub fn normalize_tags(raw: Option<&Value>) -> Vec<String> {
    let mut seen = HashSet::new();
    normalize_list(raw)
        .iter()
        .filter_map(tag_label)
        .filter(|label| seen.insert(label.to_lowercase()))
        .collect()
}

fn tag_label(value: &Value) -> Option<String> {
    let label = match value {
        Value::Object(map) => TAG_LABEL_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar_text))?,
        other => scalar_text(other)?,
    };
    let label = label.trim();
    if label.is_empty() { None } else { Some(label.to_string()) }
}

/// Lower-cased tag set used for matching
pub fn tag_set(tags: &[String]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_lowercase()).collect()
}

/// Lookup of auxiliary records by id, used to resolve bare identifiers
#[derive(Debug, Clone, Default)]
pub struct AuxIndex {
    by_id: HashMap<String, Value>,
}

impl AuxIndex {
    /// Index records by id; records without an id are skipped and the first
    /// record wins on duplicate ids
    pub fn new(records: &[Record]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(id) = record.id() {
                by_id
                    .entry(id)
                    .or_insert_with(|| Value::Object(record.fields().clone()));
            }
        }
        debug!(count = by_id.len(), "Indexed auxiliary records");
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.by_id.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Replace bare identifiers with the auxiliary record they name
///
/// Unresolved identifiers stay in place unchanged, so callers can tell them
/// apart from resolved entries by checking for a string or number.
pub fn resolve_references(items: Vec<Value>, aux: Option<&AuxIndex>) -> Vec<Value> {
    let Some(aux) = aux.filter(|a| !a.is_empty()) else {
        return items;
    };

    items
        .into_iter()
        .map(|item| {
            let resolved = match &item {
                Value::String(_) | Value::Number(_) => {
                    scalar_text(&item).and_then(|id| aux.get(id.trim()).cloned())
                }
                _ => None,
            };
            resolved.unwrap_or(item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[Value]) -> Vec<String> {
        items.iter().filter_map(scalar_text).collect()
    }

    #[test]
    fn test_array_passes_through() {
        let raw = json!(["a", {"id": "t1"}]);
        assert_eq!(normalize_list(Some(&raw)), vec![json!("a"), json!({"id": "t1"})]);
    }

    #[test]
    fn test_json_array_string() {
        let raw = json!(r#"["t1", "t2"]"#);
        assert_eq!(strings(&normalize_list(Some(&raw))), vec!["t1", "t2"]);
    }

    #[test]
    fn test_json_wrapper_object_string() {
        let raw = json!(r#"{"items": [{"id": 1}]}"#);
        assert_eq!(normalize_list(Some(&raw)), vec![json!({"id": 1})]);

        let raw = json!(r#"{"data": ["x"]}"#);
        assert_eq!(normalize_list(Some(&raw)), vec![json!("x")]);
    }

    #[test]
    fn test_raw_wrapper_object() {
        let raw = json!({"items": ["a", "b"]});
        assert_eq!(strings(&normalize_list(Some(&raw))), vec!["a", "b"]);

        let raw = json!({"something": ["a"]});
        assert!(normalize_list(Some(&raw)).is_empty());
    }

    #[test]
    fn test_comma_fallback() {
        let raw = json!(" design, backend ,, qa ");
        assert_eq!(strings(&normalize_list(Some(&raw))), vec!["design", "backend", "qa"]);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let raw = json!(r#"["a", "b""#);
        assert_eq!(strings(&normalize_list(Some(&raw))), vec![r#"["a""#, r#""b""#]);
    }

    #[test]
    fn test_json_encoded_string_is_split() {
        let raw = json!(r#""a, b""#);
        assert_eq!(strings(&normalize_list(Some(&raw))), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(normalize_list(None).is_empty());
        assert!(normalize_list(Some(&json!(null))).is_empty());
        assert!(normalize_list(Some(&json!(""))).is_empty());
        assert!(normalize_list(Some(&json!("   "))).is_empty());
        assert!(normalize_list(Some(&json!(false))).is_empty());
        assert!(normalize_list(Some(&json!("[]"))).is_empty());
    }

    #[test]
    fn test_bare_number_is_single_identifier() {
        assert_eq!(normalize_list(Some(&json!(7))), vec![json!(7)]);
    }

    #[test]
    fn test_normalize_tags_shapes() {
        assert_eq!(normalize_tags(Some(&json!("a,b"))), vec!["a", "b"]);
        assert_eq!(normalize_tags(Some(&json!(["b"]))), vec!["b"]);
        assert_eq!(normalize_tags(Some(&json!(r#"["x", "y"]"#))), vec!["x", "y"]);
        assert_eq!(
            normalize_tags(Some(&json!([{"name": "ops"}, {"label": "web"}, 3, null, ""]))),
            vec!["ops", "web", "3"]
        );
    }

    #[test]
    fn test_normalize_tags_dedup_keeps_first_spelling() {
        assert_eq!(normalize_tags(Some(&json!(["Urgent", "urgent", " URGENT "]))), vec!["Urgent"]);
    }

    #[test]
    fn test_tag_set_lowercases() {
        let set = tag_set(&["Design".to_string(), "QA".to_string()]);
        assert!(set.contains("design"));
        assert!(set.contains("qa"));
    }

    #[test]
    fn test_resolve_references() {
        let aux = AuxIndex::new(&[
            Record::from_value(json!({"id": "t1", "status": "Done"})).unwrap(),
            Record::from_value(json!({"id": 5, "status": "Open"})).unwrap(),
        ]);
        let items = vec![json!("t1"), json!("t2"), json!(5), json!({"id": "t1", "title": "embedded"})];

        let resolved = resolve_references(items, Some(&aux));
        assert_eq!(resolved[0], json!({"id": "t1", "status": "Done"}));
        assert_eq!(resolved[1], json!("t2"));
        assert_eq!(resolved[2], json!({"id": 5, "status": "Open"}));
        assert_eq!(resolved[3], json!({"id": "t1", "title": "embedded"}));
    }

    #[test]
    fn test_resolve_without_aux_is_identity() {
        let items = vec![json!("t1")];
        assert_eq!(resolve_references(items.clone(), None), items);
    }

    #[test]
    fn test_aux_index_first_wins() {
        let aux = AuxIndex::new(&[
            Record::from_value(json!({"id": "a", "v": 1})).unwrap(),
            Record::from_value(json!({"id": "a", "v": 2})).unwrap(),
            Record::from_value(json!({"title": "no id"})).unwrap(),
        ]);
        assert!(!aux.is_empty());
        assert_eq!(aux.get("a"), Some(&json!({"id": "a", "v": 1})));
    }
}
