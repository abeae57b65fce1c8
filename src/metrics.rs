// Derived progress metrics and the per-record working set

use crate::config::EngineConfig;
use crate::normalize::{self, AuxIndex};
use crate::record::{PROGRESS_FIELDS, Record, RecordKind, TAG_FIELDS, scalar_text};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const COMPLETION_FLAGS: &[&str] = &["completed", "done", "isCompleted"];
const LABEL_FIELDS: &[&str] = &["status", "state", "label"];

/// Completion counts and percentage derived from a record's reference list
///
/// Never written back onto the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedMetrics {
    pub completed: usize,
    pub total: usize,
    /// Always within 0..=100
    pub progress_percent: u8,
}

/// Whether an entry of a reference list counts as done
///
/// Objects are done when a completion flag is `true` or a status/label field
/// holds a completion value. Bare identifiers are never done.
pub fn is_item_completed(item: &Value, config: &EngineConfig) -> bool {
    let Value::Object(map) = item else {
        return false;
    };

    let flagged = COMPLETION_FLAGS
        .iter()
        .any(|flag| matches!(map.get(*flag), Some(Value::Bool(true))));

    flagged
        || LABEL_FIELDS
            .iter()
            .filter_map(|field| map.get(*field).and_then(scalar_text))
            .any(|label| config.is_completion(&label))
}

/// Whether the record itself is in a completion-equivalent state
pub fn is_record_completed(record: &Record, config: &EngineConfig) -> bool {
    is_item_completed(&Value::Object(record.fields().clone()), config)
}

/// Compute completion counts and progress for a record
///
/// With an empty list the record stands in as its single implicit item; its
/// stored numeric progress wins when present and positive.
pub fn derive_progress(record: &Record, items: &[Value], config: &EngineConfig) -> DerivedMetrics {
    if items.is_empty() {
        let done = is_record_completed(record, config);
        let progress_percent = match record.number(PROGRESS_FIELDS) {
            Some(p) if p > 0.0 => clamp_percent(p),
            _ if done => 100,
            _ => 0,
        };
        return DerivedMetrics {
            completed: usize::from(done),
            total: 1,
            progress_percent,
        };
    }

    let total = items.len();
    let completed = items.iter().filter(|item| is_item_completed(item, config)).count();

    DerivedMetrics {
        completed,
        total,
        progress_percent: clamp_percent(completed as f64 / total as f64 * 100.0),
    }
}

fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// A record together with its normalized fields and derived metrics
///
/// Built once per record per pipeline run; filtering and ordering read from
/// here instead of re-parsing the raw fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub kind: RecordKind,
    pub record: Record,
    /// Tag labels in original order
    pub tags: Vec<String>,
    /// Lower-cased tags for matching
    pub tag_set: BTreeSet<String>,
    /// Reference list after identifier resolution
    pub references: Vec<Value>,
    pub metrics: DerivedMetrics,
}

impl ProcessedRecord {
    /// Record fields plus the derived display fields
    pub fn to_value(&self) -> Value {
        let mut fields: Map<String, Value> = self.record.fields().clone();
        fields.insert("progressPercent".to_string(), Value::from(self.metrics.progress_percent));
        fields.insert("completedCount".to_string(), Value::from(self.metrics.completed));
        fields.insert("totalCount".to_string(), Value::from(self.metrics.total));
        Value::Object(fields)
    }

    pub fn status(&self) -> Option<String> {
        self.record.status()
    }

    /// References left as bare identifiers after resolution
    pub fn unresolved_references(&self) -> impl Iterator<Item = &Value> {
        self.references
            .iter()
            .filter(|v| matches!(v, Value::String(_) | Value::Number(_)))
    }
}

impl Serialize for ProcessedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Normalize a record's fields and derive its metrics
pub fn prepare(record: &Record, kind: RecordKind, aux: Option<&AuxIndex>, config: &EngineConfig) -> ProcessedRecord {
    let tags = normalize::normalize_tags(record.first(TAG_FIELDS));
    let tag_set = normalize::tag_set(&tags);
    let items = normalize::normalize_list(record.first(kind.list_fields()));
    let references = normalize::resolve_references(items, aux);
    let metrics = derive_progress(record, &references, config);

    ProcessedRecord {
        kind,
        record: record.clone(),
        tags,
        tag_set,
        references,
        metrics,
    }
}
