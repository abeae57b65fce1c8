// Ordering of processed records

use crate::config::EngineConfig;
use crate::dates::parse_date_ms;
use crate::metrics::ProcessedRecord;
use crate::models::{Priority, ProjectStatus, TaskStatus};
use crate::predicate::owner_tokens;
use crate::record::{
    CREATED_AT_FIELDS, DUE_DATE_FIELDS, ESTIMATE_FIELDS, RecordKind, START_DATE_FIELDS, UPDATED_AT_FIELDS,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Flip an ascending comparison for descending order
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// Sort toggle on a single table column; `None` means inactive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    pub column: String,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

/// Global sort plus per-column toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
    pub columns: Vec<ColumnSort>,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: "createdAt".to_string(),
            direction: SortDirection::Asc,
            columns: Vec::new(),
        }
    }
}

impl SortState {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        Self {
            field: field.to_string(),
            direction,
            columns: Vec::new(),
        }
    }

    /// Field and direction in effect
    ///
    /// The first column with an active direction overrides the global sort.
    /// Unknown field names fall back to the configured default field.
    pub fn effective(&self, config: &EngineConfig) -> (SortField, SortDirection) {
        let (name, direction) = self
            .columns
            .iter()
            .find_map(|c| c.direction.map(|d| (c.column.as_str(), d)))
            .unwrap_or((self.field.as_str(), self.direction));

        (SortField::resolve(name, config), direction)
    }
}

/// Sortable fields, each with its own comparison strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Status,
    Priority,
    Progress,
    StartDate,
    DueDate,
    CreatedAt,
    UpdatedAt,
    Estimate,
    TotalCount,
    CompletedCount,
    Assignee,
    Company,
    Id,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();

        let field = match key.as_str() {
            "title" | "name" => SortField::Title,
            "status" => SortField::Status,
            "priority" => SortField::Priority,
            "progress" | "progresspercent" => SortField::Progress,
            "startdate" | "start" => SortField::StartDate,
            "duedate" | "enddate" | "deadline" | "due" => SortField::DueDate,
            "createdat" | "created" => SortField::CreatedAt,
            "updatedat" | "updated" => SortField::UpdatedAt,
            "estimate" | "estimatedhours" => SortField::Estimate,
            "subtasks" | "tasks" | "totalcount" => SortField::TotalCount,
            "completedcount" => SortField::CompletedCount,
            "assignee" | "assignees" => SortField::Assignee,
            "company" | "project" | "projectname" | "companyname" => SortField::Company,
            "id" => SortField::Id,
            _ => return None,
        };
        Some(field)
    }

    /// Parse a field name, falling back to the configured default and then `CreatedAt`
    pub fn resolve(name: &str, config: &EngineConfig) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            debug!(field = name, fallback = %config.default_sort_field, "Unknown sort field, using default");
            Self::parse(&config.default_sort_field).unwrap_or(SortField::CreatedAt)
        })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortField::Title => "title",
            SortField::Status => "status",
            SortField::Priority => "priority",
            SortField::Progress => "progress",
            SortField::StartDate => "startDate",
            SortField::DueDate => "dueDate",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Estimate => "estimatedHours",
            SortField::TotalCount => "totalCount",
            SortField::CompletedCount => "completedCount",
            SortField::Assignee => "assignee",
            SortField::Company => "company",
            SortField::Id => "id",
        };
        write!(f, "{}", name)
    }
}

/// Compare two records on one field
///
/// Text is compared case-insensitively, dates as epoch milliseconds (missing
/// dates sort as 0), status and priority by rank, counts numerically. Equal
/// keys compare `Equal`; callers rely on a stable sort to keep their order.
pub fn compare(a: &ProcessedRecord, b: &ProcessedRecord, field: SortField, direction: SortDirection) -> Ordering {
    let ordering = match field {
        SortField::Title => text_key(a, a.kind.title_fields()).cmp(&text_key(b, b.kind.title_fields())),
        SortField::Company => text_key(a, a.kind.company_fields()).cmp(&text_key(b, b.kind.company_fields())),
        SortField::Status => status_rank(a).cmp(&status_rank(b)),
        SortField::Priority => priority_rank(a).cmp(&priority_rank(b)),
        SortField::Progress => a.metrics.progress_percent.cmp(&b.metrics.progress_percent),
        SortField::StartDate => date_key(a, START_DATE_FIELDS).cmp(&date_key(b, START_DATE_FIELDS)),
        SortField::DueDate => date_key(a, DUE_DATE_FIELDS).cmp(&date_key(b, DUE_DATE_FIELDS)),
        SortField::CreatedAt => date_key(a, CREATED_AT_FIELDS).cmp(&date_key(b, CREATED_AT_FIELDS)),
        SortField::UpdatedAt => date_key(a, UPDATED_AT_FIELDS).cmp(&date_key(b, UPDATED_AT_FIELDS)),
        SortField::Estimate => estimate_key(a).total_cmp(&estimate_key(b)),
        SortField::TotalCount => a.metrics.total.cmp(&b.metrics.total),
        SortField::CompletedCount => a.metrics.completed.cmp(&b.metrics.completed),
        SortField::Assignee => assignee_key(a).cmp(&assignee_key(b)),
        SortField::Id => compare_ids(a, b),
    };

    direction.apply(ordering)
}

/// Stable in-place sort by the effective field and direction
pub fn sort_records(records: &mut [ProcessedRecord], sort: &SortState, config: &EngineConfig) {
    let (field, direction) = sort.effective(config);
    debug!(%field, ?direction, count = records.len(), "Sorting records");
    records.sort_by(|a, b| compare(a, b, field, direction));
}

fn text_key(p: &ProcessedRecord, fields: &[&str]) -> String {
    p.record.text(fields).unwrap_or_default().to_lowercase()
}

fn date_key(p: &ProcessedRecord, fields: &[&str]) -> i64 {
    p.record.first(fields).and_then(parse_date_ms).unwrap_or(0)
}

fn estimate_key(p: &ProcessedRecord) -> f64 {
    p.record.number(ESTIMATE_FIELDS).unwrap_or(0.0)
}

fn assignee_key(p: &ProcessedRecord) -> String {
    owner_tokens(p).join(", ").to_lowercase()
}

/// Rank of the record's status within its kind's table
pub fn status_rank(p: &ProcessedRecord) -> u8 {
    let status = p.status().unwrap_or_default();
    match p.kind {
        RecordKind::Task => TaskStatus::parse(&status).rank(),
        RecordKind::Project => ProjectStatus::parse(&status).rank(),
    }
}

pub fn priority_rank(p: &ProcessedRecord) -> u8 {
    Priority::parse(&p.record.priority().unwrap_or_default()).rank()
}

/// Numeric ids compare numerically, anything else lexically
fn compare_ids(a: &ProcessedRecord, b: &ProcessedRecord) -> Ordering {
    let a_id = a.record.id().unwrap_or_default();
    let b_id = b.record.id().unwrap_or_default();
    match (a_id.parse::<i64>(), b_id.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a_id.to_lowercase().cmp(&b_id.to_lowercase()),
    }
}
