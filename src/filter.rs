// Filter state for querying records
//
// Five layers, each optional: search, predefined quick filter, advanced filters,
// quick filter dropdowns and per-column filters. A record is visible only if it
// satisfies every layer that carries a value.

use crate::dates::parse_date_ms;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Dropdown filters keyed by dimension name
pub type QuickFilters = BTreeMap<String, QuickValue>;

/// Free-text filters keyed by column name
pub type ColumnFilters = BTreeMap<String, String>;

/// All filter layers for one invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search_term: String,
    pub predefined_filter: PredefinedFilter,
    pub advanced_filters: AdvancedFilters,
    pub quick_filters: QuickFilters,
    pub column_filters: ColumnFilters,
}

impl FilterState {
    /// True when no layer constrains anything
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty()
            && self.predefined_filter == PredefinedFilter::All
            && self.advanced_filters.is_empty()
            && self.quick_filters.values().all(QuickValue::is_empty)
            && self.column_filters.values().all(|v| v.trim().is_empty())
    }
}

/// The single quick filter picked from the fixed preset list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PredefinedFilter {
    #[default]
    All,
    Overdue,
    HighPriority,
    /// Current user appears in an owner field
    MyAssigned,
    /// Current user created the record
    MyCreated,
    /// Either of the above
    MyAny,
    /// Status bucket, e.g. "active" or "on-hold"
    Status(String),
}

impl From<&str> for PredefinedFilter {
    fn from(s: &str) -> Self {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "" | "all" => PredefinedFilter::All,
            "overdue" => PredefinedFilter::Overdue,
            "high-priority" | "high_priority" | "highpriority" => PredefinedFilter::HighPriority,
            "my-tasks" | "my-assigned" => PredefinedFilter::MyAssigned,
            "my-created" => PredefinedFilter::MyCreated,
            k if k.starts_with("my-") => PredefinedFilter::MyAny,
            _ => PredefinedFilter::Status(s.trim().to_string()),
        }
    }
}

impl From<String> for PredefinedFilter {
    fn from(s: String) -> Self {
        PredefinedFilter::from(s.as_str())
    }
}

impl From<PredefinedFilter> for String {
    fn from(filter: PredefinedFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for PredefinedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredefinedFilter::All => write!(f, "all"),
            PredefinedFilter::Overdue => write!(f, "overdue"),
            PredefinedFilter::HighPriority => write!(f, "high-priority"),
            PredefinedFilter::MyAssigned => write!(f, "my-tasks"),
            PredefinedFilter::MyCreated => write!(f, "my-created"),
            PredefinedFilter::MyAny => write!(f, "my-projects"),
            PredefinedFilter::Status(s) => write!(f, "{}", s),
        }
    }
}

/// Structured filter panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedFilters {
    pub status: Vec<String>,
    pub priority: Vec<String>,
    #[serde(alias = "project")]
    pub company: Vec<String>,
    pub tags: Vec<String>,
    pub assignee: Vec<String>,
    pub date_range: Option<DateRange>,
    pub progress: Option<NumericRange>,
    pub estimate: Option<NumericRange>,
    pub flags: Vec<FilterFlag>,
}

impl AdvancedFilters {
    pub fn is_empty(&self) -> bool {
        [&self.status, &self.priority, &self.company, &self.tags, &self.assignee]
            .iter()
            .all(|values| accepted_values(values).is_none())
            && self.date_range.as_ref().is_none_or(DateRange::is_empty)
            && self.progress.as_ref().is_none_or(NumericRange::is_empty)
            && self.estimate.as_ref().is_none_or(NumericRange::is_empty)
            && self.flags.iter().all(|f| *f == FilterFlag::Unknown)
    }
}

/// Boolean conditions selectable in the advanced panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterFlag {
    #[serde(alias = "hasSubtasks")]
    HasTasks,
    #[serde(alias = "noSubtasks")]
    NoTasks,
    Overdue,
    NoAssignee,
    HasTags,
    HighPriority,
    Completed,
    /// Flags this engine does not know are ignored
    #[serde(other)]
    Unknown,
}

/// Inclusive date interval; either end may be open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    #[serde(alias = "start")]
    pub from: Option<String>,
    #[serde(alias = "end")]
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    /// Bounds in epoch milliseconds; unparseable ends count as open
    pub fn bounds_ms(&self) -> (Option<i64>, Option<i64>) {
        let parse = |s: &Option<String>| s.as_ref().and_then(|s| parse_date_ms(&Value::String(s.clone())));
        (parse(&self.from), parse(&self.to))
    }

    pub fn is_empty(&self) -> bool {
        self.bounds_ms() == (None, None)
    }
}

/// Inclusive numeric interval; either end may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Value of one quick filter dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuickValue {
    Text(String),
    List(Vec<String>),
    Range(DateRange),
}

impl QuickValue {
    /// Accepted values, or `None` when the dropdown means "no constraint"
    pub fn accepted(&self) -> Option<Vec<String>> {
        match self {
            QuickValue::Text(s) => accepted_values(std::slice::from_ref(s)),
            QuickValue::List(values) => accepted_values(values),
            QuickValue::Range(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            QuickValue::Range(range) => range.is_empty(),
            _ => self.accepted().is_none(),
        }
    }
}

impl From<&str> for QuickValue {
    fn from(s: &str) -> Self {
        QuickValue::Text(s.to_string())
    }
}

/// Trimmed, non-empty accepted values; an empty list or an `all` entry means no constraint
pub fn accepted_values(values: &[String]) -> Option<Vec<String>> {
    let accepted: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if accepted.is_empty() || accepted.iter().any(|v| v.eq_ignore_ascii_case("all")) {
        None
    } else {
        Some(accepted)
    }
}
