// Generic record type shared by tasks and projects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const ID_FIELDS: &[&str] = &["id", "_id"];
pub(crate) const DESCRIPTION_FIELDS: &[&str] = &["description"];
pub(crate) const TAG_FIELDS: &[&str] = &["tags", "labels"];
pub(crate) const STATUS_FIELDS: &[&str] = &["status"];
pub(crate) const PRIORITY_FIELDS: &[&str] = &["priority"];
pub(crate) const PROGRESS_FIELDS: &[&str] = &["progress", "progressPercent"];
pub(crate) const START_DATE_FIELDS: &[&str] = &["startDate", "start_date"];
pub(crate) const DUE_DATE_FIELDS: &[&str] = &["dueDate", "due_date", "endDate", "end_date", "deadline"];
pub(crate) const OWNER_FIELDS: &[&str] = &[
    "assignee",
    "assignedTo",
    "assigned_to",
    "assignedUsers",
    "assigned_users",
    "assignedTeams",
    "assigned_teams",
];
pub(crate) const CREATOR_FIELDS: &[&str] = &["createdBy", "created_by", "owner"];
pub(crate) const ESTIMATE_FIELDS: &[&str] = &["estimatedHours", "estimated_hours", "estimate"];
pub(crate) const CREATED_AT_FIELDS: &[&str] = &["createdAt", "created_at"];
pub(crate) const UPDATED_AT_FIELDS: &[&str] = &["updatedAt", "updated_at"];

/// A task or project as delivered by the remote store
///
/// The engine treats records as opaque field maps; every lookup goes through
/// alias lists so camelCase and snake_case payloads both work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from any JSON value; non-objects yield `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Field value, treating explicit `null` as missing
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// First non-null value among the given aliases
    pub fn first(&self, names: &[&str]) -> Option<&Value> {
        names.iter().find_map(|name| self.get(name))
    }

    /// Scalar text of the first non-null alias (strings as-is, numbers and bools stringified)
    pub fn text(&self, names: &[&str]) -> Option<String> {
        self.first(names).and_then(scalar_text)
    }

    /// Numeric value of the first non-null alias; numeric strings (optionally
    /// ending in `%`) are accepted
    pub fn number(&self, names: &[&str]) -> Option<f64> {
        let value = match self.first(names)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
            _ => None,
        };
        value.filter(|v: &f64| v.is_finite())
    }

    /// Record identifier from `id` or `_id`
    pub fn id(&self) -> Option<String> {
        self.text(ID_FIELDS)
    }

    pub fn status(&self) -> Option<String> {
        self.text(STATUS_FIELDS)
    }

    pub fn priority(&self) -> Option<String> {
        self.text(PRIORITY_FIELDS)
    }
}

/// Text of a JSON scalar; arrays, objects and null have none
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Which kind of entity a record set holds
///
/// Tasks and projects share one engine; the kind only selects field aliases
/// and the status rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Task,
    Project,
}

impl RecordKind {
    pub fn title_fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Task => &["title", "name"],
            RecordKind::Project => &["name", "title"],
        }
    }

    /// Fields naming the company (projects) or parent project (tasks)
    pub fn company_fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Task => &["projectName", "project", "project_name"],
            RecordKind::Project => &["company", "companyName", "company_name", "client"],
        }
    }

    /// Reference list holding sub-entities
    pub fn list_fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Task => &["subtasks", "subTasks", "sub_tasks"],
            RecordKind::Project => &["tasks"],
        }
    }

    /// Default free-text search fields
    pub fn search_fields(self) -> Vec<&'static str> {
        let mut fields = self.title_fields().to_vec();
        fields.extend_from_slice(DESCRIPTION_FIELDS);
        fields.extend_from_slice(self.company_fields());
        fields
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Task => write!(f, "task"),
            RecordKind::Project => write!(f, "project"),
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" | "tasks" => Ok(RecordKind::Task),
            "project" | "projects" => Ok(RecordKind::Project),
            other => Err(format!("unknown record kind: {}", other)),
        }
    }
}

/// The signed-in user, used by `my-*` predicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn is_empty(&self) -> bool {
        [&self.id, &self.name, &self.email]
            .iter()
            .all(|v| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}
