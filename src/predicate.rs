// Predicate evaluation over processed records
//
// A `FilterPlan` is built once per filter state: one layer per non-empty filter
// source, evaluated in order and combined with logical AND.

use crate::config::EngineConfig;
use crate::dates::parse_date_ms;
use crate::filter::{
    AdvancedFilters, FilterFlag, FilterState, NumericRange, PredefinedFilter, QuickFilters, QuickValue, accepted_values,
};
use crate::metrics::{ProcessedRecord, is_record_completed};
use crate::models::{Priority, status_key};
use crate::normalize::{normalize_list, normalize_list_str};
use crate::record::{
    CREATOR_FIELDS, DUE_DATE_FIELDS, ESTIMATE_FIELDS, Identity, OWNER_FIELDS, PRIORITY_FIELDS, START_DATE_FIELDS,
    STATUS_FIELDS, scalar_text,
};
use serde_json::Value;
use tracing::debug;

const IDENTITY_KEYS: &[&str] = &["id", "_id", "name", "email"];
const IDENTITY_DELIMITERS: &[char] = &[',', ';', '|'];

/// Inputs a predicate needs besides the record and the filter state
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub config: &'a EngineConfig,
    pub current_user: Option<&'a Identity>,
    pub now_ms: i64,
}

/// Dimension a quick or advanced filter constrains
#[derive(Debug, Clone, PartialEq, Eq)]
enum Dimension {
    Status,
    Priority,
    Company,
    Tags,
    Assignee,
    /// Any other record field, matched by case-insensitive equality
    Field(String),
}

impl Dimension {
    fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "status" => Dimension::Status,
            "priority" => Dimension::Priority,
            "company" | "companyname" | "project" | "projectname" | "client" => Dimension::Company,
            "tags" | "tag" | "labels" => Dimension::Tags,
            "assignee" | "assignees" | "assignedto" | "assignedusers" => Dimension::Assignee,
            _ => Dimension::Field(key.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    OneOf { dimension: Dimension, accepted: Vec<String> },
    DateOverlap { from: Option<i64>, to: Option<i64> },
    Progress(NumericRange),
    Estimate(NumericRange),
    Flag(FilterFlag),
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnMatch {
    /// Comma-separated accepted values, compared by status key
    OneOf(Vec<String>),
    /// Lower-cased substring
    Contains(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Layer {
    Search { term: String, fields: Option<Vec<String>> },
    Predefined(PredefinedFilter),
    Advanced(Vec<Constraint>),
    Quick(Vec<Constraint>),
    Columns(Vec<(String, ColumnMatch)>),
}

impl Layer {
    fn name(&self) -> &'static str {
        match self {
            Layer::Search { .. } => "search",
            Layer::Predefined(_) => "predefined",
            Layer::Advanced(_) => "advanced",
            Layer::Quick(_) => "quick",
            Layer::Columns(_) => "columns",
        }
    }

    fn matches(&self, p: &ProcessedRecord, ctx: &MatchContext<'_>) -> bool {
        match self {
            Layer::Search { term, fields } => matches_search(p, term, fields.as_deref()),
            Layer::Predefined(filter) => matches_predefined(p, filter, ctx),
            Layer::Advanced(constraints) | Layer::Quick(constraints) => {
                constraints.iter().all(|c| matches_constraint(p, c, ctx))
            }
            Layer::Columns(columns) => columns
                .iter()
                .all(|(column, wanted)| matches_column(p, column, wanted)),
        }
    }
}

/// Filter layers compiled from a `FilterState`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPlan {
    layers: Vec<Layer>,
}

impl FilterPlan {
    /// Compile the non-empty layers of a filter state, in evaluation order
    pub fn build(state: &FilterState, config: &EngineConfig) -> Self {
        let mut layers = Vec::new();

        let term = state.search_term.trim().to_lowercase();
        if !term.is_empty() {
            layers.push(Layer::Search {
                term,
                fields: config.search_fields.clone(),
            });
        }

        if state.predefined_filter != PredefinedFilter::All {
            layers.push(Layer::Predefined(state.predefined_filter.clone()));
        }

        let advanced = advanced_constraints(&state.advanced_filters);
        if !advanced.is_empty() {
            layers.push(Layer::Advanced(advanced));
        }

        let quick = quick_constraints(&state.quick_filters);
        if !quick.is_empty() {
            layers.push(Layer::Quick(quick));
        }

        let columns = column_matches(state, config);
        if !columns.is_empty() {
            layers.push(Layer::Columns(columns));
        }

        let plan = Self { layers };
        debug!(layers = ?plan.layer_names(), "Built filter plan");
        plan
    }

    /// Names of the active layers, in evaluation order
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(Layer::name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// True iff the record satisfies every active layer; stops at the first failure
    pub fn matches(&self, p: &ProcessedRecord, ctx: &MatchContext<'_>) -> bool {
        self.layers.iter().all(|layer| layer.matches(p, ctx))
    }
}

/// Evaluate a single record against a filter state
///
/// Builds a throwaway plan; use `FilterPlan` directly when checking many records.
pub fn matches(p: &ProcessedRecord, state: &FilterState, ctx: &MatchContext<'_>) -> bool {
    FilterPlan::build(state, ctx.config).matches(p, ctx)
}

fn advanced_constraints(filters: &AdvancedFilters) -> Vec<Constraint> {
    let mut constraints = Vec::new();

    let dimensions = [
        (Dimension::Status, &filters.status),
        (Dimension::Priority, &filters.priority),
        (Dimension::Company, &filters.company),
        (Dimension::Tags, &filters.tags),
        (Dimension::Assignee, &filters.assignee),
    ];
    for (dimension, values) in dimensions {
        if let Some(accepted) = accepted_values(values) {
            constraints.push(Constraint::OneOf { dimension, accepted });
        }
    }

    if let Some(range) = &filters.date_range {
        let (from, to) = range.bounds_ms();
        if from.is_some() || to.is_some() {
            constraints.push(Constraint::DateOverlap { from, to });
        }
    }
    if let Some(range) = filters.progress.filter(|r| !r.is_empty()) {
        constraints.push(Constraint::Progress(range));
    }
    if let Some(range) = filters.estimate.filter(|r| !r.is_empty()) {
        constraints.push(Constraint::Estimate(range));
    }

    constraints.extend(
        filters
            .flags
            .iter()
            .filter(|f| **f != FilterFlag::Unknown)
            .map(|f| Constraint::Flag(*f)),
    );

    constraints
}

fn quick_constraints(filters: &QuickFilters) -> Vec<Constraint> {
    filters
        .iter()
        .filter_map(|(key, value)| match value {
            QuickValue::Range(range) => {
                let (from, to) = range.bounds_ms();
                (from.is_some() || to.is_some()).then_some(Constraint::DateOverlap { from, to })
            }
            other => other.accepted().map(|accepted| Constraint::OneOf {
                dimension: Dimension::from_key(key),
                accepted,
            }),
        })
        .collect()
}

fn column_matches(state: &FilterState, config: &EngineConfig) -> Vec<(String, ColumnMatch)> {
    state
        .column_filters
        .iter()
        .filter_map(|(column, raw)| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            if config.is_enum_column(column) {
                let parts: Vec<String> = raw.split(',').map(str::to_string).collect();
                let accepted = accepted_values(&parts)?;
                Some((column.clone(), ColumnMatch::OneOf(accepted.iter().map(|v| status_key(v)).collect())))
            } else {
                Some((column.clone(), ColumnMatch::Contains(raw.to_lowercase())))
            }
        })
        .collect()
}

fn matches_search(p: &ProcessedRecord, term: &str, fields: Option<&[String]>) -> bool {
    let haystack = |field: &str| {
        p.record
            .get(field)
            .and_then(scalar_text)
            .is_some_and(|text| text.to_lowercase().contains(term))
    };

    match fields {
        Some(fields) => fields.iter().any(|f| haystack(f.as_str())),
        None => p.kind.search_fields().into_iter().any(haystack),
    }
}

fn matches_predefined(p: &ProcessedRecord, filter: &PredefinedFilter, ctx: &MatchContext<'_>) -> bool {
    match filter {
        PredefinedFilter::All => true,
        PredefinedFilter::Overdue => is_overdue(p, ctx.config, ctx.now_ms),
        PredefinedFilter::HighPriority => is_high_priority(p),
        PredefinedFilter::MyAssigned => identity_in_fields(p, OWNER_FIELDS, ctx.current_user),
        PredefinedFilter::MyCreated => identity_in_fields(p, CREATOR_FIELDS, ctx.current_user),
        PredefinedFilter::MyAny => {
            identity_in_fields(p, OWNER_FIELDS, ctx.current_user)
                || identity_in_fields(p, CREATOR_FIELDS, ctx.current_user)
        }
        PredefinedFilter::Status(bucket) => p
            .status()
            .is_some_and(|status| status_key(&status) == status_key(bucket)),
    }
}

fn matches_constraint(p: &ProcessedRecord, constraint: &Constraint, ctx: &MatchContext<'_>) -> bool {
    match constraint {
        Constraint::OneOf { dimension, accepted } => matches_dimension(p, dimension, accepted),
        Constraint::DateOverlap { from, to } => match record_interval(p) {
            Some((start, end)) => intervals_overlap(start, end, *from, *to),
            None => false,
        },
        Constraint::Progress(range) => range.contains(f64::from(p.metrics.progress_percent)),
        Constraint::Estimate(range) => p.record.number(ESTIMATE_FIELDS).is_some_and(|hours| range.contains(hours)),
        Constraint::Flag(flag) => matches_flag(p, *flag, ctx),
    }
}

fn matches_dimension(p: &ProcessedRecord, dimension: &Dimension, accepted: &[String]) -> bool {
    match dimension {
        Dimension::Status => enum_field_in(p, STATUS_FIELDS, accepted),
        Dimension::Priority => enum_field_in(p, PRIORITY_FIELDS, accepted),
        Dimension::Company => p
            .record
            .text(p.kind.company_fields())
            .is_some_and(|company| accepted.iter().any(|a| a.trim().eq_ignore_ascii_case(company.trim()))),
        // Any selected tag is enough
        Dimension::Tags => accepted.iter().any(|tag| p.tag_set.contains(&tag.to_lowercase())),
        Dimension::Assignee => OWNER_FIELDS
            .iter()
            .filter_map(|field| p.record.get(field))
            .any(|value| accepted.iter().any(|a| contains_identity_token(value, a))),
        Dimension::Field(name) => normalize_list(p.record.get(name))
            .iter()
            .filter_map(scalar_text)
            .any(|value| accepted.iter().any(|a| a.trim().eq_ignore_ascii_case(value.trim()))),
    }
}

fn enum_field_in(p: &ProcessedRecord, fields: &[&str], accepted: &[String]) -> bool {
    p.record.text(fields).is_some_and(|value| {
        let key = status_key(&value);
        accepted.iter().any(|a| status_key(a) == key)
    })
}

fn matches_flag(p: &ProcessedRecord, flag: FilterFlag, ctx: &MatchContext<'_>) -> bool {
    match flag {
        FilterFlag::HasTasks => !p.references.is_empty(),
        FilterFlag::NoTasks => p.references.is_empty(),
        FilterFlag::Overdue => is_overdue(p, ctx.config, ctx.now_ms),
        FilterFlag::NoAssignee => owner_tokens(p).is_empty(),
        FilterFlag::HasTags => !p.tags.is_empty(),
        FilterFlag::HighPriority => is_high_priority(p),
        FilterFlag::Completed => is_record_completed(&p.record, ctx.config),
        FilterFlag::Unknown => true,
    }
}

fn matches_column(p: &ProcessedRecord, column: &str, wanted: &ColumnMatch) -> bool {
    match wanted {
        ColumnMatch::OneOf(accepted) => {
            let key = status_key(&column_text(p, column));
            accepted.iter().any(|a| *a == key)
        }
        ColumnMatch::Contains(needle) => column_text(p, column).to_lowercase().contains(needle.as_str()),
    }
}

/// Display text of a column, as matched by column filters
pub fn column_text(p: &ProcessedRecord, column: &str) -> String {
    let key = column.trim().to_lowercase().replace(['_', '-', ' '], "");
    let text = |fields: &[&str]| p.record.text(fields).unwrap_or_default();

    match key.as_str() {
        "title" | "name" => text(p.kind.title_fields()),
        "status" => text(STATUS_FIELDS),
        "priority" => text(PRIORITY_FIELDS),
        "company" | "project" | "projectname" | "companyname" => text(p.kind.company_fields()),
        "tags" | "labels" => p.tags.join(", "),
        "progress" | "progresspercent" => p.metrics.progress_percent.to_string(),
        "assignee" | "assignees" | "owners" => owner_tokens(p).join(", "),
        "subtasks" | "tasks" | "totalcount" => p.metrics.total.to_string(),
        "completedcount" => p.metrics.completed.to_string(),
        "startdate" => text(START_DATE_FIELDS),
        "duedate" | "enddate" | "deadline" => text(DUE_DATE_FIELDS),
        _ => normalize_list(p.record.get(column.trim()))
            .iter()
            .filter_map(display_text)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => ["name", "title", "label", "id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar_text)),
        other => scalar_text(other),
    }
}

/// Past its due/end date and not in a completion-equivalent state
///
/// A record without a parseable due date is never overdue.
pub fn is_overdue(p: &ProcessedRecord, config: &EngineConfig, now_ms: i64) -> bool {
    let due = p.record.first(DUE_DATE_FIELDS).and_then(parse_date_ms);
    match due {
        Some(due) if due < now_ms => !is_record_completed(&p.record, config),
        _ => false,
    }
}

fn is_high_priority(p: &ProcessedRecord) -> bool {
    p.record
        .priority()
        .is_some_and(|priority| Priority::parse(&priority) == Priority::High)
}

/// The record's `[start, end]` interval; a missing end borrows the other
fn record_interval(p: &ProcessedRecord) -> Option<(i64, i64)> {
    let start = p.record.first(START_DATE_FIELDS).and_then(parse_date_ms);
    let end = p.record.first(DUE_DATE_FIELDS).and_then(parse_date_ms);
    match (start, end) {
        (Some(s), Some(e)) => Some((s.min(e), s.max(e))),
        (Some(s), None) => Some((s, s)),
        (None, Some(e)) => Some((e, e)),
        (None, None) => None,
    }
}

/// Inclusive overlap of `[start, end]` with `[from, to]`; open bounds are unbounded
pub fn intervals_overlap(start: i64, end: i64, from: Option<i64>, to: Option<i64>) -> bool {
    to.is_none_or(|to| start <= to) && from.is_none_or(|from| end >= from)
}

/// Identifiers, names and emails found in the owner fields
pub fn owner_tokens(p: &ProcessedRecord) -> Vec<String> {
    let mut tokens = Vec::new();
    for field in OWNER_FIELDS {
        for item in normalize_list(p.record.get(field)) {
            match &item {
                Value::Object(map) => tokens.extend(
                    IDENTITY_KEYS
                        .iter()
                        .filter_map(|key| map.get(*key).and_then(scalar_text)),
                ),
                other => tokens.extend(scalar_text(other)),
            }
        }
    }
    tokens.retain(|t| !t.trim().is_empty());
    tokens
}

fn identity_in_fields(p: &ProcessedRecord, fields: &[&str], user: Option<&Identity>) -> bool {
    let Some(user) = user else {
        return false;
    };
    fields
        .iter()
        .filter_map(|field| p.record.get(field))
        .any(|value| contains_identity(value, user))
}

struct IdentityTokens {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

impl IdentityTokens {
    fn new(user: &Identity) -> Self {
        let clean = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            id: clean(&user.id),
            name: clean(&user.name).map(|s| s.to_lowercase()),
            email: clean(&user.email).map(|s| s.to_lowercase()),
        }
    }

    fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.email.is_none()
    }

    fn equals(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return false;
        }
        let lower = candidate.to_lowercase();
        self.id.as_deref() == Some(candidate)
            || self.name.as_deref() == Some(lower.as_str())
            || self.email.as_deref() == Some(lower.as_str())
    }

    /// Name or email embedded in a composite string as a whole word
    fn contained_in(&self, composite: &str) -> bool {
        let lower = composite.to_lowercase();
        [&self.name, &self.email]
            .into_iter()
            .flatten()
            .any(|token| contains_word(&lower, token))
    }
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Loose membership of the user in a field that may be a scalar, a list or a delimited string
///
/// Checks scalar equality, list membership (including JSON-encoded and
/// delimited lists, and objects carrying `id`/`name`/`email`), then whole-word
/// containment of the name or email. Ids only ever match exactly.
pub fn contains_identity(value: &Value, user: &Identity) -> bool {
    let tokens = IdentityTokens::new(user);
    !tokens.is_empty() && identity_in(value, &tokens)
}

/// [`contains_identity`] for a single value that may be an id, a name or an email
pub fn contains_identity_token(value: &Value, token: &str) -> bool {
    let token = Some(token.to_string());
    let user = Identity {
        id: token.clone(),
        name: token.clone(),
        email: token,
    };
    contains_identity(value, &user)
}

fn identity_in(value: &Value, tokens: &IdentityTokens) -> bool {
    match value {
        Value::String(s) => {
            if tokens.equals(s) {
                return true;
            }
            let member = normalize_list_str(s).iter().any(|item| match item {
                Value::String(part) => part.split(IDENTITY_DELIMITERS).any(|p| tokens.equals(p)),
                other => identity_in(other, tokens),
            });
            member || tokens.contained_in(s)
        }
        Value::Number(n) => tokens.equals(&n.to_string()),
        Value::Array(items) => items.iter().any(|item| identity_in(item, tokens)),
        Value::Object(map) => IDENTITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .any(|v| identity_in(v, tokens)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AdvancedFilters, DateRange};
    use crate::metrics::prepare;
    use crate::record::{Record, RecordKind};
    use serde_json::json;

    const NOW: i64 = 1_718_000_000_000; // 2024-06-10

    fn task(value: Value) -> ProcessedRecord {
        prepare(&Record::from_value(value).unwrap(), RecordKind::Task, None, &EngineConfig::default())
    }

    fn project(value: Value) -> ProcessedRecord {
        prepare(&Record::from_value(value).unwrap(), RecordKind::Project, None, &EngineConfig::default())
    }

    fn user() -> Identity {
        Identity {
            id: Some("u1".to_string()),
            name: Some("Alice Smith".to_string()),
            email: Some("alice@example.com".to_string()),
        }
    }

    fn check(p: &ProcessedRecord, state: &FilterState, current_user: Option<&Identity>) -> bool {
        let config = EngineConfig::default();
        let ctx = MatchContext { config: &config, current_user, now_ms: NOW };
        matches(p, state, &ctx)
    }

    fn state(value: Value) -> FilterState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_state_matches_everything() {
        assert!(check(&task(json!({})), &FilterState::default(), None));
        assert!(FilterPlan::build(&FilterState::default(), &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let t = task(json!({"title": "Fix login", "description": "OAuth flow", "projectName": "Portal"}));
        assert!(check(&t, &state(json!({"searchTerm": "LOGIN"})), None));
        assert!(check(&t, &state(json!({"searchTerm": "oauth"})), None));
        assert!(check(&t, &state(json!({"searchTerm": "portal"})), None));
        assert!(!check(&t, &state(json!({"searchTerm": "billing"})), None));
        assert!(check(&t, &state(json!({"searchTerm": "   "})), None));
    }

    #[test]
    fn test_search_field_override() {
        let config = EngineConfig {
            search_fields: Some(vec!["code".to_string()]),
            ..Default::default()
        };
        let ctx = MatchContext { config: &config, current_user: None, now_ms: NOW };
        let t = task(json!({"title": "Fix login", "code": "ENG-42"}));
        assert!(matches(&t, &state(json!({"searchTerm": "eng-4"})), &ctx));
        assert!(!matches(&t, &state(json!({"searchTerm": "login"})), &ctx));
    }

    #[test]
    fn test_predefined_status_bucket() {
        let p = project(json!({"status": "On Hold"}));
        assert!(check(&p, &state(json!({"predefinedFilter": "on-hold"})), None));
        assert!(!check(&p, &state(json!({"predefinedFilter": "active"})), None));
    }

    #[test]
    fn test_overdue_definition() {
        let late = task(json!({"dueDate": "2024-01-01", "status": "In Progress"}));
        let late_done = task(json!({"dueDate": "2024-01-01", "status": "Completed"}));
        let future = task(json!({"dueDate": "2030-01-01", "status": "To Do"}));
        let undated = task(json!({"status": "Overdue"}));
        let filter = state(json!({"predefinedFilter": "overdue"}));

        assert!(check(&late, &filter, None));
        assert!(!check(&late_done, &filter, None));
        assert!(!check(&future, &filter, None));
        assert!(!check(&undated, &filter, None));
    }

    #[test]
    fn test_high_priority() {
        let filter = state(json!({"predefinedFilter": "high-priority"}));
        assert!(check(&task(json!({"priority": "HIGH"})), &filter, None));
        assert!(!check(&task(json!({"priority": "Medium"})), &filter, None));
        assert!(!check(&task(json!({})), &filter, None));
    }

    #[test]
    fn test_my_filters_need_identity() {
        let t = task(json!({"assignee": "u1"}));
        let filter = state(json!({"predefinedFilter": "my-tasks"}));
        assert!(check(&t, &filter, Some(&user())));
        assert!(!check(&t, &filter, None));
        assert!(!check(&t, &filter, Some(&Identity::default())));
    }

    #[test]
    fn test_my_created_and_my_any() {
        let t = task(json!({"createdBy": "alice@example.com", "assignee": "bob"}));
        assert!(check(&t, &state(json!({"predefinedFilter": "my-created"})), Some(&user())));
        assert!(!check(&t, &state(json!({"predefinedFilter": "my-tasks"})), Some(&user())));
        assert!(check(&t, &state(json!({"predefinedFilter": "my-projects"})), Some(&user())));
    }

    #[test]
    fn test_contains_identity_shapes() {
        let u = user();
        // exact scalar
        assert!(contains_identity(&json!("u1"), &u));
        assert!(contains_identity(&json!("ALICE SMITH"), &u));
        // list membership
        assert!(contains_identity(&json!(["u9", "u1"]), &u));
        assert!(contains_identity(&json!([{"id": "u1"}]), &u));
        assert!(contains_identity(&json!({"email": "alice@example.com"}), &u));
        // JSON-encoded and delimited lists
        assert!(contains_identity(&json!(r#"["u9","u1"]"#), &u));
        assert!(contains_identity(&json!("u9, u1"), &u));
        assert!(contains_identity(&json!("u9;u1|u3"), &u));
        // composite string
        assert!(contains_identity(&json!("Alice Smith <alice@example.com>"), &u));
        // ids never match by substring
        assert!(!contains_identity(&json!("u10"), &u));
        assert!(!contains_identity(&json!(null), &u));
    }

    #[test]
    fn test_contains_identity_numeric_id() {
        let u = Identity {
            id: Some("7".to_string()),
            ..Default::default()
        };
        assert!(contains_identity(&json!(7), &u));
        assert!(contains_identity(&json!([3, 7]), &u));
        assert!(!contains_identity(&json!(77), &u));
    }

    #[test]
    fn test_advanced_tags_any_of() {
        let f = state(json!({"advancedFilters": {"tags": ["b", "z"]}}));
        assert!(check(&project(json!({"tags": "a,b"})), &f, None));
        assert!(check(&project(json!({"tags": ["B"]})), &f, None));
        assert!(!check(&project(json!({"tags": "a"})), &f, None));
        assert!(!check(&project(json!({})), &f, None));
    }

    #[test]
    fn test_advanced_dimensions_and_across() {
        let f = state(json!({"advancedFilters": {"status": ["Active"], "priority": ["High", "Medium"]}}));
        assert!(check(&project(json!({"status": "active", "priority": "Medium"})), &f, None));
        assert!(!check(&project(json!({"status": "Active", "priority": "Low"})), &f, None));
        assert!(!check(&project(json!({"status": "Planning", "priority": "High"})), &f, None));
    }

    #[test]
    fn test_advanced_company_and_assignee() {
        let f = state(json!({"advancedFilters": {"company": ["Acme"], "assignee": ["bob"]}}));
        let p = project(json!({"company": "ACME", "assignedUsers": r#"["Bob", "carol"]"#}));
        assert!(check(&p, &f, None));
        let p = project(json!({"company": "Acme", "assignedTeams": [{"name": "Design"}]}));
        assert!(!check(&p, &f, None));
    }

    #[test]
    fn test_assignee_dimension_matches_like_my_tasks() {
        let delimited = task(json!({"assignedTo": "bob; u1"}));
        let composite = task(json!({"assignee": "Alice Smith (Design)"}));
        let lookalike = task(json!({"assignee": "u10, Alice Smithers"}));

        let my_tasks = state(json!({"predefinedFilter": "my-tasks"}));
        assert!(check(&delimited, &my_tasks, Some(&user())));
        assert!(check(&composite, &my_tasks, Some(&user())));

        let by_id = [
            state(json!({"advancedFilters": {"assignee": ["u1"]}})),
            state(json!({"quickFilters": {"assignee": "u1"}})),
        ];
        for f in &by_id {
            assert!(check(&delimited, f, None));
            assert!(!check(&lookalike, f, None));
        }

        let by_name = [
            state(json!({"advancedFilters": {"assignee": ["Alice Smith"]}})),
            state(json!({"quickFilters": {"assignee": ["alice smith"]}})),
        ];
        for f in &by_name {
            assert!(check(&composite, f, None));
            assert!(!check(&delimited, f, None));
            assert!(!check(&lookalike, f, None));
        }
    }

    #[test]
    fn test_advanced_numeric_ranges() {
        let f = state(json!({"advancedFilters": {"progress": {"min": 50}, "estimate": {"max": 8}}}));
        let t = task(json!({"subtasks": [{"completed": true}], "estimatedHours": "6"}));
        assert!(check(&t, &f, None));
        let t = task(json!({"subtasks": [{"completed": true}], "estimatedHours": 12}));
        assert!(!check(&t, &f, None));
        let t = task(json!({"subtasks": [{"completed": true}]}));
        assert!(!check(&t, &f, None));
    }

    #[test]
    fn test_flags() {
        let ctx_state = |flag: &str| state(json!({"advancedFilters": {"flags": [flag]}}));
        let with_tasks = project(json!({"tasks": ["t1"], "tags": "x", "assignee": "u1"}));
        let bare = project(json!({"tasks": "", "status": "Closed"}));

        assert!(check(&with_tasks, &ctx_state("hasTasks"), None));
        assert!(!check(&bare, &ctx_state("hasTasks"), None));
        assert!(check(&bare, &ctx_state("noTasks"), None));
        assert!(check(&bare, &ctx_state("noAssignee"), None));
        assert!(!check(&with_tasks, &ctx_state("noAssignee"), None));
        assert!(check(&with_tasks, &ctx_state("hasTags"), None));
        assert!(check(&bare, &ctx_state("completed"), None));
        // Unknown flags do not constrain
        assert!(check(&bare, &ctx_state("hasAttachments"), None));
    }

    #[test]
    fn test_date_range_overlap_law() {
        let day = 86_400_000;
        // interval [10, 20] in days
        assert!(intervals_overlap(10 * day, 20 * day, Some(20 * day), Some(30 * day)));
        assert!(intervals_overlap(10 * day, 20 * day, Some(0), Some(10 * day)));
        assert!(intervals_overlap(10 * day, 20 * day, Some(12 * day), Some(13 * day)));
        assert!(!intervals_overlap(10 * day, 20 * day, Some(21 * day), Some(30 * day)));
        assert!(!intervals_overlap(10 * day, 20 * day, Some(0), Some(9 * day)));
        assert!(intervals_overlap(10 * day, 20 * day, None, None));
    }

    #[test]
    fn test_date_range_filter_on_records() {
        let f = state(json!({"advancedFilters": {"dateRange": {"from": "2024-03-10", "to": "2024-03-20"}}}));
        let spanning = project(json!({"startDate": "2024-03-01", "endDate": "2024-04-01"}));
        let touching = project(json!({"startDate": "2024-03-20", "endDate": "2024-03-25"}));
        let before = project(json!({"startDate": "2024-02-01", "endDate": "2024-03-09"}));
        let due_only = project(json!({"dueDate": "2024-03-15"}));
        let undated = project(json!({}));

        assert!(check(&spanning, &f, None));
        assert!(check(&touching, &f, None));
        assert!(!check(&before, &f, None));
        assert!(check(&due_only, &f, None));
        assert!(!check(&undated, &f, None));
    }

    #[test]
    fn test_quick_filters_and_with_advanced() {
        let p = project(json!({"status": "Active", "priority": "High", "region": "EU"}));
        let both = state(json!({
            "advancedFilters": {"status": ["Active", "Planning"]},
            "quickFilters": {"status": "Planning"}
        }));
        assert!(!check(&p, &both, None));

        let quick = state(json!({"quickFilters": {"status": "all", "priority": ["High"], "region": "eu"}}));
        assert!(check(&p, &quick, None));

        let quick = state(json!({"quickFilters": {"region": ["US"]}}));
        assert!(!check(&p, &quick, None));
    }

    #[test]
    fn test_quick_date_range() {
        let p = task(json!({"dueDate": "2024-03-15"}));
        let inside = state(json!({"quickFilters": {"dueDate": {"from": "2024-03-01", "to": "2024-03-31"}}}));
        let outside = state(json!({"quickFilters": {"dueDate": {"from": "2024-04-01"}}}));
        assert!(check(&p, &inside, None));
        assert!(!check(&p, &outside, None));
    }

    #[test]
    fn test_column_filters() {
        let t = task(json!({
            "title": "Fix Login",
            "status": "In Progress",
            "tags": ["api", "auth"],
            "subtasks": ["a", "b"]
        }));
        assert!(check(&t, &state(json!({"columnFilters": {"title": "login"}})), None));
        assert!(check(&t, &state(json!({"columnFilters": {"status": "To Do, in progress"}})), None));
        assert!(!check(&t, &state(json!({"columnFilters": {"status": "Completed"}})), None));
        // enum columns need a whole-value match
        assert!(!check(&t, &state(json!({"columnFilters": {"status": "progress"}})), None));
        assert!(check(&t, &state(json!({"columnFilters": {"tags": "aut"}})), None));
        assert!(check(&t, &state(json!({"columnFilters": {"subtasks": "2"}})), None));
        assert!(check(&t, &state(json!({"columnFilters": {"title": ""}})), None));
    }

    #[test]
    fn test_plan_layer_order() {
        let s = state(json!({
            "searchTerm": "x",
            "predefinedFilter": "overdue",
            "advancedFilters": {"tags": ["a"]},
            "quickFilters": {"status": "Active"},
            "columnFilters": {"title": "y"}
        }));
        let plan = FilterPlan::build(&s, &EngineConfig::default());
        assert_eq!(plan.layer_names(), vec!["search", "predefined", "advanced", "quick", "columns"]);
    }

    #[test]
    fn test_and_composition() {
        let records = vec![
            project(json!({"name": "Alpha", "status": "Active", "tags": "a"})),
            project(json!({"name": "Beta", "status": "Active", "tags": "b"})),
            project(json!({"name": "Alpha two", "status": "Planning", "tags": "a"})),
        ];
        let l1 = state(json!({"searchTerm": "alpha"}));
        let l2 = state(json!({"advancedFilters": {"status": ["Active"]}}));
        let both = FilterState {
            advanced_filters: l2.advanced_filters.clone(),
            ..l1.clone()
        };
        for r in &records {
            assert_eq!(check(r, &both, None), check(r, &l1, None) && check(r, &l2, None));
        }
    }

    #[test]
    fn test_column_text_variants() {
        let t = task(json!({
            "title": "T",
            "assignee": [{"name": "Ann"}],
            "custom": ["x", {"label": "y"}]
        }));
        assert_eq!(column_text(&t, "assignee"), "Ann");
        assert_eq!(column_text(&t, "custom"), "x, y");
        assert_eq!(column_text(&t, "progress"), "0");
        assert_eq!(column_text(&t, "missing"), "");
    }

    #[test]
    fn test_date_range_struct_unused_bounds() {
        let f = AdvancedFilters {
            date_range: Some(DateRange::new(Some("nonsense"), None)),
            ..Default::default()
        };
        assert!(advanced_constraints(&f).is_empty());
    }
}
