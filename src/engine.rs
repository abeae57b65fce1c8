// Record pipeline: normalize, derive, filter, order

use crate::config::EngineConfig;
use crate::dates::now_ms;
use crate::filter::FilterState;
use crate::metrics::{ProcessedRecord, prepare};
use crate::normalize::AuxIndex;
use crate::predicate::{FilterPlan, MatchContext};
use crate::record::{Identity, Record, RecordKind};
use crate::sort::{SortState, sort_records};
use tracing::debug;

/// Filter/sort engine for one kind of record
///
/// Holds everything that stays fixed across invocations: the record kind,
/// configuration, the current user, the auxiliary records used to resolve
/// bare identifiers, and the clock. `process` is a pure function of its
/// arguments and this state.
#[derive(Debug, Clone)]
pub struct Engine {
    kind: RecordKind,
    config: EngineConfig,
    current_user: Option<Identity>,
    aux: Option<AuxIndex>,
    now_ms: Option<i64>,
}

impl Engine {
    /// Create an engine with default configuration
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            config: EngineConfig::default(),
            current_user: None,
            aux: None,
            now_ms: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the user that `my-*` filters match against; an empty identity is ignored
    pub fn with_current_user(mut self, user: Identity) -> Self {
        self.current_user = (!user.is_empty()).then_some(user);
        self
    }

    /// Records used to resolve bare identifiers inside reference lists
    pub fn with_auxiliary(mut self, records: &[Record]) -> Self {
        self.aux = Some(AuxIndex::new(records));
        self
    }

    /// Pin "now" (epoch ms) used by overdue checks; defaults to the wall clock
    pub fn with_now(mut self, now_ms: i64) -> Self {
        self.now_ms = Some(now_ms);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Normalize a record and derive its metrics without filtering
    pub fn prepare(&self, record: &Record) -> ProcessedRecord {
        prepare(record, self.kind, self.aux.as_ref(), &self.config)
    }

    /// Run the full pipeline
    ///
    /// Returns the records that pass every active filter layer, in the order
    /// given by the sort state, each carrying its derived metrics.
    pub fn process(&self, records: &[Record], filter: &FilterState, sort: &SortState) -> Vec<ProcessedRecord> {
        let plan = FilterPlan::build(filter, &self.config);
        let ctx = MatchContext {
            config: &self.config,
            current_user: self.current_user.as_ref(),
            now_ms: self.now_ms.unwrap_or_else(now_ms),
        };

        let mut visible: Vec<ProcessedRecord> = records
            .iter()
            .map(|record| self.prepare(record))
            .filter(|p| plan.matches(p, &ctx))
            .collect();

        sort_records(&mut visible, sort, &self.config);

        debug!(
            kind = %self.kind,
            total = records.len(),
            visible = visible.len(),
            "Processed records"
        );

        visible
    }
}

/// One-shot pipeline with default configuration and no user or auxiliary records
pub fn process(kind: RecordKind, records: &[Record], filter: &FilterState, sort: &SortState) -> Vec<ProcessedRecord> {
    Engine::new(kind).process(records, filter, sort)
}
