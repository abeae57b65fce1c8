// TaskView - Record normalization, filtering and ordering for task/project dashboards

pub mod config;
pub mod dates;
pub mod engine;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod predicate;
pub mod record;
pub mod sort;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use engine::{Engine, process};
pub use filter::{AdvancedFilters, DateRange, FilterFlag, FilterState, NumericRange, PredefinedFilter, QuickValue};
pub use metrics::{DerivedMetrics, ProcessedRecord, derive_progress};
pub use normalize::{normalize_list, normalize_tags};
pub use predicate::{FilterPlan, MatchContext, contains_identity, contains_identity_token, matches};
pub use record::{Identity, Record, RecordKind};
pub use sort::{ColumnSort, SortDirection, SortField, SortState, compare};
