#[cfg(feature = "http_api")]
pub mod http_api;
pub mod metadata;
pub mod persistence;
pub mod plan;
pub mod recurrence;
pub mod task;
pub(crate) mod task_validation;

pub use metadata::PlanMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, load_plan_from_csv, load_plan_from_json, save_plan_to_csv,
    save_plan_to_json, validate_plan, validate_tasks,
};
pub use plan::{MaintenancePlan, PlanMetadataError, RefreshSummary};
pub use recurrence::{
    PeriodType, RecurrenceError, compute_next_date, format_iso, next_occurrence, parse_base_date,
    try_next_date,
};
pub use task::Task;
