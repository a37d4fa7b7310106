//! Core logic for the local to-do list.
//! This crate owns the task invariants, storage and list rendering contract.

pub mod config;
pub mod db;
pub mod diff;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod signal;
pub mod ui;

pub use config::{ConfigError, CoreConfig};
pub use diff::{reconcile, EditCounts, EditOp, EditScript, Keyed};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use model::timestamp::{date_to_timestamp, timestamp_to_date, TimestampError};
pub use repo::task_repo::{
    RepoError, RepoResult, SortField, SqliteTaskRepository, TaskRepository, TaskSort,
};
pub use search::title::TitleSearch;
pub use service::task_store::{StatusEvent, StatusOp, StatusOutcome, TaskListState, TaskStore};
pub use signal::{Signal, SubscriptionId};
pub use ui::format::format_task_date;
pub use ui::mode::{ModeSelector, PresentationMode, ViewType};
pub use ui::render::{
    ActionVerb, CellFields, CellHandle, CellId, CellState, CellVariant, GridCellState,
    ListCellState, ListRenderer, RenderError, RenderPass, RendererOptions, TaskAction,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
