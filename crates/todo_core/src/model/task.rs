//! Task domain record.
//!
//! # Responsibility
//! - Define the record shown by list and grid cells.
//! - Provide constructors that keep identity and timestamp invariants.
//!
//! # Invariants
//! - `id` is stable for the lifetime of a task and never nil.
//! - Edits replace the full record; `id` is carried over unchanged.
//! - `date` is millisecond-aligned so storage round-trips are lossless.

use crate::diff::Keyed;
use crate::model::timestamp::{epoch_millis, truncate_to_millis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Validation failures for task records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    BlankTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item.
///
/// Equality is structural over every field, which is what the reconciler
/// uses to decide whether a slot needs a rebind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Serialized as epoch milliseconds, matching the `tasks.date` column.
    #[serde(with = "epoch_millis")]
    pub date: DateTime<Utc>,
}

impl Task {
    /// Creates a task with a generated id, stamped with the current time.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            date: truncate_to_millis(Utc::now()),
        }
    }

    /// Creates a task with caller-provided identity and date.
    ///
    /// Used by storage and import paths where the id already exists.
    ///
    /// # Errors
    /// - Returns `TaskValidationError` for a nil id or blank title.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            title: title.into(),
            description: description.into(),
            date: truncate_to_millis(date),
        };
        task.validate()?;
        Ok(task)
    }

    /// Returns the full replacement record for an edit of this task.
    ///
    /// The id is kept and the date is re-stamped with the current time.
    pub fn edited(&self, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: self.id,
            title: title.into(),
            description: description.into(),
            date: truncate_to_millis(Utc::now()),
        }
    }

    /// Checks record invariants required before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(())
    }
}

impl Keyed for Task {
    type Key = TaskId;

    fn key(&self) -> TaskId {
        self.id
    }
}
