//! Task store facade.
//!
//! # Responsibility
//! - Accept insert/update/delete/search/sort commands from the host.
//! - Publish the current task snapshot, mutation status and sort criterion
//!   as push-streams.
//!
//! # Invariants
//! - Every mutation emits exactly one status event, then refreshes the
//!   snapshot with the active view (last search, otherwise sorted list).
//! - Storage failures surface as `Failure` status events or
//!   `TaskListState::Error`, and are also returned to the caller.
//! - Log lines carry ids and counts only, never task text.

use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoResult, SortField, TaskRepository, TaskSort};
use crate::search::title::TitleSearch;
use crate::signal::Signal;
use log::{info, warn};
use std::cell::RefCell;

/// Snapshot stream payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListState {
    Loading,
    Success(Vec<Task>),
    Error(String),
}

impl TaskListState {
    /// Tasks carried by `Success`.
    pub fn tasks(&self) -> Option<&[Task]> {
        match self {
            Self::Success(tasks) => Some(tasks),
            Self::Loading | Self::Error(_) => None,
        }
    }
}

/// Mutation that produced a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOp {
    Inserted,
    Updated,
    Deleted,
}

impl StatusOp {
    fn event_name(self) -> &'static str {
        match self {
            Self::Inserted => "task_insert",
            Self::Updated => "task_update",
            Self::Deleted => "task_delete",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Self::Inserted => "Inserted Task Successfully",
            Self::Updated => "Updated Task Successfully",
            Self::Deleted => "Deleted Task Successfully",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    Success(String),
    Failure(String),
}

/// Status stream payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub op: StatusOp,
    pub outcome: StatusOutcome,
}

impl StatusEvent {
    /// `true` when the mutation was committed.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StatusOutcome::Success(_))
    }
}

#[derive(Debug, Clone)]
enum ActiveView {
    Sorted,
    Search(TitleSearch),
}

/// Facade over a task repository with observable state.
pub struct TaskStore<R: TaskRepository> {
    repo: R,
    tasks: Signal<TaskListState>,
    status: Signal<Option<StatusEvent>>,
    sort: Signal<TaskSort>,
    view: RefCell<ActiveView>,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Creates a store. No query runs until [`TaskStore::load`].
    pub fn new(repo: R, sort: TaskSort) -> Self {
        Self {
            repo,
            tasks: Signal::new(TaskListState::Loading),
            status: Signal::new(None),
            sort: Signal::new(sort),
            view: RefCell::new(ActiveView::Sorted),
        }
    }

    /// Snapshot stream: `Loading`, then `Success` or `Error`, per refresh.
    pub fn tasks(&self) -> &Signal<TaskListState> {
        &self.tasks
    }

    /// Status stream; `None` until the first mutation.
    pub fn status(&self) -> &Signal<Option<StatusEvent>> {
        &self.status
    }

    /// Active sort criterion, updated by [`TaskStore::set_sort`].
    pub fn sort(&self) -> &Signal<TaskSort> {
        &self.sort
    }

    /// Leaves any search and publishes the sorted list.
    pub fn load(&self) -> RepoResult<Vec<Task>> {
        *self.view.borrow_mut() = ActiveView::Sorted;
        self.refresh()
    }

    /// Persists a new task and reports `Inserted`.
    pub fn insert(&self, task: &Task) -> RepoResult<TaskId> {
        let result = self.repo.insert_task(task);
        self.finish_mutation(StatusOp::Inserted, task.id, &result);
        result
    }

    /// Replaces the stored record with the same id and reports `Updated`.
    pub fn update(&self, task: &Task) -> RepoResult<()> {
        let result = self.repo.update_task(task);
        self.finish_mutation(StatusOp::Updated, task.id, &result);
        result
    }

    /// Hard-deletes `id` and reports `Deleted`.
    pub fn delete_by_id(&self, id: TaskId) -> RepoResult<()> {
        let result = self.repo.delete_task(id);
        self.finish_mutation(StatusOp::Deleted, id, &result);
        result
    }

    /// Switches to a title search; a blank query returns to the sorted list.
    pub fn search(&self, query: &str) -> RepoResult<Vec<Task>> {
        let search = TitleSearch::new(query);
        *self.view.borrow_mut() = if search.is_blank() {
            ActiveView::Sorted
        } else {
            ActiveView::Search(search)
        };
        self.refresh()
    }

    /// Publishes the new criterion, then the list sorted by it.
    pub fn set_sort(&self, field: SortField, ascending: bool) -> RepoResult<Vec<Task>> {
        let sort = TaskSort::new(field, ascending);
        info!(
            "event=task_sort module=store status=ok field={} ascending={}",
            field.as_str(),
            ascending
        );
        self.sort.set(sort);
        *self.view.borrow_mut() = ActiveView::Sorted;
        self.refresh()
    }

    /// Re-runs the active view and publishes the outcome.
    pub fn refresh(&self) -> RepoResult<Vec<Task>> {
        self.tasks.set(TaskListState::Loading);
        let view = self.view.borrow().clone();
        let result = match &view {
            ActiveView::Sorted => self.repo.list_tasks(&self.sort.get()),
            ActiveView::Search(query) => self.repo.search_tasks(query),
        };

        match &result {
            Ok(tasks) => {
                info!(
                    "event=task_list module=store status=ok view={} count={}",
                    view_name(&view),
                    tasks.len()
                );
                self.tasks.set(TaskListState::Success(tasks.clone()));
            }
            Err(err) => {
                warn!(
                    "event=task_list module=store status=error view={} error={err}",
                    view_name(&view)
                );
                self.tasks.set(TaskListState::Error(err.to_string()));
            }
        }
        result
    }

    fn finish_mutation<T>(&self, op: StatusOp, id: TaskId, result: &RepoResult<T>) {
        let outcome = match result {
            Ok(_) => {
                info!(
                    "event={} module=store status=ok task_id={id}",
                    op.event_name()
                );
                StatusOutcome::Success(op.success_message().to_string())
            }
            Err(err) => {
                warn!(
                    "event={} module=store status=error task_id={id} error={err}",
                    op.event_name()
                );
                StatusOutcome::Failure(err.to_string())
            }
        };
        self.status.set(Some(StatusEvent { op, outcome }));
        if result.is_err() {
            return;
        }
        // Why: the mutation is already committed; a failed re-query is published
        // as `TaskListState::Error` and must not turn the command into a failure.
        if let Err(err) = self.refresh() {
            warn!(
                "event={} module=store status=stale_snapshot task_id={id} error={err}",
                op.event_name()
            );
        }
    }
}

fn view_name(view: &ActiveView) -> &'static str {
    match view {
        ActiveView::Sorted => "sorted",
        ActiveView::Search(_) => "search",
    }
}
