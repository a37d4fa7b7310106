//! Command execution for the terminal host.
//!
//! # Responsibility
//! - Wire one store to one renderer for the lifetime of a command.
//! - Resolve displayed positions against the same view the user listed.
//!
//! # Invariants
//! - `edit`/`delete` positions are 1-based and refer to the view named by
//!   the command's own sort/search options.
//! - Failures are returned to the caller only; the status stream contributes
//!   success notices.

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use todo_core::{
    ActionVerb, ListRenderer, ModeSelector, PresentationMode, RendererOptions, SortField,
    SqliteTaskRepository, StatusOutcome, Task, TaskAction, TaskListState, TaskSort, TaskStore,
};

use crate::view;

pub type CliResult<T> = Result<T, Box<dyn Error>>;

/// View a command lists, or resolves positions against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    pub sort: Option<SortField>,
    pub descending: bool,
    pub search: Option<String>,
}

/// Store and renderer pair driving one command.
pub struct Session<'conn> {
    store: TaskStore<SqliteTaskRepository<'conn>>,
    renderer: Rc<RefCell<ListRenderer>>,
    actions: Rc<RefCell<Vec<TaskAction>>>,
    notices: Rc<RefCell<Vec<String>>>,
}

impl<'conn> Session<'conn> {
    pub fn new(
        repo: SqliteTaskRepository<'conn>,
        sort: TaskSort,
        layout: PresentationMode,
        options: RendererOptions,
    ) -> Self {
        let store = TaskStore::new(repo, sort);
        let actions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&actions);
        let renderer = Rc::new(RefCell::new(ListRenderer::new(
            Rc::new(ModeSelector::new(layout)),
            move |action| sink.borrow_mut().push(action),
            options,
        )));

        let target = Rc::clone(&renderer);
        store.tasks().subscribe(move |state| {
            if let TaskListState::Success(tasks) = state {
                target.borrow_mut().submit_list(tasks.clone());
            }
        });

        let notices = Rc::new(RefCell::new(Vec::new()));
        let notice_sink = Rc::clone(&notices);
        store.status().subscribe(move |event| {
            if let Some(event) = event {
                if let StatusOutcome::Success(message) = &event.outcome {
                    notice_sink.borrow_mut().push(message.clone());
                }
            }
        });

        Self {
            store,
            renderer,
            actions,
            notices,
        }
    }

    pub fn add(&self, task: &Task) -> CliResult<()> {
        self.store.insert(task)?;
        Ok(())
    }

    /// Replaces the title and/or description of the task at `position` in `view`.
    pub fn edit(
        &self,
        position: usize,
        title: Option<String>,
        description: Option<String>,
        view: &ListView,
    ) -> CliResult<()> {
        if title.is_none() && description.is_none() {
            return Err("edit needs --title or --description".into());
        }
        let current = self.trigger(position, ActionVerb::Edit, view)?.task;
        let replacement = current.edited(
            title.unwrap_or_else(|| current.title.clone()),
            description.unwrap_or_else(|| current.description.clone()),
        );
        self.store.update(&replacement)?;
        Ok(())
    }

    /// Deletes the task at `position` in `view`.
    pub fn delete(&self, position: usize, view: &ListView) -> CliResult<()> {
        let action = self.trigger(position, ActionVerb::Delete, view)?;
        self.store.delete_by_id(action.task.id)?;
        Ok(())
    }

    /// Publishes `view` to the renderer.
    pub fn show(&self, view: &ListView) -> CliResult<()> {
        match view.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                self.store.search(query)?;
            }
            _ if view.sort.is_none() && !view.descending => {
                self.store.load()?;
            }
            _ => {
                let field = view.sort.unwrap_or(self.store.sort().get().field);
                self.store.set_sort(field, !view.descending)?;
            }
        }
        Ok(())
    }

    /// Success messages emitted so far, oldest first.
    pub fn take_notices(&self) -> Vec<String> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }

    pub fn render(&self) -> String {
        view::render(&self.renderer.borrow())
    }

    /// Shows `view`, then fires `verb` on the cell at the 1-based `position`.
    fn trigger(&self, position: usize, verb: ActionVerb, view: &ListView) -> CliResult<TaskAction> {
        self.show(view)?;
        let cell = position
            .checked_sub(1)
            .and_then(|index| self.renderer.borrow().cell_at(index).map(|cell| cell.id()))
            .ok_or_else(|| format!("no task at position {position}"))?;

        self.renderer.borrow_mut().fire(cell, verb);
        let action = self.actions.borrow_mut().pop();
        action.ok_or_else(|| format!("task at position {position} is not available").into())
    }
}
