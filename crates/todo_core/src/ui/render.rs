//! Dual-layout task renderer.
//!
//! # Responsibility
//! - Allocate list or grid cells and bind task records into them.
//! - Route edit/delete triggers back to the host as `TaskAction`s.
//! - Apply reconciled snapshots so only changed positions are rebound.
//!
//! # Invariants
//! - A cell is UNBOUND until bound; rebinding replaces every field and the
//!   task reported by both triggers.
//! - `CellHandle::position` is `None` once a cell is detached; triggers on
//!   such cells are suppressed.
//! - An edit script is applied completely inside one `submit_list` call.

use crate::diff::{reconcile, EditCounts, EditOp, EditScript};
use crate::model::task::Task;
use crate::ui::format::format_task_date;
use crate::ui::mode::{ModeSelector, ViewType};
use chrono::{FixedOffset, Offset, Utc};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Action verb reported by a cell trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionVerb {
    Edit,
    Delete,
}

impl ActionVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// Event delivered to the host when a bound, attached cell is triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAction {
    pub verb: ActionVerb,
    pub position: usize,
    pub task: Task,
}

/// Renderer-scoped cell identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(usize);

impl Display for CellId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// Text shown by a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFields {
    pub title: String,
    pub description: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCellState {
    pub fields: CellFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridCellState {
    pub fields: CellFields,
}

/// Concrete cell template for one layout family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellVariant {
    List(ListCellState),
    Grid(GridCellState),
}

impl CellVariant {
    fn blank(view_type: ViewType) -> Self {
        match view_type {
            ViewType::List => Self::List(ListCellState::default()),
            ViewType::Grid => Self::Grid(GridCellState::default()),
        }
    }

    pub fn view_type(&self) -> ViewType {
        match self {
            Self::List(_) => ViewType::List,
            Self::Grid(_) => ViewType::Grid,
        }
    }

    pub fn fields(&self) -> &CellFields {
        match self {
            Self::List(state) => &state.fields,
            Self::Grid(state) => &state.fields,
        }
    }

    fn fields_mut(&mut self) -> &mut CellFields {
        match self {
            Self::List(state) => &mut state.fields,
            Self::Grid(state) => &mut state.fields,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Unbound,
    Bound,
}

/// Reusable visual container bound to at most one task.
#[derive(Debug, Clone)]
pub struct CellHandle {
    id: CellId,
    variant: CellVariant,
    bound: Option<Task>,
    position: Option<usize>,
    bind_count: u32,
}

impl CellHandle {
    /// Renderer-scoped id of this cell.
    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn view_type(&self) -> ViewType {
        self.variant.view_type()
    }

    /// Layout-specific template state.
    pub fn variant(&self) -> &CellVariant {
        &self.variant
    }

    /// Text currently shown by the cell.
    pub fn fields(&self) -> &CellFields {
        self.variant.fields()
    }

    pub fn state(&self) -> CellState {
        if self.bound.is_some() {
            CellState::Bound
        } else {
            CellState::Unbound
        }
    }

    /// Current adapter position, or `None` when detached.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Task bound into this cell, if any.
    pub fn bound_task(&self) -> Option<&Task> {
        self.bound.as_ref()
    }

    /// Number of binds since creation.
    pub fn bind_count(&self) -> u32 {
        self.bind_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    UnknownCell(CellId),
    PositionOutOfRange { position: usize, len: usize },
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCell(cell) => write!(f, "unknown {cell}"),
            Self::PositionOutOfRange { position, len } => {
                write!(f, "position {position} is outside rendered list of {len}")
            }
        }
    }
}

impl Error for RenderError {}

/// Display settings applied at bind time.
#[derive(Debug, Clone, Copy)]
pub struct RendererOptions {
    pub utc_offset: FixedOffset,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
        }
    }
}

/// Outcome of one `submit_list` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    pub script: EditScript<Task>,
    /// Final positions whose cells were bound during the pass.
    pub rebound: Vec<usize>,
    pub layout_changed: bool,
}

impl RenderPass {
    pub fn data_changes(&self) -> EditCounts {
        self.script.counts()
    }
}

/// Renders a task list into list or grid cells.
pub struct ListRenderer {
    mode: Rc<ModeSelector>,
    on_action: Box<dyn FnMut(TaskAction)>,
    options: RendererOptions,
    cells: Vec<CellHandle>,
    attached: Vec<Option<CellId>>,
    recycled: Vec<CellId>,
    snapshot: Vec<Task>,
    layout: ViewType,
}

impl ListRenderer {
    pub fn new(
        mode: Rc<ModeSelector>,
        on_action: impl FnMut(TaskAction) + 'static,
        options: RendererOptions,
    ) -> Self {
        let layout = ViewType::from(mode.current());
        Self {
            mode,
            on_action: Box::new(on_action),
            options,
            cells: Vec::new(),
            attached: Vec::new(),
            recycled: Vec::new(),
            snapshot: Vec::new(),
            layout,
        }
    }

    /// Returns the template family for `position` under the current mode.
    ///
    /// The mode is read live, so every position agrees within a pass.
    pub fn view_type_for(&self, _position: usize) -> ViewType {
        ViewType::from(self.mode.current())
    }

    /// Allocates a fresh, unbound cell of `view_type`.
    pub fn create_cell(&mut self, view_type: ViewType) -> CellId {
        let id = CellId(self.cells.len());
        self.cells.push(CellHandle {
            id,
            variant: CellVariant::blank(view_type),
            bound: None,
            position: None,
            bind_count: 0,
        });
        id
    }

    /// Binds `task` into `cell` and attaches the cell at `position`.
    ///
    /// A cell previously attached at `position` is detached and recycled.
    ///
    /// # Errors
    /// - `UnknownCell` for ids not created by this renderer.
    /// - `PositionOutOfRange` when `position` is past the rendered list.
    pub fn bind_cell(
        &mut self,
        cell: CellId,
        task: &Task,
        position: usize,
    ) -> Result<(), RenderError> {
        if cell.0 >= self.cells.len() {
            return Err(RenderError::UnknownCell(cell));
        }
        if position >= self.attached.len() {
            return Err(RenderError::PositionOutOfRange {
                position,
                len: self.attached.len(),
            });
        }

        if let Some(previous) = self.cells[cell.0].position {
            self.attached[previous] = None;
        }
        self.recycled.retain(|candidate| *candidate != cell);
        if let Some(occupant) = self.attached[position] {
            if occupant != cell {
                self.recycle(occupant);
            }
        }
        self.attached[position] = Some(cell);
        self.write_binding(cell, task.clone(), position);
        Ok(())
    }

    /// Fires a cell trigger.
    ///
    /// Returns `true` when the action reached the handler. Unbound or
    /// detached cells are ignored.
    pub fn fire(&mut self, cell: CellId, verb: ActionVerb) -> bool {
        let Some(handle) = self.cells.get(cell.0) else {
            return false;
        };
        let (Some(position), Some(task)) = (handle.position, handle.bound.as_ref()) else {
            debug!(
                "event=cell_trigger module=render status=suppressed verb={} cell={}",
                verb.as_str(),
                cell
            );
            return false;
        };
        let action = TaskAction {
            verb,
            position,
            task: task.clone(),
        };
        (self.on_action)(action);
        true
    }

    /// Reconciles `tasks` against the rendered snapshot and applies the diff.
    pub fn submit_list(&mut self, tasks: Vec<Task>) -> RenderPass {
        let layout_changed = self.refresh_layout();
        let script = reconcile(&self.snapshot, &tasks);
        let mut rebound = Vec::new();

        for op in script.ops() {
            match op {
                EditOp::Remove { index } => {
                    self.snapshot.remove(*index);
                    if let Some(cell) = self.attached.remove(*index) {
                        self.recycle(cell);
                    }
                }
                EditOp::Insert { index, item } => {
                    self.snapshot.insert(*index, item.clone());
                    let cell = self.obtain_cell(self.layout);
                    self.attached.insert(*index, Some(cell));
                    self.write_binding(cell, item.clone(), *index);
                    rebound.push(*index);
                }
                EditOp::Move { from, to } => {
                    let task = self.snapshot.remove(*from);
                    self.snapshot.insert(*to, task);
                    let slot = self.attached.remove(*from);
                    self.attached.insert(*to, slot);
                }
                EditOp::Update { index, item } => {
                    self.snapshot[*index] = item.clone();
                    let cell = match self.attached[*index] {
                        Some(cell) => cell,
                        None => {
                            let cell = self.obtain_cell(self.layout);
                            self.attached[*index] = Some(cell);
                            cell
                        }
                    };
                    self.write_binding(cell, item.clone(), *index);
                    rebound.push(*index);
                }
            }
        }
        self.sync_positions();

        let counts = script.counts();
        debug!(
            "event=render_pass module=render status=ok items={} removes={} inserts={} moves={} updates={} layout_changed={}",
            self.snapshot.len(),
            counts.removes,
            counts.inserts,
            counts.moves,
            counts.updates,
            layout_changed
        );

        RenderPass {
            script,
            rebound,
            layout_changed,
        }
    }

    /// Rebuilds every attached cell when the mode changed since the last pass.
    ///
    /// The data snapshot is left untouched. Returns whether cells were rebuilt.
    pub fn refresh_layout(&mut self) -> bool {
        let view_type = ViewType::from(self.mode.current());
        if view_type == self.layout {
            return false;
        }
        self.layout = view_type;

        let previous = self.attached.iter().flatten().copied().collect::<Vec<_>>();
        for cell in previous {
            self.recycle(cell);
        }
        for position in 0..self.snapshot.len() {
            let cell = self.obtain_cell(view_type);
            self.attached[position] = Some(cell);
            let task = self.snapshot[position].clone();
            self.write_binding(cell, task, position);
        }
        true
    }

    /// Looks up a cell by id, attached or not.
    pub fn cell(&self, cell: CellId) -> Option<&CellHandle> {
        self.cells.get(cell.0)
    }

    /// Cell currently attached at `position`.
    pub fn cell_at(&self, position: usize) -> Option<&CellHandle> {
        self.attached
            .get(position)
            .copied()
            .flatten()
            .and_then(|cell| self.cells.get(cell.0))
    }

    /// Cells in display order. Unfilled positions are skipped.
    pub fn visible_cells(&self) -> impl Iterator<Item = &CellHandle> + '_ {
        self.attached
            .iter()
            .flatten()
            .filter_map(move |cell| self.cells.get(cell.0))
    }

    /// Task list as last applied by [`ListRenderer::submit_list`].
    pub fn snapshot(&self) -> &[Task] {
        &self.snapshot
    }

    /// Number of rendered positions.
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// `true` when nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// View type of the cells currently attached.
    pub fn layout(&self) -> ViewType {
        self.layout
    }

    fn write_binding(&mut self, cell: CellId, task: Task, position: usize) {
        let date = format_task_date(task.date, &self.options.utc_offset);
        let handle = &mut self.cells[cell.0];
        let fields = handle.variant.fields_mut();
        fields.title.clone_from(&task.title);
        fields.description.clone_from(&task.description);
        fields.date = date;
        handle.bound = Some(task);
        handle.position = Some(position);
        handle.bind_count += 1;
    }

    fn recycle(&mut self, cell: CellId) {
        let handle = &mut self.cells[cell.0];
        handle.bound = None;
        handle.position = None;
        *handle.variant.fields_mut() = CellFields::default();
        if !self.recycled.contains(&cell) {
            self.recycled.push(cell);
        }
    }

    fn obtain_cell(&mut self, view_type: ViewType) -> CellId {
        let reusable = self
            .recycled
            .iter()
            .position(|cell| self.cells[cell.0].view_type() == view_type);
        match reusable {
            Some(slot) => self.recycled.remove(slot),
            None => self.create_cell(view_type),
        }
    }

    fn sync_positions(&mut self) {
        for (position, slot) in self.attached.iter().enumerate() {
            if let Some(cell) = slot {
                self.cells[cell.0].position = Some(position);
            }
        }
    }
}
