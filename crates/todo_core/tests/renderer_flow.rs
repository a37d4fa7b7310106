use chrono::{TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use todo_core::db::open_db_in_memory;
use todo_core::{
    ActionVerb, CellState, EditCounts, EditOp, ListRenderer, ModeSelector, PresentationMode,
    RendererOptions, SqliteTaskRepository, Task, TaskAction, TaskListState, TaskSort, TaskStore,
    ViewType,
};
use uuid::Uuid;

fn task(title: &str, millis: i64) -> Task {
    Task::with_id(
        Uuid::new_v4(),
        title,
        format!("{title} notes"),
        Utc.timestamp_millis_opt(millis).unwrap(),
    )
    .unwrap()
}

fn renderer(mode: PresentationMode) -> (ListRenderer, Rc<ModeSelector>, Rc<RefCell<Vec<TaskAction>>>) {
    let selector = Rc::new(ModeSelector::new(mode));
    let actions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&actions);
    let renderer = ListRenderer::new(
        Rc::clone(&selector),
        move |action| sink.borrow_mut().push(action),
        RendererOptions::default(),
    );
    (renderer, selector, actions)
}

#[test]
fn bound_cells_show_verbatim_text_and_formatted_date() {
    let (mut renderer, _, _) = renderer(PresentationMode::List);
    let date = Utc.with_ymd_and_hms(2024, 1, 5, 13, 45, 30).unwrap();
    let item = Task::with_id(Uuid::new_v4(), "  Title  ", "line one\nline two", date).unwrap();

    renderer.submit_list(vec![item]);

    let cell = renderer.cell_at(0).unwrap();
    assert_eq!(cell.state(), CellState::Bound);
    assert_eq!(cell.view_type(), ViewType::List);
    assert_eq!(cell.fields().title, "  Title  ");
    assert_eq!(cell.fields().description, "line one\nline two");
    assert_eq!(cell.fields().date, "05-Jan-2024 13:45:30 PM");
}

#[test]
fn view_type_is_uniform_and_follows_mode_immediately() {
    let (mut renderer, selector, _) = renderer(PresentationMode::List);
    renderer.submit_list(vec![task("a", 1), task("b", 2), task("c", 3)]);

    assert!((0..3).all(|position| renderer.view_type_for(position) == ViewType::List));
    selector.set_list(false);
    assert!((0..3).all(|position| renderer.view_type_for(position) == ViewType::Grid));
}

#[test]
fn delete_in_grid_then_removal_leaves_first_cell_untouched() {
    let (mut renderer, _, actions) = renderer(PresentationMode::Grid);
    let t1 = task("T1", 1_000);
    let t2 = task("T2", 2_000);

    renderer.submit_list(vec![t1.clone(), t2.clone()]);
    let first = renderer.cell_at(0).unwrap().id();
    let second = renderer.cell_at(1).unwrap().id();
    assert_eq!(renderer.cell(second).unwrap().view_type(), ViewType::Grid);

    assert!(renderer.fire(second, ActionVerb::Delete));
    assert_eq!(
        *actions.borrow(),
        vec![TaskAction {
            verb: ActionVerb::Delete,
            position: 1,
            task: t2,
        }]
    );

    let pass = renderer.submit_list(vec![t1]);
    assert_eq!(pass.script.ops(), &[EditOp::Remove { index: 1 }]);
    assert!(pass.rebound.is_empty());
    assert_eq!(renderer.cell(first).unwrap().bind_count(), 1);
    assert_eq!(renderer.cell(first).unwrap().position(), Some(0));

    assert!(!renderer.fire(second, ActionVerb::Delete));
    assert_eq!(actions.borrow().len(), 1);
}

#[test]
fn mode_flip_changes_layout_without_data_operations() {
    let (mut renderer, selector, _) = renderer(PresentationMode::List);
    let tasks = vec![task("a", 1), task("b", 2)];
    renderer.submit_list(tasks.clone());
    let before = (0..2).map(|p| renderer.view_type_for(p)).collect::<Vec<_>>();

    selector.toggle();
    let after = (0..2).map(|p| renderer.view_type_for(p)).collect::<Vec<_>>();
    let pass = renderer.submit_list(tasks);

    assert_eq!(before, vec![ViewType::List; 2]);
    assert_eq!(after, vec![ViewType::Grid; 2]);
    assert!(pass.layout_changed);
    assert_eq!(pass.data_changes(), EditCounts::default());
    assert!(renderer
        .visible_cells()
        .all(|cell| cell.view_type() == ViewType::Grid));
}

#[test]
fn moved_cells_report_their_new_position() {
    let (mut renderer, _, actions) = renderer(PresentationMode::List);
    let a = task("a", 1);
    let b = task("b", 2);
    let c = task("c", 3);
    renderer.submit_list(vec![a.clone(), b.clone(), c.clone()]);
    let cell_for_c = renderer.cell_at(2).unwrap().id();

    let pass = renderer.submit_list(vec![c.clone(), a, b]);
    assert_eq!(pass.data_changes().moves, 1);
    assert!(pass.rebound.is_empty());
    assert_eq!(renderer.cell_at(0).unwrap().id(), cell_for_c);

    renderer.fire(cell_for_c, ActionVerb::Edit);
    assert_eq!(
        actions.borrow().last(),
        Some(&TaskAction {
            verb: ActionVerb::Edit,
            position: 0,
            task: c,
        })
    );
}

#[test]
fn content_change_rebinds_only_that_position() {
    let (mut renderer, _, actions) = renderer(PresentationMode::List);
    let a = task("a", 1);
    let b = task("b", 2);
    renderer.submit_list(vec![a.clone(), b.clone()]);
    let cell_for_b = renderer.cell_at(1).unwrap().id();

    let b_edited = Task::with_id(b.id, "b edited", "new notes", b.date).unwrap();
    let pass = renderer.submit_list(vec![a, b_edited.clone()]);

    assert_eq!(
        pass.data_changes(),
        EditCounts {
            updates: 1,
            ..EditCounts::default()
        }
    );
    assert_eq!(pass.rebound, vec![1]);
    assert_eq!(renderer.cell_at(0).unwrap().bind_count(), 1);
    let cell = renderer.cell(cell_for_b).unwrap();
    assert_eq!(cell.bind_count(), 2);
    assert_eq!(cell.fields().title, "b edited");

    renderer.fire(cell_for_b, ActionVerb::Edit);
    assert_eq!(actions.borrow()[0].task, b_edited);
}

#[test]
fn removed_cells_are_recycled_for_later_inserts() {
    let (mut renderer, _, _) = renderer(PresentationMode::List);
    renderer.submit_list(vec![task("a", 1)]);
    let recycled = renderer.cell_at(0).unwrap().id();

    renderer.submit_list(Vec::new());
    assert_eq!(renderer.cell(recycled).unwrap().state(), CellState::Unbound);
    assert!(renderer.is_empty());

    renderer.submit_list(vec![task("b", 2)]);
    assert_eq!(renderer.cell_at(0).unwrap().id(), recycled);
    assert_eq!(renderer.cell_at(0).unwrap().fields().title, "b");
}

#[test]
fn store_snapshots_drive_the_renderer() {
    let conn = open_db_in_memory().unwrap();
    let store = Rc::new(TaskStore::new(
        SqliteTaskRepository::try_new(&conn).unwrap(),
        TaskSort::default(),
    ));
    let (renderer, _, actions) = renderer(PresentationMode::List);
    let renderer = Rc::new(RefCell::new(renderer));

    let sink = Rc::clone(&renderer);
    store.tasks().subscribe(move |state| {
        if let TaskListState::Success(tasks) = state {
            sink.borrow_mut().submit_list(tasks.clone());
        }
    });

    let t1 = Task::new("first", "");
    let t2 = Task::new("second", "");
    store.insert(&t1).unwrap();
    store.insert(&t2).unwrap();
    assert_eq!(renderer.borrow().snapshot(), &[t1.clone(), t2.clone()]);

    let target = renderer.borrow().cell_at(1).unwrap().id();
    renderer.borrow_mut().fire(target, ActionVerb::Delete);
    let action = actions.borrow()[0].clone();
    store.delete_by_id(action.task.id).unwrap();

    assert_eq!(renderer.borrow().snapshot(), &[t1]);
    assert!(!renderer.borrow_mut().fire(target, ActionVerb::Delete));
}
