use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;
use todo_core::db::open_db_in_memory;
use todo_core::{
    RepoError, RepoResult, SortField, SqliteTaskRepository, StatusEvent, StatusOp, StatusOutcome,
    Task, TaskId, TaskListState, TaskRepository, TaskSort, TaskStore, TitleSearch,
};

/// Accepts writes but fails every read.
struct WriteOnlyRepository;

impl TaskRepository for WriteOnlyRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        Ok(task.id)
    }

    fn update_task(&self, _task: &Task) -> RepoResult<()> {
        Ok(())
    }

    fn delete_task(&self, _id: TaskId) -> RepoResult<()> {
        Ok(())
    }

    fn get_task(&self, _id: TaskId) -> RepoResult<Option<Task>> {
        Err(RepoError::InvalidData("reads disabled".to_string()))
    }

    fn list_tasks(&self, _sort: &TaskSort) -> RepoResult<Vec<Task>> {
        Err(RepoError::InvalidData("reads disabled".to_string()))
    }

    fn search_tasks(&self, _query: &TitleSearch) -> RepoResult<Vec<Task>> {
        Err(RepoError::InvalidData("reads disabled".to_string()))
    }
}

fn store(conn: &Connection) -> TaskStore<SqliteTaskRepository<'_>> {
    TaskStore::new(
        SqliteTaskRepository::try_new(conn).unwrap(),
        TaskSort::default(),
    )
}

fn record<T: Clone + 'static>(signal: &todo_core::Signal<T>) -> Rc<RefCell<Vec<T>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    signal.subscribe(move |value: &T| sink.borrow_mut().push(value.clone()));
    seen
}

#[test]
fn insert_emits_status_then_refreshed_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let statuses = record(store.status());
    let snapshots = record(store.tasks());

    let task = Task::new("write tests", "");
    store.insert(&task).unwrap();

    assert_eq!(
        *statuses.borrow(),
        vec![Some(StatusEvent {
            op: StatusOp::Inserted,
            outcome: StatusOutcome::Success("Inserted Task Successfully".to_string()),
        })]
    );
    assert_eq!(
        *snapshots.borrow(),
        vec![TaskListState::Loading, TaskListState::Success(vec![task])]
    );
}

#[test]
fn failed_mutation_reports_failure_without_refresh() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let snapshots = record(store.tasks());

    let ghost = Task::new("ghost", "");
    let err = store.delete_by_id(ghost.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let status = store.status().get().unwrap();
    assert_eq!(status.op, StatusOp::Deleted);
    assert!(!status.is_success());
    assert!(matches!(status.outcome, StatusOutcome::Failure(message) if message.contains("not found")));
    assert!(snapshots.borrow().is_empty());
}

#[test]
fn update_and_delete_flow_through_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let first = Task::new("alpha", "");
    let second = Task::new("beta", "");
    store.insert(&first).unwrap();
    store.insert(&second).unwrap();

    let edited = first.edited("alpha edited", "more");
    store.update(&edited).unwrap();
    assert_eq!(
        store.tasks().get(),
        TaskListState::Success(vec![edited.clone(), second.clone()])
    );

    store.delete_by_id(second.id).unwrap();
    assert_eq!(store.tasks().get(), TaskListState::Success(vec![edited]));
    assert_eq!(
        store.status().get().map(|status| status.op),
        Some(StatusOp::Deleted)
    );
}

#[test]
fn set_sort_publishes_criterion_and_resorted_list() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let sorts = record(store.sort());
    let a = Task::new("a", "");
    let b = Task::new("b", "");
    store.insert(&a).unwrap();
    store.insert(&b).unwrap();

    let tasks = store.set_sort(SortField::Title, false).unwrap();

    assert_eq!(tasks, vec![b, a]);
    assert_eq!(
        *sorts.borrow(),
        vec![TaskSort::new(SortField::Title, false)]
    );
    assert_eq!(store.sort().get(), TaskSort::new(SortField::Title, false));
}

#[test]
fn search_view_survives_mutations_until_cleared() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let milk = Task::new("buy milk", "");
    store.insert(&milk).unwrap();
    store.insert(&Task::new("walk dog", "")).unwrap();

    assert_eq!(store.search("milk").unwrap(), vec![milk.clone()]);

    let oat_milk = Task::new("buy oat milk", "");
    store.insert(&oat_milk).unwrap();
    let visible = store.tasks().get();
    let titles = visible
        .tasks()
        .unwrap()
        .iter()
        .map(|task| task.title.clone())
        .collect::<Vec<_>>();
    assert_eq!(titles.len(), 2);
    assert!(titles.iter().all(|title| title.contains("milk")));

    assert_eq!(store.search(" ").unwrap().len(), 3);
    assert_eq!(store.load().unwrap().len(), 3);
}

#[test]
fn committed_mutation_stays_successful_when_refresh_fails() {
    let store = TaskStore::new(WriteOnlyRepository, TaskSort::default());
    let snapshots = record(store.tasks());
    let task = Task::new("kept", "");

    assert_eq!(store.insert(&task).unwrap(), task.id);

    assert!(store.status().get().unwrap().is_success());
    let snapshots = snapshots.borrow();
    assert_eq!(snapshots.first(), Some(&TaskListState::Loading));
    assert!(matches!(
        snapshots.last(),
        Some(TaskListState::Error(message)) if message.contains("reads disabled")
    ));
}
