use chrono::{TimeZone, Utc};
use todo_core::db::open_db_in_memory;
use todo_core::{SqliteTaskRepository, Task, TaskRepository, TitleSearch};
use uuid::Uuid;

fn seed(repo: &SqliteTaskRepository<'_>, title: &str, millis: i64) -> Task {
    let task = Task::with_id(
        Uuid::new_v4(),
        title,
        "",
        Utc.timestamp_millis_opt(millis).unwrap(),
    )
    .unwrap();
    repo.insert_task(&task).unwrap();
    task
}

#[test]
fn search_matches_title_substring_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let milk = seed(&repo, "Buy MILK tomorrow", 1_000);
    seed(&repo, "walk the dog", 2_000);

    let hits = repo.search_tasks(&TitleSearch::new("milk")).unwrap();
    assert_eq!(hits, vec![milk]);
}

#[test]
fn search_does_not_match_descriptions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = Task::new("groceries", "milk and bread");
    repo.insert_task(&task).unwrap();

    assert!(repo
        .search_tasks(&TitleSearch::new("bread"))
        .unwrap()
        .is_empty());
}

#[test]
fn search_results_are_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let old = seed(&repo, "plan trip", 1_000);
    let new = seed(&repo, "plan party", 5_000);
    let mid = seed(&repo, "plan budget", 3_000);

    let hits = repo.search_tasks(&TitleSearch::new("plan")).unwrap();
    assert_eq!(hits, vec![new, mid, old]);
}

#[test]
fn wildcard_characters_match_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let sale = seed(&repo, "50% off sale", 1_000);
    seed(&repo, "500 items", 2_000);
    let snake = seed(&repo, "rename file_name", 3_000);
    seed(&repo, "rename filename", 4_000);

    assert_eq!(
        repo.search_tasks(&TitleSearch::new("50%")).unwrap(),
        vec![sale]
    );
    assert_eq!(
        repo.search_tasks(&TitleSearch::new("file_")).unwrap(),
        vec![snake]
    );
}

#[test]
fn blank_search_returns_every_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    seed(&repo, "one", 1_000);
    seed(&repo, "two", 2_000);

    let hits = repo.search_tasks(&TitleSearch::new("  ")).unwrap();
    assert_eq!(hits.len(), 2);
}
