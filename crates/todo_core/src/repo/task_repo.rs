//! Task repository contract and SQLite implementation.
//!
//! # Invariants
//! - `tasks.date` holds epoch milliseconds; conversion happens only here.
//! - Listing is deterministic: ties on the sort field are broken by `id`.
//! - Deletes are hard deletes; a missing id is reported as `NotFound`.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::model::timestamp::{date_to_timestamp, timestamp_to_date, TimestampError};
use crate::search::title::{search_titles, TitleSearch};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub(crate) const TASK_SELECT_SQL: &str = "SELECT id, title, description, date FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    AlreadyExists(TaskId),
    InvalidData(String),
    Timestamp(TimestampError),
    SchemaNotReady { found: u32, expected: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "task already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::Timestamp(err) => write!(f, "invalid persisted task date: {err}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "task schema version {found} does not match expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Timestamp(err) => Some(err),
            Self::NotFound(_)
            | Self::AlreadyExists(_)
            | Self::InvalidData(_)
            | Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TimestampError> for RepoError {
    fn from(value: TimestampError) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Column a task list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortField {
    #[default]
    Title,
    Date,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Date => "date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "date" => Some(Self::Date),
            _ => None,
        }
    }
}

/// Active sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskSort {
    pub field: SortField,
    pub ascending: bool,
}

impl TaskSort {
    pub fn new(field: SortField, ascending: bool) -> Self {
        Self { field, ascending }
    }

    fn order_by_sql(self) -> &'static str {
        match (self.field, self.ascending) {
            (SortField::Title, true) => "title COLLATE NOCASE ASC, id ASC",
            (SortField::Title, false) => "title COLLATE NOCASE DESC, id ASC",
            (SortField::Date, true) => "date ASC, id ASC",
            (SortField::Date, false) => "date DESC, id ASC",
        }
    }
}

impl Default for TaskSort {
    fn default() -> Self {
        Self::new(SortField::Title, true)
    }
}

/// Storage contract consumed by the store facade.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Replaces every field of the task with the same id.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, sort: &TaskSort) -> RepoResult<Vec<Task>>;
    fn search_tasks(&self, query: &TitleSearch) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `SchemaNotReady` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found = schema_version(conn)?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO tasks (id, title, description, date) VALUES (?1, ?2, ?3, ?4);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                date_to_timestamp(task.date),
            ],
        );
        match inserted {
            Ok(_) => Ok(task.id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::AlreadyExists(task.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, date = ?3 WHERE id = ?4;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                date_to_timestamp(task.date),
                task.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, sort: &TaskSort) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} ORDER BY {};",
            sort.order_by_sql()
        ))?;
        let rows = stmt.query([])?;
        collect_tasks(rows)
    }

    fn search_tasks(&self, query: &TitleSearch) -> RepoResult<Vec<Task>> {
        search_titles(self.conn, query)
    }
}

pub(crate) fn collect_tasks(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Task>> {
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    Ok(tasks)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in tasks.id"))
    })?;

    let task = Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        date: timestamp_to_date(row.get("date")?)?,
    };
    task.validate()?;
    Ok(task)
}
