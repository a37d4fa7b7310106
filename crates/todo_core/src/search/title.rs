//! Title substring search.
//!
//! # Invariants
//! - User text never reaches SQL as a pattern: `%`, `_` and `\` are escaped.
//! - A blank query matches every task.
//! - Results are ordered by `date DESC, id ASC`.

use crate::model::task::Task;
use crate::repo::task_repo::{collect_tasks, RepoResult, TASK_SELECT_SQL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Normalized title search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSearch {
    text: String,
}

impl TitleSearch {
    /// Collapses inner whitespace runs and trims the ends.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: WHITESPACE_RE
                .replace_all(text.as_ref().trim(), " ")
                .into_owned(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    /// LIKE pattern matching the query anywhere in a title.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.text.len() + 2);
        pattern.push('%');
        for ch in self.text.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}

/// Returns tasks whose title contains the query, case-insensitively for ASCII.
pub fn search_titles(conn: &Connection, query: &TitleSearch) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "{TASK_SELECT_SQL} WHERE title LIKE ?1 ESCAPE '\\' ORDER BY date DESC, id ASC;"
    ))?;
    let rows = stmt.query([query.like_pattern()])?;
    collect_tasks(rows)
}
