//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve database path, logging and presentation defaults for hosts.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Invalid values are rejected, never silently replaced by defaults.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::task_repo::{SortField, TaskSort};
use crate::ui::mode::PresentationMode;
use crate::ui::render::RendererOptions;
use chrono::FixedOffset;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TODO_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TODO_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TODO_LOG_DIR";
pub const LAYOUT_ENV: &str = "TODO_LAYOUT";
pub const SORT_ENV: &str = "TODO_SORT";
pub const UTC_OFFSET_ENV: &str = "TODO_UTC_OFFSET_MINUTES";

const DEFAULT_DB_FILE_NAME: &str = "todo.sqlite3";

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

/// Resolved settings shared by every host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub layout: PresentationMode,
    pub sort: TaskSort,
    pub utc_offset: FixedOffset,
}

impl CoreConfig {
    /// Resolves settings from the process environment.
    ///
    /// # Errors
    /// - Returns `ConfigError` naming the first invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match read(LOG_LEVEL_ENV) {
            Some(value) => normalize_level(&value).map_err(|err| ConfigError {
                key: LOG_LEVEL_ENV,
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => default_log_level(),
        };

        let log_dir = match read(LOG_DIR_ENV) {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError {
                        key: LOG_DIR_ENV,
                        value,
                        reason: "must be an absolute path".to_string(),
                    });
                }
                Some(path)
            }
            None => None,
        };

        let layout = match read(LAYOUT_ENV) {
            Some(value) => PresentationMode::parse(&value).ok_or_else(|| ConfigError {
                key: LAYOUT_ENV,
                value: value.clone(),
                reason: "expected list|grid".to_string(),
            })?,
            None => PresentationMode::default(),
        };

        let sort = match read(SORT_ENV) {
            Some(value) => parse_sort(&value).ok_or_else(|| ConfigError {
                key: SORT_ENV,
                value: value.clone(),
                reason: "expected title|date with optional :asc|:desc".to_string(),
            })?,
            None => TaskSort::default(),
        };

        let utc_offset = match read(UTC_OFFSET_ENV) {
            Some(value) => parse_offset_minutes(&value).ok_or_else(|| ConfigError {
                key: UTC_OFFSET_ENV,
                value: value.clone(),
                reason: "expected whole minutes within one day of UTC".to_string(),
            })?,
            None => utc(),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            layout,
            sort,
            utc_offset,
        })
    }

    /// Display options derived from these settings.
    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            utc_offset: self.utc_offset,
        }
    }
}

fn parse_sort(value: &str) -> Option<TaskSort> {
    let (field, direction) = match value.split_once(':') {
        Some((field, direction)) => (field, Some(direction)),
        None => (value, None),
    };
    let ascending = match direction.map(|d| d.trim().to_ascii_lowercase()) {
        None => true,
        Some(d) if d == "asc" => true,
        Some(d) if d == "desc" => false,
        Some(_) => return None,
    };
    Some(TaskSort::new(SortField::parse(field)?, ascending))
}

fn parse_offset_minutes(value: &str) -> Option<FixedOffset> {
    let minutes = value.parse::<i32>().ok()?;
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

fn utc() -> FixedOffset {
    chrono::Offset::fix(&chrono::Utc)
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, LAYOUT_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV, SORT_ENV, UTC_OFFSET_ENV};
    use crate::repo::task_repo::{SortField, TaskSort};
    use crate::ui::mode::PresentationMode;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CoreConfig, super::ConfigError> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert!(config.db_path.ends_with("todo.sqlite3"));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.layout, PresentationMode::List);
        assert_eq!(config.sort, TaskSort::new(SortField::Title, true));
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
    }

    #[test]
    fn values_are_parsed() {
        let log_dir = std::env::temp_dir().join("todo-logs");
        let config = config_from(&[
            ("TODO_DB_PATH", "/tmp/tasks.db"),
            (LOG_LEVEL_ENV, "WARNING"),
            (LOG_DIR_ENV, log_dir.to_str().unwrap()),
            (LAYOUT_ENV, "grid"),
            (SORT_ENV, "date:desc"),
            (UTC_OFFSET_ENV, "-300"),
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/tasks.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(log_dir));
        assert_eq!(config.layout, PresentationMode::Grid);
        assert_eq!(config.sort, TaskSort::new(SortField::Date, false));
        assert_eq!(config.utc_offset.local_minus_utc(), -300 * 60);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[(LAYOUT_ENV, "   "), (SORT_ENV, "")]).unwrap();
        assert_eq!(config.layout, PresentationMode::List);
        assert_eq!(config.sort, TaskSort::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = config_from(&[(SORT_ENV, "priority")]).unwrap_err();
        assert_eq!(err.key, SORT_ENV);

        let err = config_from(&[(UTC_OFFSET_ENV, "1440")]).unwrap_err();
        assert_eq!(err.key, UTC_OFFSET_ENV);

        let err = config_from(&[(LOG_DIR_ENV, "relative/logs")]).unwrap_err();
        assert!(err.to_string().contains("absolute"));

        let err = config_from(&[(LAYOUT_ENV, "table")]).unwrap_err();
        assert_eq!(err.value, "table");
    }
}
