//! Task persistence contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the storage contract used by the store facade.
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Writes call `Task::validate()` before touching SQL.
//! - Reads reject invalid persisted rows instead of masking them.

pub mod task_repo;
