//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record rendered by list and grid layouts.
//! - Own the epoch-millisecond mapping used at the storage boundary.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Task timestamps carry millisecond resolution only.

pub mod task;
pub mod timestamp;
