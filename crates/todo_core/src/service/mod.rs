//! Use-case layer between hosts and storage.
//!
//! # Responsibility
//! - Expose task commands and observable state to UI hosts.
//! - Keep hosts decoupled from SQLite details.

pub mod task_store;
