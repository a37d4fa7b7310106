//! Task search entry points.
//!
//! # Responsibility
//! - Turn free-text user input into safe SQL title filters.
//! - Keep result ordering for search views inside core.

pub mod title;
