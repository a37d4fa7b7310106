//! Presentation layer for task lists.
//!
//! # Responsibility
//! - Own the list/grid presentation mode.
//! - Bind task records to list or grid cells and dispatch cell triggers.
//! - Apply reconciled snapshots incrementally.
//!
//! # Invariants
//! - All renderer work runs on one thread; nothing here blocks.
//! - A trigger on a detached cell never reaches the action handler.

pub mod format;
pub mod mode;
pub mod render;
