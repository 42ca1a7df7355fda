// src/scheduler/mod.rs

//! Periodic task scheduler.
//!
//! Runs named, independently cancellable tasks on fixed intervals in the
//! background, without knowing what the tasks do.
//!
//! - [`task`] defines the [`PeriodicTask`] trait and the handles it uses.
//! - [`periodic`] owns the [`Scheduler`] and the per-task tick loops.

pub mod periodic;
pub mod task;

pub use periodic::Scheduler;
pub use task::{PeriodicTask, TaskControl, TaskId};
