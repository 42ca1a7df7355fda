// src/scheduler/task.rs

use std::fmt;

use crate::client::BoxFuture;
use crate::errors::Result;

/// Handle returned by [`Scheduler::add`](super::Scheduler::add).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// What a task wants after one of its runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// Run again on the next tick.
    Continue,
    /// Deregister this task; no further runs.
    Finished,
}

/// A unit of recurring work.
///
/// A task owns whatever state it needs between runs. It cannot register
/// other tasks: scheduling decisions belong to whoever owns the scheduler.
pub trait PeriodicTask: Send + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Execute one run. An `Err` is logged by the scheduler and the task
    /// keeps its schedule.
    fn run(&mut self) -> BoxFuture<'_, Result<TaskControl>>;
}
