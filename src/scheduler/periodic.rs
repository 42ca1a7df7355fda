// src/scheduler/periodic.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::errors::{Result, SesameError};

use super::task::{PeriodicTask, TaskControl, TaskId};

/// Internal handle for a registered task.
///
/// - `cancel` stops future runs; dropping it has the same effect.
/// - `handle` is the Tokio task driving the tick loop.
struct ActiveTask {
    name: String,
    cancel: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    tasks: HashMap<TaskId, ActiveTask>,
    stopped: bool,
}

/// Runs [`PeriodicTask`]s on fixed intervals until stopped.
///
/// Every task gets its own Tokio task, so tasks are concurrent with each
/// other and with the caller. A given task never overlaps with itself: the
/// next tick is only awaited once the current run has returned.
///
/// Dropping the scheduler stops it, so background tasks cannot outlive the
/// scope that created them (including when that scope unwinds).
pub struct Scheduler {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reg = self.lock();
        f.debug_struct("Scheduler")
            .field("tasks", &reg.tasks.len())
            .field("stopped", &reg.stopped)
            .finish()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        lock_registry(&self.registry)
    }

    /// Register `task` to run every `interval`, first run one interval from
    /// now. Must be called from within a Tokio runtime.
    pub fn add<T: PeriodicTask>(&self, interval: Duration, task: T) -> Result<TaskId> {
        if interval.is_zero() {
            return Err(SesameError::Scheduling(format!(
                "task '{}' needs an interval > 0",
                task.name()
            )));
        }

        let mut reg = self.lock();
        if reg.stopped {
            return Err(SesameError::Scheduling(format!(
                "scheduler is stopped; cannot add task '{}'",
                task.name()
            )));
        }

        reg.next_id += 1;
        let id = TaskId(reg.next_id);
        let name = task.name().to_string();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        // The registry lock is held until the entry is inserted, so a task
        // that finishes immediately still finds itself when deregistering.
        let handle = tokio::spawn(tick_loop(
            id,
            interval,
            Box::new(task),
            cancel_rx,
            Arc::downgrade(&self.registry),
        ));

        info!(task = %name, %id, ?interval, "scheduled periodic task");
        reg.tasks.insert(
            id,
            ActiveTask {
                name,
                cancel: Some(cancel_tx),
                handle,
            },
        );

        Ok(id)
    }

    /// Cancel future runs of `id`. A run already in progress completes.
    /// Unknown or already-removed ids are ignored.
    pub fn remove(&self, id: TaskId) {
        let removed = self.lock().tasks.remove(&id);
        match removed {
            Some(active) => {
                debug!(task = %active.name, %id, "removing periodic task");
                cancel(active);
            }
            None => debug!(%id, "remove: task not registered (already finished or removed)"),
        }
    }

    /// Cancel every task and refuse new ones. Idempotent.
    pub fn stop(&self) {
        let drained: Vec<ActiveTask> = {
            let mut reg = self.lock();
            if reg.stopped && reg.tasks.is_empty() {
                return;
            }
            reg.stopped = true;
            reg.tasks.drain().map(|(_, task)| task).collect()
        };

        info!(cancelled = drained.len(), "stopping scheduler");
        for active in drained {
            cancel(active);
        }
    }

    /// Number of tasks still registered.
    pub fn task_count(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.lock().tasks.contains_key(&id)
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A panic while holding the lock cannot leave the map half-updated.
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn cancel(mut active: ActiveTask) {
    if let Some(tx) = active.cancel.take() {
        if tx.send(()).is_err() && !active.handle.is_finished() {
            debug!(task = %active.name, "tick loop already gone while cancelling");
        }
    }
}

async fn tick_loop(
    id: TaskId,
    period: Duration,
    mut task: Box<dyn PeriodicTask>,
    mut cancel_rx: oneshot::Receiver<()>,
    registry: Weak<Mutex<Registry>>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut cancel_rx => {
                debug!(task = %task.name(), %id, "periodic task cancelled");
                return;
            }

            _ = ticker.tick() => {}
        }

        match task.run().await {
            Ok(TaskControl::Continue) => {}
            Ok(TaskControl::Finished) => {
                debug!(task = %task.name(), %id, "periodic task finished; deregistering");
                if let Some(registry) = registry.upgrade() {
                    lock_registry(&registry).tasks.remove(&id);
                }
                return;
            }
            Err(err) => {
                error!(task = %task.name(), %id, error = %err, "periodic task run failed");
            }
        }
    }
}
