// src/tracker/parent.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::client::{AutomationClient, BoxFuture, ExecutionFilter, ExecutionMetadata};
use crate::errors::{Result, SesameError};
use crate::scheduler::{PeriodicTask, TaskControl};
use crate::status::StatusClass;
use crate::tracker::report::{ProgressSink, parent_outcome_line, parent_status_line};
use crate::tracker::signal::Signal;

/// Fetch the parent execution by id.
///
/// Zero results is [`SesameError::NotFound`]: the id does not exist or the
/// caller cannot see it. If the filter ever returns more than one entry the
/// first one wins.
pub async fn fetch_parent(
    client: &dyn AutomationClient,
    execution_id: &str,
    max_results: u32,
) -> Result<ExecutionMetadata> {
    let mut found = client
        .describe_executions(ExecutionFilter::by_execution_id(execution_id), max_results)
        .await?;

    if found.len() > 1 {
        debug!(execution_id, matches = found.len(), "execution id filter matched several entries; using the first");
    }

    if found.is_empty() {
        Err(SesameError::NotFound(execution_id.to_string()))
    } else {
        Ok(found.swap_remove(0))
    }
}

/// Recurring check of the parent execution.
///
/// Sends [`Signal::ParentFinished`] and finishes once the parent is terminal;
/// otherwise repeats silently.
pub struct ParentPollTask {
    client: Arc<dyn AutomationClient>,
    sink: Arc<dyn ProgressSink>,
    execution_id: String,
    max_results: u32,
    signals: mpsc::Sender<Signal>,
}

impl ParentPollTask {
    pub fn new(
        client: Arc<dyn AutomationClient>,
        sink: Arc<dyn ProgressSink>,
        execution_id: String,
        max_results: u32,
        signals: mpsc::Sender<Signal>,
    ) -> Self {
        Self {
            client,
            sink,
            execution_id,
            max_results,
            signals,
        }
    }

    async fn poll_once(&mut self) -> Result<TaskControl> {
        let parent = match fetch_parent(self.client.as_ref(), &self.execution_id, self.max_results).await {
            Ok(parent) => parent,
            Err(err) => {
                warn!(execution_id = %self.execution_id, error = %err, "parent poll failed; skipping tick");
                send(&self.signals, Signal::TickFailed {
                    task: self.name().to_string(),
                    error: err.to_string(),
                })
                .await;
                return Err(err);
            }
        };

        self.sink.emit(&parent_status_line(&parent));

        let class = parent.class();
        if class == StatusClass::Pending {
            debug!(execution_id = %self.execution_id, status = %parent.raw_status, "parent still pending");
            return Ok(TaskControl::Continue);
        }

        self.sink.emit(&parent_outcome_line(&self.execution_id, class));
        send(&self.signals, Signal::ParentFinished(class)).await;
        Ok(TaskControl::Finished)
    }
}

impl PeriodicTask for ParentPollTask {
    fn name(&self) -> &str {
        "poll-parent"
    }

    fn run(&mut self) -> BoxFuture<'_, Result<TaskControl>> {
        Box::pin(self.poll_once())
    }
}

/// Deliver a signal; a closed channel only means the foreground stopped
/// listening.
pub(crate) async fn send(signals: &mpsc::Sender<Signal>, signal: Signal) {
    if let Err(err) = signals.send(signal).await {
        debug!(signal = ?err.0, "foreground no longer reading signals; dropping");
    }
}
