// src/tracker/session.rs

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::AutomationClient;
use crate::errors::Result;
use crate::scheduler::Scheduler;
use crate::status::StatusClass;
use crate::tracker::children::{ChildrenPollTask, fetch_children, report_children};
use crate::tracker::parent::{ParentPollTask, fetch_parent};
use crate::tracker::report::{ProgressSink, parent_outcome_line, parent_status_line};
use crate::tracker::signal::Signal;
use crate::tracker::{TrackOutcome, TrackReport, TrackerOptions};

/// Tracks one parent execution and its first-level children.
///
/// The tracker does a single synchronous check of the parent. A terminal
/// parent is reported straight away (plus one pass over the children if it
/// succeeded) and no background work is started. A pending parent gets two
/// poll tasks on a [`Scheduler`], and the tracker reads their signals until
/// the children are done or the poll budget is spent.
pub struct ExecutionTracker {
    client: Arc<dyn AutomationClient>,
    sink: Arc<dyn ProgressSink>,
    options: TrackerOptions,
}

impl ExecutionTracker {
    pub fn new(
        client: Arc<dyn AutomationClient>,
        sink: Arc<dyn ProgressSink>,
        options: TrackerOptions,
    ) -> Self {
        Self {
            client,
            sink,
            options,
        }
    }

    /// Run to completion, budget exhaustion, or the first fatal error.
    pub async fn run(&self) -> Result<TrackReport> {
        self.options.validate()?;
        let id = &self.options.execution_id;
        info!(execution_id = %id, budget = %self.options.budget, "tracking automation execution");

        let parent = fetch_parent(self.client.as_ref(), id, self.options.max_results).await?;
        self.sink.emit(&parent_status_line(&parent));

        match parent.class() {
            StatusClass::Pending => self.poll_until_done().await,
            class => self.resolve(class).await,
        }
    }

    /// Parent already terminal: report once, list children once on success.
    async fn resolve(&self, class: StatusClass) -> Result<TrackReport> {
        let id = &self.options.execution_id;
        info!(execution_id = %id, parent = %class, "parent already terminal; no polling needed");
        self.sink.emit(&parent_outcome_line(id, class));

        if class == StatusClass::Succeeded {
            let settings = self.options.children_settings();
            let children = fetch_children(self.client.as_ref(), &settings).await?;
            if children.is_empty() {
                self.sink.emit(" CHILD: no child executions found");
            }
            let mut reported = HashSet::new();
            report_children(
                self.client.as_ref(),
                self.sink.as_ref(),
                &settings,
                &children,
                &mut reported,
            )
            .await?;
        }

        Ok(TrackReport {
            outcome: TrackOutcome::AlreadyFinished { parent: class },
            signal_reads: 0,
            tasks_registered: 0,
        })
    }

    async fn poll_until_done(&self) -> Result<TrackReport> {
        let options = &self.options;
        let scheduler = Scheduler::new();
        let (tx, mut rx) = mpsc::channel::<Signal>(options.signal_capacity);

        // The run loop keeps no sender of its own: once both tasks have
        // finished the channel closes and `recv` returns `None`.
        let parent_task = ParentPollTask::new(
            Arc::clone(&self.client),
            Arc::clone(&self.sink),
            options.execution_id.clone(),
            options.max_results,
            tx.clone(),
        );
        let children_task = ChildrenPollTask::new(
            Arc::clone(&self.client),
            Arc::clone(&self.sink),
            options.children_settings(),
            tx,
        );

        scheduler.add(options.poll_interval, parent_task)?;
        scheduler.add(options.poll_interval, children_task)?;
        let tasks_registered = scheduler.task_count();

        let mut reads: u32 = 0;
        let mut parent: Option<StatusClass> = None;

        let outcome = loop {
            if options.budget.is_exhausted(reads) {
                warn!(reads, budget = %options.budget, "poll budget exhausted before completion");
                self.sink.emit("  REPORT: poll budget exhausted, ending watch");
                break TrackOutcome::BudgetExhausted;
            }

            debug!(reads, "checking for signals");
            let Some(signal) = rx.recv().await else {
                self.sink.emit("  REPORT: nothing scheduled, ending watch");
                break TrackOutcome::Completed { parent };
            };
            reads += 1;
            self.sink.emit(&format!("  REPORT: {signal}"));

            match signal {
                Signal::ParentFinished(class) => parent = Some(class),
                Signal::ChildrenDone { .. } => break TrackOutcome::Completed { parent },
                // A finished parent that never fanned out has nothing left
                // to wait for.
                Signal::ChildrenProgress { total: 0, .. } if parent.is_some() => {
                    break TrackOutcome::Completed { parent };
                }
                Signal::ChildrenProgress { .. } | Signal::TickFailed { .. } => {}
            }
        };

        scheduler.stop();
        drop(rx);

        let outcome = match outcome {
            TrackOutcome::Completed { parent: None } => TrackOutcome::Completed {
                parent: self.final_parent_check().await,
            },
            other => other,
        };

        info!(?outcome, reads, "stopped tracking");
        Ok(TrackReport {
            outcome,
            signal_reads: reads,
            tasks_registered,
        })
    }

    /// Children finished before the parent task reported: look once more so
    /// the outcome carries the parent's class.
    async fn final_parent_check(&self) -> Option<StatusClass> {
        let id = &self.options.execution_id;
        match fetch_parent(self.client.as_ref(), id, self.options.max_results).await {
            Ok(parent) => {
                let class = parent.class();
                if class.is_terminal() {
                    self.sink.emit(&parent_outcome_line(id, class));
                    Some(class)
                } else {
                    debug!(execution_id = %id, status = %parent.raw_status, "children done, parent still pending");
                    None
                }
            }
            Err(err) => {
                warn!(execution_id = %id, error = %err, "final parent check failed");
                None
            }
        }
    }
}
