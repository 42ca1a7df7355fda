// src/tracker/mod.rs

//! Execution tracker: answers "is this job tree done, and how did it end?".
//!
//! One run goes through:
//!
//! ```text
//! Unstarted -> CheckingParentSync -> Resolved     -> Stopped
//!                                 \-> AsyncPolling -> Stopped
//! ```
//!
//! - [`session`] owns the run loop ([`ExecutionTracker`]).
//! - [`parent`] / [`children`] are the two recurring poll tasks.
//! - [`detail`] prints step and command output of finished children.
//! - [`report`] formats progress lines and defines the [`ProgressSink`].
//! - [`signal`] is the message type between poll tasks and the run loop.

use std::time::Duration;

use crate::config::TrackerSection;
use crate::errors::{Result, SesameError};
use crate::status::StatusClass;
use crate::types::PollBudget;

pub mod children;
pub mod detail;
pub mod parent;
pub mod report;
pub mod session;
pub mod signal;

pub use children::{ChildrenPollTask, ChildrenSettings, ChildrenSummary};
pub use parent::{ParentPollTask, fetch_parent};
pub use report::{ProgressSink, StdoutSink};
pub use session::ExecutionTracker;
pub use signal::Signal;

/// Everything one tracking run needs. Built per invocation; nothing is
/// shared between runs.
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    pub execution_id: String,
    pub poll_interval: Duration,
    pub budget: PollBudget,
    /// Page size for `describe_executions`; the service allows at most 50.
    pub max_results: u32,
    /// Tag key holding a host's friendly name.
    pub name_tag: String,
    pub step_detail: bool,
    /// Print terminal children again on every poll instead of once.
    pub reprint_finished_children: bool,
    pub signal_capacity: usize,
}

impl TrackerOptions {
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self::from_config(execution_id, &TrackerSection::default())
    }

    pub fn from_config(execution_id: impl Into<String>, section: &TrackerSection) -> Self {
        Self {
            execution_id: execution_id.into(),
            poll_interval: Duration::from_millis(section.poll_interval_ms),
            budget: section.max_poll_count,
            max_results: section.max_results,
            name_tag: section.name_tag.clone(),
            step_detail: section.step_detail,
            reprint_finished_children: section.reprint_finished_children,
            signal_capacity: section.signal_capacity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.execution_id.trim().is_empty() {
            return Err(SesameError::Config("execution id cannot be empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(SesameError::Config("poll interval must be > 0".to_string()));
        }
        if self.max_results == 0 {
            return Err(SesameError::Config("max_results must be >= 1".to_string()));
        }
        if self.signal_capacity < 2 {
            return Err(SesameError::Config("signal capacity must be >= 2".to_string()));
        }
        Ok(())
    }

    pub(crate) fn children_settings(&self) -> ChildrenSettings {
        ChildrenSettings {
            parent_execution_id: self.execution_id.clone(),
            max_results: self.max_results,
            name_tag: self.name_tag.clone(),
            step_detail: self.step_detail,
            reprint_finished: self.reprint_finished_children,
        }
    }
}

/// How a tracking run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// The parent was already terminal on the first check; nothing was
    /// scheduled.
    AlreadyFinished { parent: StatusClass },
    /// Polling observed completion. `parent` is `None` when the parent's
    /// final class could not be determined.
    Completed { parent: Option<StatusClass> },
    /// The poll budget ran out before completion was observed.
    BudgetExhausted,
}

impl TrackOutcome {
    /// Process exit code for this outcome.
    ///
    /// `0` finished (parent succeeded or unknown), `2` budget exhausted,
    /// `3` finished with a failed parent. Fatal errors exit with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            TrackOutcome::AlreadyFinished { parent: StatusClass::Failed }
            | TrackOutcome::Completed { parent: Some(StatusClass::Failed) } => 3,
            TrackOutcome::BudgetExhausted => 2,
            _ => 0,
        }
    }
}

/// Outcome plus bookkeeping about the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackReport {
    pub outcome: TrackOutcome,
    /// Signals read by the run loop.
    pub signal_reads: u32,
    /// Poll tasks registered with the scheduler (0 or 2).
    pub tasks_registered: usize,
}
