// src/status.rs

//! Status classification for automation executions.
//!
//! The remote service reports an open-ended vocabulary of raw statuses
//! (`"InProgress"`, `"CompletedWithFailure"`, ...). Everything the tracker
//! decides is based on the closed [`StatusClass`] derived here:
//!
//! ```text
//!             /- Succeeded : Success, CompletedWithSuccess
//! terminal  =
//!             \- Failed    : TimedOut, Cancelled, Failed, Rejected,
//!                            CompletedWithFailure, <anything unknown>
//!
//! pending   =    Pending   : Pending, InProgress, Waiting, Cancelling,
//!                            PendingApproval, Approved, Scheduled,
//!                            RunbookInProgress, PendingChangeCalendarOverride,
//!                            ChangeCalendarOverrideApproved,
//!                            ChangeCalendarOverrideRejected
//! ```
//!
//! Unknown values classify as `Failed` so a status added by the service can
//! never leave the tracker waiting forever.

use std::fmt;

/// Closed classification of a raw execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Pending,
    Succeeded,
    Failed,
}

impl StatusClass {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatusClass::Pending)
    }

    pub fn color(self) -> DisplayColor {
        display_color(self)
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusClass::Pending => "Pending",
            StatusClass::Succeeded => "Succeeded",
            StatusClass::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// Known raw statuses of an automation execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Pending,
    InProgress,
    Waiting,
    Success,
    TimedOut,
    Cancelling,
    Cancelled,
    Failed,
    PendingApproval,
    Approved,
    Rejected,
    Scheduled,
    RunbookInProgress,
    PendingChangeCalendarOverride,
    ChangeCalendarOverrideApproved,
    ChangeCalendarOverrideRejected,
    CompletedWithSuccess,
    CompletedWithFailure,
    /// A value outside the known vocabulary, kept verbatim for display.
    Unrecognized(String),
}

const KNOWN: &[(&str, ExecutionStatus)] = &[
    ("Pending", ExecutionStatus::Pending),
    ("InProgress", ExecutionStatus::InProgress),
    ("Waiting", ExecutionStatus::Waiting),
    ("Success", ExecutionStatus::Success),
    ("TimedOut", ExecutionStatus::TimedOut),
    ("Cancelling", ExecutionStatus::Cancelling),
    ("Cancelled", ExecutionStatus::Cancelled),
    ("Failed", ExecutionStatus::Failed),
    ("PendingApproval", ExecutionStatus::PendingApproval),
    ("Approved", ExecutionStatus::Approved),
    ("Rejected", ExecutionStatus::Rejected),
    ("Scheduled", ExecutionStatus::Scheduled),
    ("RunbookInProgress", ExecutionStatus::RunbookInProgress),
    ("PendingChangeCalendarOverride", ExecutionStatus::PendingChangeCalendarOverride),
    ("ChangeCalendarOverrideApproved", ExecutionStatus::ChangeCalendarOverrideApproved),
    ("ChangeCalendarOverrideRejected", ExecutionStatus::ChangeCalendarOverrideRejected),
    ("CompletedWithSuccess", ExecutionStatus::CompletedWithSuccess),
    ("CompletedWithFailure", ExecutionStatus::CompletedWithFailure),
];

impl ExecutionStatus {
    /// Every known raw value in its canonical spelling.
    pub fn known_values() -> impl Iterator<Item = &'static str> {
        KNOWN.iter().map(|(name, _)| *name)
    }

    /// Parse a raw value. Matching ignores case, `-` and `_`, so
    /// `"InProgress"`, `"in-progress"` and `"IN_PROGRESS"` are the same status.
    pub fn parse(raw: &str) -> Self {
        let wanted = normalize(raw);
        KNOWN
            .iter()
            .find(|(name, _)| normalize(name) == wanted)
            .map(|(_, status)| status.clone())
            .unwrap_or_else(|| ExecutionStatus::Unrecognized(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        if let ExecutionStatus::Unrecognized(raw) = self {
            return raw;
        }
        KNOWN
            .iter()
            .find(|(_, status)| status == self)
            .map(|(name, _)| *name)
            .unwrap_or("Unrecognized")
    }

    pub fn class(&self) -> StatusClass {
        use ExecutionStatus::*;
        match self {
            Success | CompletedWithSuccess => StatusClass::Succeeded,
            TimedOut | Cancelled | Failed | Rejected | CompletedWithFailure => StatusClass::Failed,
            Pending
            | InProgress
            | Waiting
            | Cancelling
            | PendingApproval
            | Approved
            | Scheduled
            | RunbookInProgress
            | PendingChangeCalendarOverride
            | ChangeCalendarOverrideApproved
            | ChangeCalendarOverrideRejected => StatusClass::Pending,
            Unrecognized(_) => StatusClass::Failed,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classify a raw status value. Total: unknown input is `Failed`.
pub fn classify(raw: &str) -> StatusClass {
    ExecutionStatus::parse(raw).class()
}

pub fn is_terminal(raw: &str) -> bool {
    classify(raw).is_terminal()
}

/// Terminal colour used when printing a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayColor {
    Amber,
    Green,
    Red,
}

impl DisplayColor {
    fn ansi_code(self) -> &'static str {
        match self {
            DisplayColor::Amber => "\x1b[33m",
            DisplayColor::Green => "\x1b[32m",
            DisplayColor::Red => "\x1b[31m",
        }
    }

    /// Wrap `text` in this colour's ANSI escape sequence.
    pub fn paint(self, text: &str) -> String {
        format!("{}{}\x1b[0m", self.ansi_code(), text)
    }
}

pub fn display_color(class: StatusClass) -> DisplayColor {
    match class {
        StatusClass::Pending => DisplayColor::Amber,
        StatusClass::Succeeded => DisplayColor::Green,
        StatusClass::Failed => DisplayColor::Red,
    }
}
