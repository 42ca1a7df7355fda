// src/tracker/signal.rs

use std::fmt;

use crate::status::StatusClass;

/// Message from a background poll task to the foreground read loop.
///
/// Every tick of either task produces at most one signal, so each read of
/// the channel corresponds to one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The parent reached a terminal class.
    ParentFinished(StatusClass),
    /// Children polled; not all of them are terminal yet.
    ChildrenProgress { finished: usize, total: usize },
    /// Every child is terminal.
    ChildrenDone { total: usize },
    /// A tick was skipped because the remote call failed.
    TickFailed { task: String, error: String },
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::ParentFinished(class) => write!(f, "{class}"),
            Signal::ChildrenProgress { finished, total } => {
                write!(f, "children {finished}/{total} finished")
            }
            Signal::ChildrenDone { total } => write!(f, "DONE ({total} children)"),
            Signal::TickFailed { task, error } => write!(f, "{task} tick skipped: {error}"),
        }
    }
}
