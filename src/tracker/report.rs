// src/tracker/report.rs

//! Human-readable progress stream.
//!
//! The tracker writes progress through a [`ProgressSink`] so the same lines
//! can go to stdout in production and into memory in tests.

use crate::client::ExecutionMetadata;
use crate::status::StatusClass;

/// Destination for progress lines.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes every line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ProgressSink for StdoutSink {
    fn emit(&self, line: &str) {
        println!("{line}");
    }
}

/// `Parent document: InProgress [AWS-RunPatchBaseline]`
pub fn parent_status_line(parent: &ExecutionMetadata) -> String {
    let status = parent.status();
    format!(
        "Parent document: {} [{}]",
        parent.class().color().paint(status.as_str()),
        parent.document_name
    )
}

/// Printed once when the parent is known to be terminal.
pub fn parent_outcome_line(execution_id: &str, class: StatusClass) -> String {
    let verdict = match class {
        StatusClass::Succeeded => "Success!",
        StatusClass::Failed => "Failed!",
        StatusClass::Pending => "still pending",
    };
    format!(
        "PARENT: automation-id=[{execution_id}]: {}",
        class.color().paint(verdict)
    )
}

/// One line per child: document, coloured status, friendly name, target and
/// failure message (or `pending` while the child is not terminal).
pub fn child_line(child: &ExecutionMetadata, friendly_name: &str) -> String {
    let class = child.class();
    let status = child.status();
    let detail = if class.is_terminal() {
        child.failure_message.as_deref().unwrap_or("")
    } else {
        "pending"
    };
    format!(
        " CHILD: [{}]:[{}] {}[{}] : {}",
        child.document_name,
        class.color().paint(status.as_str()),
        friendly_name,
        child.target_id(),
        detail
    )
}

/// Output variables of a child, one line per variable.
pub fn output_lines(child: &ExecutionMetadata) -> Vec<String> {
    child
        .outputs
        .iter()
        .map(|(name, values)| format!("   {name}: {}", values.join(", ")))
        .collect()
}

/// Indent continuation lines of a command's output with a tab.
pub fn indent_output(output: &str) -> String {
    output.trim_end().replace('\n', "\n\t")
}
