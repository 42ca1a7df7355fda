// src/tracker/children.rs

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::client::{AutomationClient, BoxFuture, ExecutionFilter, ExecutionMetadata, tag_value};
use crate::errors::Result;
use crate::scheduler::{PeriodicTask, TaskControl};
use crate::tracker::detail::report_step_detail;
use crate::tracker::parent::send;
use crate::tracker::report::{ProgressSink, child_line, output_lines};
use crate::tracker::signal::Signal;
use crate::types::ResourceKind;

/// Settings the children pass needs, and nothing else.
#[derive(Debug, Clone)]
pub struct ChildrenSettings {
    pub parent_execution_id: String,
    pub max_results: u32,
    pub name_tag: String,
    pub step_detail: bool,
    pub reprint_finished: bool,
}

/// Result of looking at the children once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildrenSummary {
    pub total: usize,
    pub finished: usize,
}

impl ChildrenSummary {
    /// True when there is at least one child and every child is terminal.
    pub fn all_terminal(&self) -> bool {
        self.total > 0 && self.finished == self.total
    }
}

/// Friendly name of a target host, from its tags. Empty when untagged.
pub async fn resolve_friendly_name(
    client: &dyn AutomationClient,
    target: &str,
    name_tag: &str,
) -> Result<String> {
    if target.is_empty() {
        return Ok(String::new());
    }
    let kind = ResourceKind::for_target(target);
    let tags = client.list_tags_for_resource(target.to_string(), kind).await?;
    Ok(tag_value(&tags, name_tag).unwrap_or_default().to_string())
}

/// Like [`resolve_friendly_name`], but a failed lookup only costs the name.
async fn friendly_name_or_blank(client: &dyn AutomationClient, target: &str, name_tag: &str) -> String {
    match resolve_friendly_name(client, target, name_tag).await {
        Ok(name) => name,
        Err(err) => {
            warn!(resource = %target, error = %err, "tag lookup failed; printing child without a name");
            String::new()
        }
    }
}

/// Children are remembered by target host; a child without a target falls
/// back to its own execution id.
fn child_key(child: &ExecutionMetadata) -> &str {
    child.target.as_deref().unwrap_or(&child.execution_id)
}

/// Fetch the children of the parent.
pub async fn fetch_children(
    client: &dyn AutomationClient,
    settings: &ChildrenSettings,
) -> Result<Vec<ExecutionMetadata>> {
    client
        .describe_executions(
            ExecutionFilter::by_parent(settings.parent_execution_id.as_str()),
            settings.max_results,
        )
        .await
}

/// Print every terminal child not reported before, in the order the service
/// returned them, and count how many are terminal.
///
/// `reported` holds the keys of children already printed; with
/// `reprint_finished` set every terminal child is printed on every pass.
pub async fn report_children(
    client: &dyn AutomationClient,
    sink: &dyn ProgressSink,
    settings: &ChildrenSettings,
    children: &[ExecutionMetadata],
    reported: &mut HashSet<String>,
) -> Result<ChildrenSummary> {
    let mut summary = ChildrenSummary {
        total: children.len(),
        finished: 0,
    };

    for child in children {
        let class = child.class();
        if !class.is_terminal() {
            debug!(
                execution_id = %child.execution_id,
                target = %child.target_id(),
                status = %child.raw_status,
                "child pending"
            );
            continue;
        }
        summary.finished += 1;

        let key = child_key(child);
        if reported.contains(key) && !settings.reprint_finished {
            continue;
        }

        let name = friendly_name_or_blank(client, child.target_id(), &settings.name_tag).await;
        sink.emit(&child_line(child, &name));
        for line in output_lines(child) {
            sink.emit(&line);
        }
        if settings.step_detail {
            report_step_detail(client, sink, child).await;
        }

        reported.insert(key.to_string());
    }

    Ok(summary)
}

/// Recurring check of all first-level children.
///
/// Each tick sends either [`Signal::ChildrenProgress`] or, once every child
/// is terminal, [`Signal::ChildrenDone`] and finishes.
pub struct ChildrenPollTask {
    client: Arc<dyn AutomationClient>,
    sink: Arc<dyn ProgressSink>,
    settings: ChildrenSettings,
    signals: mpsc::Sender<Signal>,
    reported: HashSet<String>,
}

impl ChildrenPollTask {
    pub fn new(
        client: Arc<dyn AutomationClient>,
        sink: Arc<dyn ProgressSink>,
        settings: ChildrenSettings,
        signals: mpsc::Sender<Signal>,
    ) -> Self {
        Self {
            client,
            sink,
            settings,
            signals,
            reported: HashSet::new(),
        }
    }

    async fn pass(&mut self) -> Result<ChildrenSummary> {
        let children = fetch_children(self.client.as_ref(), &self.settings).await?;
        report_children(
            self.client.as_ref(),
            self.sink.as_ref(),
            &self.settings,
            &children,
            &mut self.reported,
        )
        .await
    }

    async fn poll_once(&mut self) -> Result<TaskControl> {
        let summary = match self.pass().await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(
                    execution_id = %self.settings.parent_execution_id,
                    error = %err,
                    "children poll failed; skipping tick"
                );
                send(&self.signals, Signal::TickFailed {
                    task: "poll-children".to_string(),
                    error: err.to_string(),
                })
                .await;
                return Err(err);
            }
        };

        if summary.all_terminal() {
            send(&self.signals, Signal::ChildrenDone { total: summary.total }).await;
            return Ok(TaskControl::Finished);
        }

        send(&self.signals, Signal::ChildrenProgress {
            finished: summary.finished,
            total: summary.total,
        })
        .await;
        Ok(TaskControl::Continue)
    }
}

impl PeriodicTask for ChildrenPollTask {
    fn name(&self) -> &str {
        "poll-children"
    }

    fn run(&mut self) -> BoxFuture<'_, Result<TaskControl>> {
        Box::pin(self.poll_once())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_needs_at_least_one_child() {
        assert!(!ChildrenSummary { total: 0, finished: 0 }.all_terminal());
        assert!(!ChildrenSummary { total: 3, finished: 2 }.all_terminal());
        assert!(ChildrenSummary { total: 3, finished: 3 }.all_terminal());
    }
}
