// src/tracker/detail.rs

//! Step-level enrichment for terminal children.
//!
//! For a finished child we list its steps (newest first) and, for every step
//! that ran a remote command, print the per-host command output indented
//! under it. This is best effort: failures are logged and never abort the
//! surrounding poll.

use tracing::{debug, warn};

use crate::client::{AutomationClient, ExecutionMetadata};
use crate::errors::Result;
use crate::tracker::report::{ProgressSink, indent_output};

/// Print step and command detail for `child`, logging instead of returning
/// any error.
pub async fn report_step_detail(
    client: &dyn AutomationClient,
    sink: &dyn ProgressSink,
    child: &ExecutionMetadata,
) {
    if let Err(err) = try_report_step_detail(client, sink, child).await {
        warn!(
            execution_id = %child.execution_id,
            error = %err,
            "could not fetch step detail; continuing without it"
        );
    }
}

async fn try_report_step_detail(
    client: &dyn AutomationClient,
    sink: &dyn ProgressSink,
    child: &ExecutionMetadata,
) -> Result<()> {
    let steps = client
        .describe_step_executions(child.execution_id.clone())
        .await?;
    if steps.is_empty() {
        debug!(execution_id = %child.execution_id, "child has no step executions");
        return Ok(());
    }

    for step in &steps {
        sink.emit(&format!(
            " STEP: {} {} {}",
            step.step_name, step.step_status, step.step_execution_id
        ));
    }

    let detail = client.get_execution_detail(child.execution_id.clone()).await?;
    for step in &detail.step_executions {
        let instance_ids = step
            .inputs
            .get("InstanceIds")
            .map(|raw| parse_instance_ids(raw))
            .unwrap_or_default();

        for command_id in step.command_ids() {
            for instance_id in &instance_ids {
                let invocations = client
                    .list_command_invocations(command_id.clone(), instance_id.clone())
                    .await?;
                for invocation in &invocations {
                    for plugin in &invocation.command_plugins {
                        match plugin.output.as_deref() {
                            Some("") => sink.emit(&format!(
                                " STEP: [{}:{}]: output: -empty-",
                                plugin.name, command_id
                            )),
                            Some(output) => sink.emit(&format!(
                                " STEP: [{}:{}]: output: \n\t{}",
                                plugin.name,
                                command_id,
                                indent_output(output)
                            )),
                            None => {}
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Instance ids from a step's `InstanceIds` input.
///
/// The service hands step inputs back as strings, so a list arrives as JSON
/// text (`["i-1","i-2"]`). A bare id is accepted too.
pub fn parse_instance_ids(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(trimmed) {
        Ok(ids) => ids.into_iter().filter(|id| !id.is_empty()).collect(),
        Err(_) => trimmed
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|id| id.trim().trim_matches('"').to_string())
            .filter(|id| !id.is_empty())
            .collect(),
    }
}
