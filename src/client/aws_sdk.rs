// src/client/aws_sdk.rs

//! [`AutomationClient`] backed by the AWS SDK.
//!
//! Automation, tag and command calls go to SSM; tags of plain EC2 instances
//! go to EC2. Credentials come from the default provider chain. Region,
//! profile and endpoint can be pinned through `[aws]` or the CLI.
//!
//! Every SDK failure becomes [`SesameError::RemoteService`] carrying the full
//! error chain.

use std::collections::{BTreeMap, HashMap};

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ec2::types::{Filter, TagDescription};
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::types as ssm;
use tracing::{debug, info};

use crate::client::model::{
    CommandInvocation, CommandPlugin, ExecutionDetail, ExecutionFilter, ExecutionFilterKey,
    ExecutionMetadata, StepExecution, Tag,
};
use crate::client::{AutomationClient, BoxFuture};
use crate::config::AwsSection;
use crate::errors::{Result, SesameError};
use crate::types::ResourceKind;

#[derive(Clone)]
pub struct AwsSdkClient {
    ssm: aws_sdk_ssm::Client,
    ec2: aws_sdk_ec2::Client,
}

impl std::fmt::Debug for AwsSdkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSdkClient")
            .field("region", &self.ssm.config().region())
            .finish()
    }
}

impl AwsSdkClient {
    /// Load the shared SDK configuration and build both service clients.
    ///
    /// Unset values fall back to the usual chain: `AWS_REGION`,
    /// `AWS_PROFILE`, the shared config files, then instance metadata.
    pub async fn from_config(aws: &AwsSection) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &aws.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &aws.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &aws.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        info!(
            region = ?sdk_config.region(),
            profile = ?aws.profile,
            endpoint = ?aws.endpoint_url,
            "initialised AWS clients"
        );

        Self::from_sdk_config(&sdk_config)
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self {
            ssm: aws_sdk_ssm::Client::new(sdk_config),
            ec2: aws_sdk_ec2::Client::new(sdk_config),
        }
    }
}

fn remote<E: std::error::Error>(operation: &str, err: E) -> SesameError {
    SesameError::RemoteService(format!("{operation}: {}", DisplayErrorContext(err)))
}

fn execution_filter(filter: &ExecutionFilter) -> Result<ssm::AutomationExecutionFilter> {
    let key = match filter.key {
        ExecutionFilterKey::ExecutionId => ssm::AutomationExecutionFilterKey::ExecutionId,
        ExecutionFilterKey::ParentExecutionId => ssm::AutomationExecutionFilterKey::ParentExecutionId,
    };
    ssm::AutomationExecutionFilter::builder()
        .key(key)
        .set_values(Some(filter.values.clone()))
        .build()
        .map_err(|err| SesameError::Other(anyhow::Error::new(err).context("building execution filter")))
}

fn outputs_from_sdk(outputs: Option<&HashMap<String, Vec<String>>>) -> BTreeMap<String, Vec<String>> {
    outputs
        .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

fn metadata_from_sdk(meta: &ssm::AutomationExecutionMetadata) -> ExecutionMetadata {
    ExecutionMetadata {
        execution_id: meta.automation_execution_id().unwrap_or_default().to_string(),
        parent_execution_id: meta.parent_automation_execution_id().map(str::to_string),
        target: meta.target().map(str::to_string),
        document_name: meta.document_name().unwrap_or_default().to_string(),
        // A missing status stays empty and classifies as failed.
        raw_status: meta
            .automation_execution_status()
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
        outputs: outputs_from_sdk(meta.outputs()),
        failure_message: meta.failure_message().map(str::to_string),
    }
}

fn ssm_tag_from_sdk(tag: &ssm::Tag) -> Tag {
    Tag {
        key: tag.key().to_string(),
        value: tag.value().to_string(),
    }
}

fn ec2_tag_from_sdk(tag: &TagDescription) -> Tag {
    Tag {
        key: tag.key().unwrap_or_default().to_string(),
        value: tag.value().unwrap_or_default().to_string(),
    }
}

fn step_from_sdk(step: &ssm::StepExecution) -> StepExecution {
    StepExecution {
        step_name: step.step_name().unwrap_or_default().to_string(),
        step_status: step
            .step_status()
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
        step_execution_id: step.step_execution_id().unwrap_or_default().to_string(),
        inputs: step
            .inputs()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
        outputs: outputs_from_sdk(step.outputs()),
    }
}

fn invocation_from_sdk(invocation: &ssm::CommandInvocation) -> CommandInvocation {
    CommandInvocation {
        command_id: invocation.command_id().unwrap_or_default().to_string(),
        instance_id: invocation.instance_id().unwrap_or_default().to_string(),
        status: invocation
            .status()
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
        command_plugins: invocation
            .command_plugins()
            .iter()
            .map(|plugin| CommandPlugin {
                name: plugin.name().unwrap_or_default().to_string(),
                status: plugin
                    .status()
                    .map(|status| status.as_str().to_string())
                    .unwrap_or_default(),
                output: plugin.output().map(str::to_string),
            })
            .collect(),
    }
}

impl AutomationClient for AwsSdkClient {
    fn describe_executions(
        &self,
        filter: ExecutionFilter,
        max_results: u32,
    ) -> BoxFuture<'_, Result<Vec<ExecutionMetadata>>> {
        Box::pin(async move {
            let sdk_filter = execution_filter(&filter)?;
            let max_results = i32::try_from(max_results)
                .map_err(|_| SesameError::Config(format!("max_results out of range: {max_results}")))?;
            debug!(key = %filter.key, values = ?filter.values, max_results, "describe automation executions");

            let out = self
                .ssm
                .describe_automation_executions()
                .filters(sdk_filter)
                .max_results(max_results)
                .send()
                .await
                .map_err(|err| remote("DescribeAutomationExecutions", err))?;

            Ok(out
                .automation_execution_metadata_list()
                .iter()
                .map(metadata_from_sdk)
                .collect())
        })
    }

    fn list_tags_for_resource(
        &self,
        resource_id: String,
        kind: ResourceKind,
    ) -> BoxFuture<'_, Result<Vec<Tag>>> {
        Box::pin(async move {
            debug!(%resource_id, ?kind, "list tags");
            match kind {
                ResourceKind::ManagedInstance => {
                    let out = self
                        .ssm
                        .list_tags_for_resource()
                        .resource_type(ssm::ResourceTypeForTagging::ManagedInstance)
                        .resource_id(resource_id)
                        .send()
                        .await
                        .map_err(|err| remote("ListTagsForResource", err))?;
                    Ok(out.tag_list().iter().map(ssm_tag_from_sdk).collect())
                }
                ResourceKind::Ec2Instance => {
                    let out = self
                        .ec2
                        .describe_tags()
                        .filters(Filter::builder().name("resource-id").values(resource_id).build())
                        .send()
                        .await
                        .map_err(|err| remote("DescribeTags", err))?;
                    Ok(out.tags().iter().map(ec2_tag_from_sdk).collect())
                }
            }
        })
    }

    fn describe_step_executions(
        &self,
        execution_id: String,
    ) -> BoxFuture<'_, Result<Vec<StepExecution>>> {
        Box::pin(async move {
            let out = self
                .ssm
                .describe_automation_step_executions()
                .automation_execution_id(execution_id)
                .reverse_order(true)
                .send()
                .await
                .map_err(|err| remote("DescribeAutomationStepExecutions", err))?;
            Ok(out.step_executions().iter().map(step_from_sdk).collect())
        })
    }

    fn get_execution_detail(&self, execution_id: String) -> BoxFuture<'_, Result<ExecutionDetail>> {
        Box::pin(async move {
            let out = self
                .ssm
                .get_automation_execution()
                .automation_execution_id(execution_id.clone())
                .send()
                .await
                .map_err(|err| remote("GetAutomationExecution", err))?;

            let steps = out
                .automation_execution()
                .map(|execution| execution.step_executions().iter().map(step_from_sdk).collect())
                .unwrap_or_default();
            Ok(ExecutionDetail {
                execution_id,
                step_executions: steps,
            })
        })
    }

    fn list_command_invocations(
        &self,
        command_id: String,
        instance_id: String,
    ) -> BoxFuture<'_, Result<Vec<CommandInvocation>>> {
        Box::pin(async move {
            let out = self
                .ssm
                .list_command_invocations()
                .command_id(command_id)
                .instance_id(instance_id)
                .details(true)
                .send()
                .await
                .map_err(|err| remote("ListCommandInvocations", err))?;
            Ok(out.command_invocations().iter().map(invocation_from_sdk).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusClass;

    #[test]
    fn filter_keys_map_onto_the_service_enum() {
        let filter = execution_filter(&ExecutionFilter::by_parent("exec-9")).unwrap();
        assert_eq!(filter.key(), &ssm::AutomationExecutionFilterKey::ParentExecutionId);
        assert_eq!(filter.values().to_vec(), vec!["exec-9".to_string()]);

        let filter = execution_filter(&ExecutionFilter::by_execution_id("exec-1")).unwrap();
        assert_eq!(filter.key(), &ssm::AutomationExecutionFilterKey::ExecutionId);
    }

    #[test]
    fn child_metadata_is_mapped_field_by_field() {
        let sdk = ssm::AutomationExecutionMetadata::builder()
            .automation_execution_id("child-1")
            .parent_automation_execution_id("exec-2")
            .document_name("AWS-RunShellScript")
            .automation_execution_status(ssm::AutomationExecutionStatus::Failed)
            .target("mi-bbb")
            .outputs("runShell.Output", vec!["hello".to_string()])
            .failure_message("boom")
            .build();

        let meta = metadata_from_sdk(&sdk);
        assert_eq!(meta.execution_id, "child-1");
        assert_eq!(meta.parent_execution_id.as_deref(), Some("exec-2"));
        assert_eq!(meta.target_id(), "mi-bbb");
        assert_eq!(meta.raw_status, "Failed");
        assert_eq!(meta.class(), StatusClass::Failed);
        assert_eq!(meta.outputs["runShell.Output"], vec!["hello".to_string()]);
        assert_eq!(meta.failure_message.as_deref(), Some("boom"));
    }

    #[test]
    fn statuses_unknown_to_the_sdk_keep_their_text_and_fail_closed() {
        let sdk = ssm::AutomationExecutionMetadata::builder()
            .automation_execution_id("exec-4")
            .automation_execution_status(ssm::AutomationExecutionStatus::from("Teleporting"))
            .build();
        let meta = metadata_from_sdk(&sdk);
        assert_eq!(meta.raw_status, "Teleporting");
        assert_eq!(meta.class(), StatusClass::Failed);

        let bare = metadata_from_sdk(&ssm::AutomationExecutionMetadata::builder().build());
        assert!(bare.execution_id.is_empty());
        assert!(bare.outputs.is_empty());
        assert_eq!(bare.class(), StatusClass::Failed);
    }

    #[test]
    fn ec2_tags_tolerate_missing_values() {
        let tag = ec2_tag_from_sdk(&TagDescription::builder().key("Name").resource_id("i-1").build());
        assert_eq!(tag.key, "Name");
        assert_eq!(tag.value, "");
    }

    #[test]
    fn step_inputs_and_command_ids_survive_mapping() {
        let sdk = ssm::StepExecution::builder()
            .step_name("runShell")
            .step_status(ssm::AutomationExecutionStatus::Success)
            .step_execution_id("step-1")
            .inputs("InstanceIds", "[\"i-1\"]")
            .outputs("CommandId", vec!["cmd-1".to_string()])
            .build();

        let step = step_from_sdk(&sdk);
        assert_eq!(step.step_status, "Success");
        assert_eq!(step.inputs["InstanceIds"], "[\"i-1\"]");
        assert_eq!(step.command_ids(), ["cmd-1".to_string()]);
    }

    #[test]
    fn command_plugins_keep_absent_output_absent() {
        let sdk = ssm::CommandInvocation::builder()
            .command_id("cmd-1")
            .instance_id("i-1")
            .status(ssm::CommandInvocationStatus::Success)
            .command_plugins(
                ssm::CommandPlugin::builder()
                    .name("aws:runShellScript")
                    .status(ssm::CommandPluginStatus::Success)
                    .output("hi")
                    .build(),
            )
            .command_plugins(ssm::CommandPlugin::builder().name("aws:noop").build())
            .build();

        let invocation = invocation_from_sdk(&sdk);
        assert_eq!(invocation.status, "Success");
        assert_eq!(invocation.command_plugins.len(), 2);
        assert_eq!(invocation.command_plugins[0].output.as_deref(), Some("hi"));
        assert_eq!(invocation.command_plugins[1].output, None);
    }
}
