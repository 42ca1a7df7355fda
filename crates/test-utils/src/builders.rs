use std::collections::BTreeMap;

use sesame::client::{CommandInvocation, CommandPlugin, ExecutionMetadata, StepExecution, Tag};

/// Builder for `ExecutionMetadata` to simplify test setup.
pub struct ExecutionMetadataBuilder {
    meta: ExecutionMetadata,
}

impl ExecutionMetadataBuilder {
    /// A root execution with the given id.
    pub fn parent(id: &str) -> Self {
        Self {
            meta: ExecutionMetadata {
                execution_id: id.to_string(),
                parent_execution_id: None,
                target: None,
                document_name: "ParentDocument".to_string(),
                raw_status: "InProgress".to_string(),
                outputs: BTreeMap::new(),
                failure_message: None,
            },
        }
    }

    /// A child of `parent_id` running against `target`. Its execution id is
    /// derived from both.
    pub fn child(parent_id: &str, target: &str) -> Self {
        Self {
            meta: ExecutionMetadata {
                execution_id: format!("{parent_id}-{target}"),
                parent_execution_id: Some(parent_id.to_string()),
                target: Some(target.to_string()),
                document_name: "ChildDocument".to_string(),
                raw_status: "InProgress".to_string(),
                outputs: BTreeMap::new(),
                failure_message: None,
            },
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.meta.raw_status = status.to_string();
        self
    }

    pub fn failure(mut self, message: &str) -> Self {
        self.meta.failure_message = Some(message.to_string());
        self
    }

    pub fn output(mut self, name: &str, value: &str) -> Self {
        self.meta
            .outputs
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn build(self) -> ExecutionMetadata {
        self.meta
    }
}

pub fn tag(key: &str, value: &str) -> Tag {
    Tag {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// A step that ran `command_id` against `instance_id`.
pub fn command_step(name: &str, command_id: &str, instance_id: &str) -> StepExecution {
    StepExecution {
        step_name: name.to_string(),
        step_status: "Success".to_string(),
        step_execution_id: format!("step-{name}"),
        inputs: BTreeMap::from([(
            "InstanceIds".to_string(),
            format!("[\"{instance_id}\"]"),
        )]),
        outputs: BTreeMap::from([("CommandId".to_string(), vec![command_id.to_string()])]),
    }
}

pub fn invocation(command_id: &str, instance_id: &str, plugin: &str, output: &str) -> CommandInvocation {
    CommandInvocation {
        command_id: command_id.to_string(),
        instance_id: instance_id.to_string(),
        status: "Success".to_string(),
        command_plugins: vec![CommandPlugin {
            name: plugin.to_string(),
            status: "Success".to_string(),
            output: Some(output.to_string()),
        }],
    }
}
