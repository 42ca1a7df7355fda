// src/client/model.rs

//! Data model shared by every [`AutomationClient`](super::AutomationClient)
//! implementation.
//!
//! These are the tracker's own types. The SDK client maps the service's
//! shapes into them, so nothing outside `client` depends on the SDK.

use std::collections::BTreeMap;
use std::fmt;

use crate::status::{ExecutionStatus, StatusClass};

/// Metadata of one automation execution, as returned per poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetadata {
    pub execution_id: String,

    /// Absent for the root execution, present for every child.
    pub parent_execution_id: Option<String>,

    /// Host the child ran against.
    pub target: Option<String>,

    pub document_name: String,

    pub raw_status: String,

    pub outputs: BTreeMap<String, Vec<String>>,

    pub failure_message: Option<String>,
}

impl ExecutionMetadata {
    pub fn status(&self) -> ExecutionStatus {
        ExecutionStatus::parse(&self.raw_status)
    }

    pub fn class(&self) -> StatusClass {
        self.status().class()
    }

    /// Target id, or an empty string for the parent.
    pub fn target_id(&self) -> &str {
        self.target.as_deref().unwrap_or("")
    }
}

/// Filter keys accepted by `describe_executions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFilterKey {
    ExecutionId,
    ParentExecutionId,
}

impl ExecutionFilterKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionFilterKey::ExecutionId => "ExecutionId",
            ExecutionFilterKey::ParentExecutionId => "ParentExecutionId",
        }
    }
}

impl fmt::Display for ExecutionFilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFilter {
    pub key: ExecutionFilterKey,
    pub values: Vec<String>,
}

impl ExecutionFilter {
    /// Matches the execution with exactly this id.
    pub fn by_execution_id(id: impl Into<String>) -> Self {
        Self {
            key: ExecutionFilterKey::ExecutionId,
            values: vec![id.into()],
        }
    }

    /// Matches the first-level children of the given execution.
    pub fn by_parent(id: impl Into<String>) -> Self {
        Self {
            key: ExecutionFilterKey::ParentExecutionId,
            values: vec![id.into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Find the value of `key` in a tag list. The last match wins, like the
/// service's own "overwrite on duplicate" semantics.
pub fn tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .rev()
        .find(|t| t.key == key)
        .map(|t| t.value.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepExecution {
    pub step_name: String,
    pub step_status: String,
    pub step_execution_id: String,
    pub inputs: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, Vec<String>>,
}

impl StepExecution {
    /// Remote command ids this step produced, if it ran a command.
    pub fn command_ids(&self) -> &[String] {
        self.outputs
            .get("CommandId")
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionDetail {
    pub execution_id: String,
    pub step_executions: Vec<StepExecution>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub command_id: String,
    pub instance_id: String,
    pub status: String,
    pub command_plugins: Vec<CommandPlugin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlugin {
    pub name: String,
    pub status: String,
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(status: &str) -> ExecutionMetadata {
        ExecutionMetadata {
            execution_id: "exec-2-mi-bbb".into(),
            parent_execution_id: Some("exec-2".into()),
            target: Some("mi-bbb".into()),
            document_name: "AWS-RunShellScript".into(),
            raw_status: status.into(),
            outputs: BTreeMap::new(),
            failure_message: None,
        }
    }

    #[test]
    fn class_follows_raw_status() {
        assert_eq!(child("InProgress").class(), StatusClass::Pending);
        assert_eq!(child("CompletedWithSuccess").class(), StatusClass::Succeeded);
        assert_eq!(child("").class(), StatusClass::Failed);
    }

    #[test]
    fn parent_has_no_target() {
        let mut parent = child("Success");
        parent.target = None;
        assert_eq!(parent.target_id(), "");
        assert_eq!(child("Success").target_id(), "mi-bbb");
    }

    #[test]
    fn tag_lookup_takes_last_match() {
        let tags = vec![
            Tag { key: "Name".into(), value: "old".into() },
            Tag { key: "Env".into(), value: "prod".into() },
            Tag { key: "Name".into(), value: "web-1".into() },
        ];
        assert_eq!(tag_value(&tags, "Name"), Some("web-1"));
        assert_eq!(tag_value(&tags, "Owner"), None);
    }

    #[test]
    fn step_command_ids_default_to_empty() {
        let step = StepExecution {
            step_name: "sleep".into(),
            step_status: "Success".into(),
            step_execution_id: "s-1".into(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        };
        assert!(step.command_ids().is_empty());
    }
}
