// src/client/mod.rs

//! Automation service client abstraction.
//!
//! The tracker talks to an [`AutomationClient`] instead of the SDK directly.
//! Production code uses [`AwsSdkClient`], built on the AWS SDK for SSM and
//! EC2; tests provide a scripted fake (see `sesame-test-utils`).
//!
//! - [`model`] holds the execution / step / command data types.
//! - [`aws_sdk`] is the SDK-backed implementation.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::ResourceKind;

pub mod aws_sdk;
pub mod model;

pub use aws_sdk::AwsSdkClient;
pub use model::{
    CommandInvocation, CommandPlugin, ExecutionDetail, ExecutionFilter, ExecutionFilterKey,
    ExecutionMetadata, StepExecution, Tag, tag_value,
};

/// Boxed, sendable future returned by client calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Operations the tracker needs from the automation service.
///
/// Every call is a single blocking request from the caller's point of view;
/// implementations should not fan out concurrently.
pub trait AutomationClient: Send + Sync {
    /// Execution metadata matching `filter`, at most `max_results` entries.
    fn describe_executions(
        &self,
        filter: ExecutionFilter,
        max_results: u32,
    ) -> BoxFuture<'_, Result<Vec<ExecutionMetadata>>>;

    /// Tags attached to a managed or EC2 instance.
    fn list_tags_for_resource(
        &self,
        resource_id: String,
        kind: ResourceKind,
    ) -> BoxFuture<'_, Result<Vec<Tag>>>;

    /// Step executions of one automation, newest first.
    fn describe_step_executions(
        &self,
        execution_id: String,
    ) -> BoxFuture<'_, Result<Vec<StepExecution>>>;

    /// Full execution detail, including step inputs and outputs.
    fn get_execution_detail(&self, execution_id: String) -> BoxFuture<'_, Result<ExecutionDetail>>;

    /// Per-host output of a remote command.
    fn list_command_invocations(
        &self,
        command_id: String,
        instance_id: String,
    ) -> BoxFuture<'_, Result<Vec<CommandInvocation>>>;
}
