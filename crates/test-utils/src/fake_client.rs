use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use sesame::client::{
    AutomationClient, BoxFuture, CommandInvocation, ExecutionDetail, ExecutionFilter,
    ExecutionFilterKey, ExecutionMetadata, StepExecution, Tag,
};
use sesame::errors::{Result, SesameError};
use sesame::types::ResourceKind;

/// Ordered responses for one kind of call. Entries are consumed in order;
/// the last one repeats forever.
#[derive(Debug)]
struct Script<T> {
    steps: VecDeque<std::result::Result<T, String>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self { steps: VecDeque::new() }
    }
}

impl<T: Clone + Default> Script<T> {
    fn next(&mut self) -> Result<T> {
        let step = if self.steps.len() > 1 {
            self.steps.pop_front()
        } else {
            self.steps.front().cloned()
        };
        match step {
            Some(Ok(value)) => Ok(value),
            Some(Err(msg)) => Err(SesameError::RemoteService(msg)),
            None => Ok(T::default()),
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    parent: Script<Vec<ExecutionMetadata>>,
    children: Script<Vec<ExecutionMetadata>>,
    tags: HashMap<String, Vec<Tag>>,
    failing_tags: Vec<String>,
    steps: HashMap<String, Vec<StepExecution>>,
    details: HashMap<String, ExecutionDetail>,
    invocations: HashMap<(String, String), Vec<CommandInvocation>>,
    fail_step_detail: bool,
    parent_calls: usize,
    children_calls: usize,
    tag_calls: Vec<(String, ResourceKind)>,
    step_calls: usize,
}

/// A scripted `AutomationClient` that:
/// - answers parent and children queries from ordered scripts
/// - resolves tags / steps / command output from fixed maps
/// - records how often each call was made.
#[derive(Debug, Default)]
pub struct FakeAutomationClient {
    state: Mutex<FakeState>,
}

impl FakeAutomationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next answer to the `ExecutionId` filter.
    pub fn push_parent(self, parent: Vec<ExecutionMetadata>) -> Self {
        self.state.lock().unwrap().parent.steps.push_back(Ok(parent));
        self
    }

    pub fn push_parent_error(self, msg: &str) -> Self {
        self.state.lock().unwrap().parent.steps.push_back(Err(msg.to_string()));
        self
    }

    /// Next answer to the `ParentExecutionId` filter.
    pub fn push_children(self, children: Vec<ExecutionMetadata>) -> Self {
        self.state.lock().unwrap().children.steps.push_back(Ok(children));
        self
    }

    pub fn push_children_error(self, msg: &str) -> Self {
        self.state.lock().unwrap().children.steps.push_back(Err(msg.to_string()));
        self
    }

    pub fn with_tags(self, resource_id: &str, tags: Vec<Tag>) -> Self {
        self.state.lock().unwrap().tags.insert(resource_id.to_string(), tags);
        self
    }

    pub fn fail_tags_for(self, resource_id: &str) -> Self {
        self.state.lock().unwrap().failing_tags.push(resource_id.to_string());
        self
    }

    pub fn with_steps(self, execution_id: &str, steps: Vec<StepExecution>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.details.insert(
                execution_id.to_string(),
                ExecutionDetail {
                    execution_id: execution_id.to_string(),
                    step_executions: steps.clone(),
                },
            );
            state.steps.insert(execution_id.to_string(), steps);
        }
        self
    }

    pub fn with_invocations(
        self,
        command_id: &str,
        instance_id: &str,
        invocations: Vec<CommandInvocation>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .invocations
            .insert((command_id.to_string(), instance_id.to_string()), invocations);
        self
    }

    pub fn fail_step_detail(self) -> Self {
        self.state.lock().unwrap().fail_step_detail = true;
        self
    }

    pub fn parent_calls(&self) -> usize {
        self.state.lock().unwrap().parent_calls
    }

    pub fn children_calls(&self) -> usize {
        self.state.lock().unwrap().children_calls
    }

    pub fn tag_calls(&self) -> Vec<(String, ResourceKind)> {
        self.state.lock().unwrap().tag_calls.clone()
    }

    pub fn step_calls(&self) -> usize {
        self.state.lock().unwrap().step_calls
    }
}

impl AutomationClient for FakeAutomationClient {
    fn describe_executions(
        &self,
        filter: ExecutionFilter,
        _max_results: u32,
    ) -> BoxFuture<'_, Result<Vec<ExecutionMetadata>>> {
        let result = {
            let mut state = self.state.lock().unwrap();
            match filter.key {
                ExecutionFilterKey::ExecutionId => {
                    state.parent_calls += 1;
                    state.parent.next()
                }
                ExecutionFilterKey::ParentExecutionId => {
                    state.children_calls += 1;
                    state.children.next()
                }
            }
        };
        Box::pin(async move { result })
    }

    fn list_tags_for_resource(
        &self,
        resource_id: String,
        kind: ResourceKind,
    ) -> BoxFuture<'_, Result<Vec<Tag>>> {
        let result = {
            let mut state = self.state.lock().unwrap();
            state.tag_calls.push((resource_id.clone(), kind));
            if state.failing_tags.contains(&resource_id) {
                Err(SesameError::RemoteService(format!("tags unavailable for {resource_id}")))
            } else {
                Ok(state.tags.get(&resource_id).cloned().unwrap_or_default())
            }
        };
        Box::pin(async move { result })
    }

    fn describe_step_executions(
        &self,
        execution_id: String,
    ) -> BoxFuture<'_, Result<Vec<StepExecution>>> {
        let result = {
            let mut state = self.state.lock().unwrap();
            state.step_calls += 1;
            if state.fail_step_detail {
                Err(SesameError::RemoteService("step detail unavailable".to_string()))
            } else {
                Ok(state.steps.get(&execution_id).cloned().unwrap_or_default())
            }
        };
        Box::pin(async move { result })
    }

    fn get_execution_detail(&self, execution_id: String) -> BoxFuture<'_, Result<ExecutionDetail>> {
        let result = {
            let state = self.state.lock().unwrap();
            Ok(state
                .details
                .get(&execution_id)
                .cloned()
                .unwrap_or(ExecutionDetail {
                    execution_id,
                    step_executions: Vec::new(),
                }))
        };
        Box::pin(async move { result })
    }

    fn list_command_invocations(
        &self,
        command_id: String,
        instance_id: String,
    ) -> BoxFuture<'_, Result<Vec<CommandInvocation>>> {
        let result = {
            let state = self.state.lock().unwrap();
            Ok(state
                .invocations
                .get(&(command_id, instance_id))
                .cloned()
                .unwrap_or_default())
        };
        Box::pin(async move { result })
    }
}
