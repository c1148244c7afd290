use crate::models::{Execution, TaskRun};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    #[serde(alias = "executionId")]
    pub execution_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: String,
    pub task_id: String,
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub outputs: Option<Value>,
}

impl From<TaskRun> for TaskResult {
    fn from(task: TaskRun) -> Self {
        Self {
            id: task.id,
            task_id: task.task_id,
            state: task.state.current,
            start_date: task.state.start_date,
            end_date: task.state.end_date,
            outputs: task.outputs,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionResultResponse {
    pub execution_id: String,
    pub namespace: String,
    pub flow_id: String,
    /// Upstream state name, passed through even when unrecognized.
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub tasks: Vec<TaskResult>,
    pub outputs: Value,
    pub is_terminal: bool,
    pub is_success: bool,
}

impl From<Execution> for ExecutionResultResponse {
    fn from(execution: Execution) -> Self {
        let status = execution.state.status();
        Self {
            execution_id: execution.id,
            namespace: execution.namespace,
            flow_id: execution.flow_id,
            state: execution.state.current,
            start_date: execution.state.start_date,
            end_date: execution.state.end_date,
            duration: execution.state.duration,
            tasks: execution
                .task_run_list
                .unwrap_or_default()
                .into_iter()
                .map(TaskResult::from)
                .collect(),
            outputs: execution
                .outputs
                .unwrap_or_else(|| Value::Object(Default::default())),
            is_terminal: status.is_terminal(),
            is_success: status.is_success(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TriggerRequest {
    #[serde(default)]
    pub inputs: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub execution_id: String,
    pub namespace: String,
    pub flow_id: String,
    pub state: String,
}
