use serde::de::{value, IntoDeserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Execution state as reported by the orchestration server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Created,
    Queued,
    Running,
    Paused,
    Restarted,
    Retrying,
    Retried,
    Killing,
    Success,
    Warning,
    Failed,
    Killed,
    Cancelled,
    Skipped,
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Success
                | ExecutionStatus::Warning
                | ExecutionStatus::Failed
                | ExecutionStatus::Killed
                | ExecutionStatus::Cancelled
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Warning)
    }

    /// States this build does not know map to `Unknown`.
    pub fn from_raw(raw: &str) -> Self {
        let deserializer: value::StrDeserializer<'_, value::Error> = raw.into_deserializer();
        ExecutionStatus::deserialize(deserializer).unwrap_or(ExecutionStatus::Unknown)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    /// State name exactly as the orchestration server sent it.
    pub current: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
}

impl ExecutionState {
    pub fn status(&self) -> ExecutionStatus {
        ExecutionStatus::from_raw(&self.current)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    pub id: String,
    pub task_id: String,
    pub state: ExecutionState,
    #[serde(default)]
    pub outputs: Option<Value>,
}

/// One run of a flow, as returned by `GET /api/v1/executions/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub flow_id: String,
    pub state: ExecutionState,
    #[serde(default)]
    pub task_run_list: Option<Vec<TaskRun>>,
    #[serde(default)]
    pub outputs: Option<Value>,
}
