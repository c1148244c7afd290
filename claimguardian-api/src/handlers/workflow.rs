use crate::dtos::{ExecutionResultResponse, ResultsParams, TriggerRequest, TriggerResponse};
use crate::services::OrchestratorClient;
use crate::utils::ValidatedJson;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use std::sync::Arc;

fn orchestrator(state: &AppState) -> Result<&Arc<OrchestratorClient>, AppError> {
    state.orchestrator.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Workflow orchestration is not configured".to_string())
    })
}

/// Ids are interpolated into the upstream URL path.
fn is_valid_execution_id(id: &str) -> bool {
    id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub async fn get_results(
    State(state): State<AppState>,
    Query(params): Query<ResultsParams>,
) -> Result<Json<ExecutionResultResponse>, AppError> {
    let execution_id = params
        .execution_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("execution_id is required"))?;

    if !is_valid_execution_id(execution_id) {
        return Err(AppError::bad_request("execution_id contains invalid characters"));
    }

    let execution = orchestrator(&state)?.get_execution(execution_id).await?;

    tracing::info!(
        execution_id = %execution.id,
        state = %execution.state.current,
        "Execution fetched"
    );

    Ok(Json(execution.into()))
}

pub async fn trigger_flow(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TriggerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let orchestrator = orchestrator(&state)?;
    let execution = orchestrator.trigger(&request.inputs).await?;

    tracing::info!(execution_id = %execution.id, "Flow execution started");
    metrics::counter!("claimguardian_workflows_triggered_total").increment(1);

    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            execution_id: execution.id,
            namespace: execution.namespace,
            flow_id: execution.flow_id,
            state: execution.state.current,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_ids_are_path_safe() {
        assert!(is_valid_execution_id("4wjS1tH7AdG4Fz0OqLZn1m"));
        assert!(is_valid_execution_id("exec_01-a"));
        assert!(!is_valid_execution_id("../admin"));
        assert!(!is_valid_execution_id("a b"));
        assert!(!is_valid_execution_id(&"a".repeat(65)));
    }
}
