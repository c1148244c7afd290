//! Client for the workflow orchestration server (Kestra REST API).

use crate::config::OrchestratorSettings;
use crate::models::Execution;
use reqwest::{multipart, Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use service_core::error::AppError;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Orchestration server unreachable: {0}")]
    Unreachable(String),

    #[error("Execution {0} not found")]
    NotFound(String),

    #[error("Flow {namespace}/{flow_id} not found")]
    FlowNotFound { namespace: String, flow_id: String },

    #[error("Orchestration server rejected our credentials (status {0})")]
    Unauthorized(u16),

    #[error("Orchestration server returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Malformed orchestration server response: {0}")]
    Malformed(String),
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Unreachable(_) => AppError::ServiceUnavailable(err.to_string()),
            OrchestratorError::NotFound(_) | OrchestratorError::FlowNotFound { .. } => {
                AppError::NotFound(anyhow::Error::new(err))
            }
            OrchestratorError::Unauthorized(_) => AppError::InternalError(anyhow::Error::new(err)),
            OrchestratorError::Upstream { .. } | OrchestratorError::Malformed(_) => {
                AppError::BadGateway(err.to_string())
            }
        }
    }
}

pub struct OrchestratorClient {
    client: Client,
    settings: OrchestratorSettings,
}

impl OrchestratorClient {
    pub fn new(settings: OrchestratorSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    /// `{base}/api/v1[/{tenant}]/executions{suffix}`
    fn executions_url(&self, suffix: &str) -> String {
        let base = self.settings.url.trim_end_matches('/');
        match self.settings.tenant.as_deref() {
            Some(tenant) if !tenant.is_empty() => {
                format!("{}/api/v1/{}/executions{}", base, tenant, suffix)
            }
            _ => format!("{}/api/v1/executions{}", base, suffix),
        }
    }

    fn authenticated(&self, request: TracedRequest) -> TracedRequest {
        match &self.settings.username {
            Some(username) => {
                let username = username.clone();
                let password = self
                    .settings
                    .password
                    .as_ref()
                    .map(|p| p.expose_secret().clone());
                request.configure(move |b| b.basic_auth(username, password))
            }
            None => request,
        }
    }

    pub async fn get_execution(&self, execution_id: &str) -> Result<Execution, OrchestratorError> {
        let url = self.executions_url(&format!("/{}", execution_id));
        tracing::debug!(execution_id = %execution_id, "Fetching execution");

        let response = self
            .authenticated(self.client.traced_get(&url))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(execution_id = %execution_id, error = %e, "Orchestrator request failed");
                OrchestratorError::Unreachable(e.to_string())
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(OrchestratorError::NotFound(execution_id.to_string())),
            status => parse_execution(status, response).await,
        }
    }

    /// Starts the configured flow with `inputs` sent as multipart fields.
    pub async fn trigger(
        &self,
        inputs: &BTreeMap<String, Value>,
    ) -> Result<Execution, OrchestratorError> {
        let url = self.executions_url(&format!(
            "/{}/{}",
            self.settings.namespace, self.settings.flow_id
        ));

        let form = inputs.iter().fold(multipart::Form::new(), |form, (key, value)| {
            form.text(key.clone(), input_value(value))
        });

        tracing::info!(
            namespace = %self.settings.namespace,
            flow_id = %self.settings.flow_id,
            input_count = inputs.len(),
            "Triggering flow execution"
        );

        let response = self
            .authenticated(self.client.traced_post(&url))
            .configure(move |b| b.multipart(form))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Orchestrator request failed");
                OrchestratorError::Unreachable(e.to_string())
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(OrchestratorError::FlowNotFound {
                namespace: self.settings.namespace.clone(),
                flow_id: self.settings.flow_id.clone(),
            }),
            status => parse_execution(status, response).await,
        }
    }
}

async fn parse_execution(
    status: StatusCode,
    response: reqwest::Response,
) -> Result<Execution, OrchestratorError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::error!(status = %status, "Orchestrator rejected credentials");
        return Err(OrchestratorError::Unauthorized(status.as_u16()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "Orchestrator returned an error");
        return Err(OrchestratorError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Execution>()
        .await
        .map_err(|e| OrchestratorError::Malformed(e.to_string()))
}

/// Flow inputs are form fields: strings go as-is, everything else as JSON.
fn input_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
