//! Hosted model endpoint (Hugging Face style text-generation API).

use super::{GenerationParams, InferenceError, TextGenerator};
use crate::config::InferenceSettings;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::time::Duration;

pub struct HostedModelClient {
    client: Client,
    endpoint: String,
    api_key: Option<Secret<String>>,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

impl HostedModelClient {
    pub fn new(settings: InferenceSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint,
            api_key: settings.api_key,
            model: settings.model,
        })
    }
}

#[async_trait]
impl TextGenerator for HostedModelClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let body = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                return_full_text: false,
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            max_new_tokens = params.max_new_tokens,
            "Sending request to inference endpoint"
        );

        let mut request = self.client.traced_post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(model = %self.model, status = %status, "Inference endpoint returned an error");

            return Err(match status {
                StatusCode::SERVICE_UNAVAILABLE => InferenceError::ModelLoading(error_text),
                StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
                _ => InferenceError::Api {
                    status: status.as_u16(),
                    body: error_text,
                },
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|_| InferenceError::UnrecognizedResponse)?;

        extract_generated_text(&payload).ok_or(InferenceError::UnrecognizedResponse)
    }
}

/// Pulls the generated text out of the response shapes hosted endpoints use:
/// `[{generated_text}]`, `{generated_text}`, `{choices:[{text}]}`,
/// `{choices:[{message:{content}}]}`, `{output}`, `{outputs}` or a bare string.
pub fn extract_generated_text(payload: &Value) -> Option<String> {
    match payload {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items.first().and_then(extract_generated_text),
        Value::Object(fields) => {
            if let Some(Value::String(text)) = fields.get("generated_text") {
                return Some(text.clone());
            }

            if let Some(choice) = fields.get("choices").and_then(|c| c.get(0)) {
                let text = choice
                    .get("text")
                    .or_else(|| choice.get("message").and_then(|m| m.get("content")))
                    .and_then(Value::as_str);
                if let Some(text) = text {
                    return Some(text.to_string());
                }
            }

            ["output", "outputs"]
                .iter()
                .filter_map(|key| fields.get(*key))
                .find_map(extract_generated_text)
        }
        _ => None,
    }
}
