//! Text generation against the hosted billing model.
//!
//! The trait keeps handlers independent of the wire format so tests can
//! swap in `MockTextGenerator`.

pub mod hosted;
pub mod mock;

pub use hosted::{extract_generated_text, HostedModelClient};
pub use mock::MockTextGenerator;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model is loading, retry later: {0}")]
    ModelLoading(String),

    #[error("Inference endpoint rate limited the request")]
    RateLimited,

    #[error("Inference endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Inference endpoint unreachable: {0}")]
    Network(String),

    #[error("Inference response did not contain generated text")]
    UnrecognizedResponse,
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelLoading(_)
            | InferenceError::RateLimited
            | InferenceError::Network(_) => AppError::ServiceUnavailable(err.to_string()),
            InferenceError::Api { .. } | InferenceError::UnrecognizedResponse => {
                AppError::BadGateway(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            temperature: 0.7,
        }
    }
}

impl GenerationParams {
    /// Out-of-range values are pulled back into what the endpoint accepts.
    pub fn clamped(max_new_tokens: Option<f64>, temperature: Option<f32>) -> Self {
        let defaults = Self::default();
        Self {
            max_new_tokens: max_new_tokens
                .filter(|n| n.is_finite())
                .map(|n| n.trunc().clamp(1.0, 2048.0) as u32)
                .unwrap_or(defaults.max_new_tokens),
            temperature: temperature
                .filter(|t| t.is_finite())
                .unwrap_or(defaults.temperature)
                .clamp(0.0, 2.0),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier echoed back to clients.
    fn model(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;
}
