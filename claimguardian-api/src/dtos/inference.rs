use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct InferenceRequest {
    #[serde(alias = "input", alias = "prompt")]
    #[validate(length(max = 20000, message = "Input is too long"))]
    pub text: String,
    /// Any JSON number is accepted here and clamped before the upstream call.
    pub max_new_tokens: Option<f64>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub generated_text: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(length(max = 50000, message = "Context document is too long"))]
    pub context: String,
    #[validate(length(max = 50000, message = "Analysis is too long"))]
    pub analysis: String,
    pub threshold: Option<f64>,
}
