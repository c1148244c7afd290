use crate::dtos::{InferenceRequest, InferenceResponse, VerifyRequest};
use crate::services::verification::{self, VerificationReport, DEFAULT_THRESHOLD};
use crate::services::{GenerationParams, TextGenerator};
use crate::utils::ValidatedJson;
use crate::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Judging runs long and near-deterministic.
const VERIFY_MAX_NEW_TOKENS: u32 = 1024;
const VERIFY_TEMPERATURE: f32 = 0.1;

fn generator(state: &AppState) -> Result<&Arc<dyn TextGenerator>, AppError> {
    state.generator.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Inference endpoint is not configured".to_string())
    })
}

pub async fn generate(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<InferenceRequest>,
) -> Result<Json<InferenceResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::bad_request("text is required"));
    }

    let generator = generator(&state)?;
    let params = GenerationParams::clamped(request.max_new_tokens, request.temperature);

    let started = Instant::now();
    let result = generator.generate(&request.text, &params).await;
    let elapsed = started.elapsed().as_secs_f64();

    metrics::histogram!("claimguardian_inference_duration_seconds").record(elapsed);
    metrics::counter!(
        "claimguardian_inference_requests_total",
        "outcome" => if result.is_ok() { "ok" } else { "error" }
    )
    .increment(1);

    let generated_text = result.map_err(|e| {
        tracing::warn!(model = %generator.model(), error = %e, "Inference request failed");
        AppError::from(e)
    })?;

    tracing::info!(
        model = %generator.model(),
        elapsed_secs = elapsed,
        output_len = generated_text.len(),
        "Inference completed"
    );

    Ok(Json(InferenceResponse {
        generated_text,
        model: generator.model().to_string(),
    }))
}

pub async fn verify_claims(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyRequest>,
) -> Result<Json<VerificationReport>, AppError> {
    if request.context.trim().is_empty() {
        return Err(AppError::bad_request("context is required"));
    }
    if request.analysis.trim().is_empty() {
        return Err(AppError::bad_request("analysis is required"));
    }

    let threshold = request
        .threshold
        .filter(|t| t.is_finite())
        .unwrap_or(DEFAULT_THRESHOLD)
        .clamp(0.0, 1.0);

    let generator = generator(&state)?;
    let prompt = verification::build_prompt(&request.context, &request.analysis);
    let params = GenerationParams::clamped(
        Some(f64::from(VERIFY_MAX_NEW_TOKENS)),
        Some(VERIFY_TEMPERATURE),
    );

    let output = generator.generate(&prompt, &params).await.map_err(|e| {
        tracing::warn!(model = %generator.model(), error = %e, "Verification request failed");
        AppError::from(e)
    })?;

    let verdicts = verification::parse_verdicts(&output).map_err(|e| {
        tracing::warn!(error = %e, "Model output had no usable claim verdicts");
        AppError::BadGateway(e.to_string())
    })?;

    let report = verification::summarize(verdicts, threshold);
    tracing::info!(
        claims_verified = report.claims_verified,
        claims_supported = report.claims_supported,
        threshold = report.threshold,
        "Claims verified"
    );

    Ok(Json(report))
}
