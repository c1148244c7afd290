use crate::services::metrics::get_metrics;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const SERVICE_NAME: &str = "claimguardian-api";

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready when the key-value store, if configured, answers.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let Some(store) = &state.store else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ready", "checks": { "kv": "not_configured" } })),
        );
    };

    match store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "checks": { "kv": "up" } })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Key-value store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "checks": { "kv": "down" } })),
            )
        }
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
