use crate::dtos::{
    HistoryParams, HistoryResponse, NewAnalysisRequest, NewSessionResponse,
    RecordedAnalysisResponse,
};
use crate::models::SessionStats;
use crate::utils::{new_session_id, session_cookie, session_from_jar, ValidatedJson};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;

pub async fn get_history(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<HistoryParams>,
) -> Result<(CookieJar, Json<HistoryResponse>), AppError> {
    let session_id = session_from_jar(&jar).unwrap_or_else(new_session_id);
    let jar = jar.add(session_cookie(session_id.clone(), state.secure_cookies()));

    let Some(store) = &state.store else {
        tracing::debug!(session_id = %session_id, "No key-value store configured, serving demo history");
        return Ok((
            jar,
            Json(HistoryResponse {
                session_id,
                analyses: Vec::new(),
                stats: SessionStats::default(),
                demo: true,
            }),
        ));
    };

    let limit = params.limit();
    let (analyses, stats) = tokio::try_join!(
        store.list_analyses_by_session(&session_id, limit),
        store.get_session_stats(&session_id),
    )
    .map_err(|e| {
        tracing::error!(session_id = %session_id, error = %e, "Failed to load analysis history");
        AppError::from(e)
    })?;

    tracing::info!(
        session_id = %session_id,
        returned = analyses.len(),
        total_analyses = stats.total_analyses,
        "History loaded"
    );

    Ok((
        jar,
        Json(HistoryResponse {
            session_id,
            analyses,
            stats,
            demo: false,
        }),
    ))
}

/// Starts a fresh session; the new id never equals the presented one.
pub async fn new_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<NewSessionResponse>) {
    let previous = session_from_jar(&jar);

    let mut session_id = new_session_id();
    while previous.as_deref() == Some(session_id.as_str()) {
        session_id = new_session_id();
    }

    tracing::info!(
        session_id = %session_id,
        replaced = previous.is_some(),
        "New session started"
    );
    metrics::counter!("claimguardian_sessions_created_total").increment(1);

    let jar = jar.add(session_cookie(session_id.clone(), state.secure_cookies()));
    (
        jar,
        Json(NewSessionResponse {
            session_id,
            message: "New session started".to_string(),
        }),
    )
}

pub async fn record_analysis(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<NewAnalysisRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = session_from_jar(&jar)
        .ok_or_else(|| AppError::bad_request("A session cookie is required to record an analysis"))?;

    let store = state.store.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Analysis history storage is not configured".to_string())
    })?;

    let record = request.into_record(Uuid::new_v4().to_string(), session_id, Utc::now());
    let stats = store.save_analysis(&record).await.map_err(|e| {
        tracing::error!(session_id = %record.session_id, error = %e, "Failed to record analysis");
        AppError::from(e)
    })?;

    metrics::counter!("claimguardian_analyses_recorded_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(RecordedAnalysisResponse {
            analysis: record,
            stats,
        }),
    ))
}
