use crate::dtos::{CptLookupRequest, CptLookupResponse};
use crate::services::cpt::{self, CptCode};
use crate::utils::ValidatedJson;
use axum::Json;
use service_core::error::AppError;

pub async fn lookup_code(
    ValidatedJson(request): ValidatedJson<CptLookupRequest>,
) -> Result<Json<CptLookupResponse>, AppError> {
    let code = CptCode::parse(&request.code).map_err(|e| {
        tracing::debug!(code = %request.code, "Rejected malformed CPT code");
        AppError::BadRequest(anyhow::Error::new(e))
    })?;

    let result = cpt::lookup(&code);
    tracing::info!(code = %result.code, found = result.found, category = %result.category, "CPT lookup");
    metrics::counter!(
        "claimguardian_cpt_lookups_total",
        "found" => if result.found { "true" } else { "false" }
    )
    .increment(1);

    Ok(Json(result.into()))
}
