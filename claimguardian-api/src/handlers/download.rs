use crate::dtos::{attachment_filename, DownloadFormat, DownloadRequest};
use crate::utils::ValidatedJson;
use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;

pub async fn download_post(
    ValidatedJson(request): ValidatedJson<DownloadRequest>,
) -> Result<Response, AppError> {
    attachment(request)
}

pub async fn download_get(Query(request): Query<DownloadRequest>) -> Result<Response, AppError> {
    attachment(request)
}

/// The body is the submitted content, unchanged.
fn attachment(request: DownloadRequest) -> Result<Response, AppError> {
    let content = request
        .content
        .ok_or_else(|| AppError::bad_request("content is required"))?;

    let format = DownloadFormat::parse(request.format.as_deref());
    let filename = attachment_filename(request.filename.as_deref(), format);

    tracing::info!(
        filename = %filename,
        content_type = format.content_type(),
        bytes = content.len(),
        "Serving download"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        content,
    )
        .into_response())
}
