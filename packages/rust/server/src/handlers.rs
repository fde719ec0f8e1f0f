//! HTTP handlers.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use srsguard_core::{SilentProgress, check_document};
use tracing::info;

use crate::AppState;
use crate::errors::ApiError;
use crate::models::{CheckResponse, HealthResponse};
use crate::upload::read_pdf_upload;

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        message: "Plagiarism detection service is running".into(),
    })
}

/// `POST /check-plagiarism`
pub async fn check_plagiarism(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    // A body that is not multipart at all has no `file` field either.
    let mut multipart =
        multipart.map_err(|_| ApiError::Unprocessable("Field required: file".into()))?;
    let upload = read_pdf_upload(&mut multipart, state.max_upload_bytes).await?;

    let report = check_document(&state.services, upload, &SilentProgress).await?;
    info!(
        file = %report.source_file,
        duplicate = report.decision.duplicate_detected,
        max_score = report.decision.max_score,
        document_added = report.document_added(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "check complete"
    );

    Ok(Json(CheckResponse::from(&report)))
}
