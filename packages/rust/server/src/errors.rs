//! API error type mapped to HTTP status codes.
//!
//! Every [`ApiError`] renders as a JSON body `{"detail": "message"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use srsguard_extract::EXTRACTION_FAILED;
use srsguard_shared::{ExtractionKind, SrsGuardError, UpstreamService, ValidationKind};
use tracing::error;

/// Application-level error type that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// Bad upload or unreadable PDF (400).
    BadRequest(String),
    /// Upload over the size limit (413).
    PayloadTooLarge(String),
    /// Missing file or filename (422).
    Unprocessable(String),
    /// Pipeline or unexpected failure (500).
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::BadRequest(msg)
            | Self::PayloadTooLarge(msg)
            | Self::Unprocessable(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.detail() }));
        (status, body).into_response()
    }
}

impl From<SrsGuardError> for ApiError {
    fn from(err: SrsGuardError) -> Self {
        match err {
            SrsGuardError::Validation { kind, message } => match kind {
                ValidationKind::TooLarge => Self::PayloadTooLarge(message),
                ValidationKind::MissingFile | ValidationKind::MissingFilename => {
                    Self::Unprocessable(message)
                }
                ValidationKind::UnsupportedExtension
                | ValidationKind::InvalidContentType
                | ValidationKind::Malformed => Self::BadRequest(message),
            },
            SrsGuardError::Extraction { kind, message } => match kind {
                ExtractionKind::Corrupt | ExtractionKind::Empty => Self::BadRequest(message),
                ExtractionKind::Failed => {
                    error!(error = %message, "text extraction failed");
                    Self::Internal(EXTRACTION_FAILED.into())
                }
            },
            SrsGuardError::Parse { .. } => {
                Self::Internal("Failed to process document content".into())
            }
            SrsGuardError::Upstream { service, .. } => Self::Internal(
                match service {
                    UpstreamService::Summarizer => "Failed to process document with AI model",
                    UpstreamService::Embedder => "Failed to embed document summary",
                    UpstreamService::Corpus => "Failed to search for similar documents",
                }
                .into(),
            ),
            other => {
                error!(error = %other, "unexpected error");
                Self::Internal("Internal server error".into())
            }
        }
    }
}
