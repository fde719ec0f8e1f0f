//! Multipart upload handling for `POST /check-plagiarism`.
//!
//! The `file` field is checked in order: filename present, `.pdf` extension,
//! declared content type, then size while the body streams in.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use srsguard_core::Upload;
use srsguard_shared::{Result, SrsGuardError, ValidationKind};

/// Multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

const PDF_MIME: &str = "application/pdf";

/// Read and validate the `file` field, rejecting it once it grows past
/// `max_bytes`.
pub async fn read_pdf_upload(multipart: &mut Multipart, max_bytes: usize) -> Result<Upload> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = validate_filename(field.file_name())?;
        validate_content_type(field.content_type())?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(too_large(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload { filename, bytes });
    }

    Err(SrsGuardError::validation(
        ValidationKind::MissingFile,
        "Field required: file",
    ))
}

/// Require a non-empty filename ending in `.pdf` (any case).
pub fn validate_filename(filename: Option<&str>) -> Result<String> {
    let name = match filename {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(SrsGuardError::validation(
                ValidationKind::MissingFilename,
                "Filename is required",
            ));
        }
    };
    if !name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(SrsGuardError::validation(
            ValidationKind::UnsupportedExtension,
            "Only PDF files are supported",
        ));
    }
    Ok(name.to_string())
}

/// A declared content type must be `application/pdf`; none is fine.
pub fn validate_content_type(content_type: Option<&str>) -> Result<()> {
    let Some(content_type) = content_type else {
        return Ok(());
    };
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case(PDF_MIME) {
        Ok(())
    } else {
        Err(SrsGuardError::validation(
            ValidationKind::InvalidContentType,
            "Invalid content type. Expected application/pdf",
        ))
    }
}

fn too_large(max_bytes: usize) -> SrsGuardError {
    SrsGuardError::validation(
        ValidationKind::TooLarge,
        format!("File size too large (max {})", format_limit(max_bytes)),
    )
}

/// `10485760` → `10MB`; limits under a megabyte are shown in KB.
fn format_limit(max_bytes: usize) -> String {
    const MB: usize = 1024 * 1024;
    if max_bytes >= MB {
        format!("{}MB", max_bytes / MB)
    } else {
        format!("{}KB", max_bytes / 1024)
    }
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> SrsGuardError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes)
    } else {
        SrsGuardError::validation(ValidationKind::Malformed, err.body_text())
    }
}
