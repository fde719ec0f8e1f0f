//! Error types for SRS Guard.
//!
//! Library crates use [`SrsGuardError`] via `thiserror`.
//! The CLI wraps this with `color-eyre`; the server maps it onto HTTP statuses.

use std::path::PathBuf;

/// Which upload rule a [`SrsGuardError::Validation`] violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// The upload is larger than the configured limit.
    TooLarge,
    /// The multipart body has no `file` field.
    MissingFile,
    /// The file part carries no (or an empty) filename.
    MissingFilename,
    /// The filename does not end in `.pdf`.
    UnsupportedExtension,
    /// A content type was declared and it is not `application/pdf`.
    InvalidContentType,
    /// Anything else about the request shape.
    Malformed,
}

/// Why text extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    /// The bytes are not a readable PDF.
    Corrupt,
    /// The PDF is structurally valid but has no pages or no text.
    Empty,
    /// The extractor itself failed on an otherwise loadable document.
    Failed,
}

/// External service that an [`SrsGuardError::Upstream`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamService {
    Summarizer,
    Embedder,
    Corpus,
}

impl std::fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Summarizer => "summarizer",
            Self::Embedder => "embedder",
            Self::Corpus => "corpus",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all SRS Guard operations.
#[derive(Debug, thiserror::Error)]
pub enum SrsGuardError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The upload does not have the required shape.
    #[error("validation error: {message}")]
    Validation {
        kind: ValidationKind,
        message: String,
    },

    /// The uploaded PDF could not be turned into text.
    #[error("extraction error: {message}")]
    Extraction {
        kind: ExtractionKind,
        message: String,
    },

    /// The summarizer output did not follow the SUMMARY/SKILLS format.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A summarizer, embedder, or corpus call failed.
    #[error("{service} error: {message}")]
    Upstream {
        service: UpstreamService,
        message: String,
    },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SrsGuardError>;

impl SrsGuardError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error of the given kind.
    pub fn validation(kind: ValidationKind, msg: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: msg.into(),
        }
    }

    /// Create an extraction error of the given kind.
    pub fn extraction(kind: ExtractionKind, msg: impl Into<String>) -> Self {
        Self::Extraction {
            kind,
            message: msg.into(),
        }
    }

    /// Create an upstream error attributed to `service`.
    pub fn upstream(service: UpstreamService, msg: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
