//! Shared types, error model, and configuration for SRS Guard.
//!
//! This crate is the foundation depended on by all other SRS Guard crates.
//! It provides:
//! - [`SrsGuardError`], the unified error type
//! - Domain types ([`SubmittedDocument`], [`SimilarityMatch`], [`DecisionResult`], [`DocId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CorpusConfig, OpenAiConfig, ServerConfig, config_dir, config_file_path,
    expand_home, init_config, init_config_at, load_config, load_config_from, resolve_api_key,
    validate_api_key,
};
pub use error::{ExtractionKind, Result, SrsGuardError, UpstreamService, ValidationKind};
pub use types::{
    CorpusEntry, DecisionResult, DocId, SimilarityMatch, SubmittedDocument, content_hash,
};
