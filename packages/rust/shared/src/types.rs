//! Core domain types for duplicate detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DocId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for corpus document identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(pub Uuid);

impl DocId {
    /// Generate a new time-sortable document identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// SubmittedDocument
// ---------------------------------------------------------------------------

/// One processed upload, ready to be admitted into the corpus.
///
/// Built once per request after the summary has been parsed and embedded.
/// Fields are never changed afterwards; the document is either dropped
/// (duplicate) or handed to the corpus as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedDocument {
    /// Corpus identifier assigned at construction.
    pub id: DocId,
    /// Parsed semantic summary. Never empty.
    pub summary: String,
    /// Comma-separated skills list, possibly empty.
    pub skills: String,
    /// Original upload filename. Used only as a label.
    pub source_file: String,
    /// Upload size in bytes.
    pub file_size: u64,
    /// SHA-256 of the upload bytes.
    pub content_hash: String,
    /// Embedding of `summary`.
    pub embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// SimilarityMatch / DecisionResult
// ---------------------------------------------------------------------------

/// A single nearest-neighbour hit returned by a corpus search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    /// Cosine similarity as reported by the corpus; higher is more similar.
    pub score: f64,
    /// `source_file` of the matched prior document.
    pub matched_source_file: String,
}

impl SimilarityMatch {
    pub fn new(matched_source_file: impl Into<String>, score: f64) -> Self {
        Self {
            score,
            matched_source_file: matched_source_file.into(),
        }
    }
}

/// Outcome of the duplicate decision for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionResult {
    /// True iff `matched_files` is non-empty.
    pub duplicate_detected: bool,
    /// Best score among all matches, 0 when there were none.
    pub max_score: f64,
    /// Files at or above the threshold, first-seen order, no repeats.
    pub matched_files: Vec<String>,
}

// ---------------------------------------------------------------------------
// CorpusEntry
// ---------------------------------------------------------------------------

/// Metadata of a stored corpus record, without its vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: String,
    pub source_file: String,
    pub skills: String,
    pub file_size: u64,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_roundtrip() {
        let id = DocId::new();
        let s = id.to_string();
        let parsed: DocId = s.parse().expect("parse DocId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn doc_ids_are_time_sortable() {
        let a = DocId::new();
        let b = DocId::new();
        assert!(a.0 <= b.0);
    }

    #[test]
    fn decision_result_default_is_novel() {
        let decision = DecisionResult::default();
        assert!(!decision.duplicate_detected);
        assert_eq!(decision.max_score, 0.0);
        assert!(decision.matched_files.is_empty());
    }

    #[test]
    fn content_hash_is_stable() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn submitted_document_serialization() {
        let doc = SubmittedDocument {
            id: DocId::new(),
            summary: "An inventory tracker".into(),
            skills: "Rust, SQLite".into(),
            source_file: "inventory.pdf".into(),
            file_size: 2048,
            content_hash: content_hash(b"pdf"),
            embedding: vec![0.1, 0.2],
        };
        let json = serde_json::to_string(&doc).expect("serialize");
        let parsed: SubmittedDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.source_file, "inventory.pdf");
        assert_eq!(parsed.embedding.len(), 2);
    }
}
