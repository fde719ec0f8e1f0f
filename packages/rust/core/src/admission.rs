//! Corpus admission: novel documents are inserted, duplicates are dropped.
//!
//! A request moves `searched -> decided -> (novel only) insert attempted`.
//! Each variant of [`AdmissionOutcome`] is one terminal state. There is at
//! most one insert per request and no retry. Nothing serialises concurrent
//! search/insert pairs, so two near-identical uploads racing each other can
//! both be admitted.

use srsguard_shared::{DecisionResult, SubmittedDocument};
use tracing::{info, warn};

use crate::services::Corpus;

/// Terminal admission state for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// A prior document met the threshold; nothing was written.
    Duplicate,
    /// The document is now part of the corpus.
    Inserted,
    /// The insert was attempted and failed. The decision still stands.
    InsertFailed(String),
}

impl AdmissionOutcome {
    /// Whether the request counts as having added its document.
    ///
    /// Always the negation of the duplicate decision, including when the
    /// insert itself failed.
    pub fn document_added(&self) -> bool {
        !matches!(self, Self::Duplicate)
    }
}

/// Apply the admission policy for `doc` given its `decision`.
///
/// Insert failures are logged and reported in the outcome, never returned
/// as errors.
pub async fn admit(
    corpus: &dyn Corpus,
    decision: &DecisionResult,
    doc: &SubmittedDocument,
) -> AdmissionOutcome {
    if decision.duplicate_detected {
        info!(
            source_file = %doc.source_file,
            matched = ?decision.matched_files,
            "duplicate detected, document not added"
        );
        return AdmissionOutcome::Duplicate;
    }

    if let Err(e) = corpus.insert(doc).await {
        warn!(source_file = %doc.source_file, error = %e, "failed to add document to corpus");
        return AdmissionOutcome::InsertFailed(e.to_string());
    }

    match corpus.count().await {
        Ok(documents) => info!(
            source_file = %doc.source_file,
            %doc.id,
            documents,
            "document added to corpus"
        ),
        Err(e) => warn!(error = %e, "document added but corpus stats unavailable"),
    }
    AdmissionOutcome::Inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use srsguard_shared::{DocId, Result, SimilarityMatch, SrsGuardError};

    #[derive(Default)]
    struct RecordingCorpus {
        inserted: Mutex<Vec<String>>,
        fail_insert: bool,
    }

    #[async_trait]
    impl Corpus for RecordingCorpus {
        async fn search(&self, _vector: &[f32], _k: usize) -> Result<Vec<SimilarityMatch>> {
            Ok(Vec::new())
        }

        async fn insert(&self, doc: &SubmittedDocument) -> Result<()> {
            if self.fail_insert {
                return Err(SrsGuardError::Storage("database is locked".into()));
            }
            self.inserted.lock().unwrap().push(doc.source_file.clone());
            Ok(())
        }

        async fn count(&self) -> Result<u64> {
            Ok(self.inserted.lock().unwrap().len() as u64)
        }
    }

    fn doc() -> SubmittedDocument {
        SubmittedDocument {
            id: DocId::new(),
            summary: "A campus library system".into(),
            skills: "Java".into(),
            source_file: "library.pdf".into(),
            file_size: 10,
            content_hash: "00".into(),
            embedding: vec![1.0, 0.0],
        }
    }

    fn decision(duplicate: bool) -> DecisionResult {
        DecisionResult {
            duplicate_detected: duplicate,
            max_score: if duplicate { 0.9 } else { 0.2 },
            matched_files: if duplicate { vec!["old.pdf".into()] } else { vec![] },
        }
    }

    #[tokio::test]
    async fn duplicates_are_not_inserted() {
        let corpus = RecordingCorpus::default();
        let outcome = admit(&corpus, &decision(true), &doc()).await;
        assert_eq!(outcome, AdmissionOutcome::Duplicate);
        assert!(!outcome.document_added());
        assert!(corpus.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn novel_documents_are_inserted_once() {
        let corpus = RecordingCorpus::default();
        let outcome = admit(&corpus, &decision(false), &doc()).await;
        assert_eq!(outcome, AdmissionOutcome::Inserted);
        assert!(outcome.document_added());
        assert_eq!(*corpus.inserted.lock().unwrap(), vec!["library.pdf".to_string()]);
    }

    #[tokio::test]
    async fn insert_failure_is_reported_not_raised() {
        let corpus = RecordingCorpus {
            fail_insert: true,
            ..Default::default()
        };
        let outcome = admit(&corpus, &decision(false), &doc()).await;
        match &outcome {
            AdmissionOutcome::InsertFailed(msg) => assert!(msg.contains("locked")),
            other => panic!("expected InsertFailed, got {other:?}"),
        }
        assert!(outcome.document_added());
    }
}
