//! End-to-end check: PDF bytes → text → summary → embedding → search →
//! decision → admission.

use std::time::{Duration, Instant};

use srsguard_shared::{
    DecisionResult, DocId, Result, SubmittedDocument, UpstreamService, content_hash,
};
use tracing::{error, info, instrument};

use crate::admission::{AdmissionOutcome, admit};
use crate::decision::{DUPLICATE_THRESHOLD, decide};
use crate::parser::parse_summarizer_output;
use crate::services::{Services, upstream_error};

/// One already-validated upload.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename, kept as the document label.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of [`check_document`].
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Identifier assigned to the submitted document.
    pub doc_id: DocId,
    pub source_file: String,
    pub decision: DecisionResult,
    pub outcome: AdmissionOutcome,
    /// Threshold the decision was made against.
    pub threshold: f64,
    pub elapsed: Duration,
}

impl CheckReport {
    pub fn document_added(&self) -> bool {
        self.outcome.document_added()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the check completes.
    fn done(&self, report: &CheckReport);
}

/// No-op progress reporter for the server and tests.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &CheckReport) {}
}

/// Run the duplicate check for one upload.
///
/// Extraction, summarizer, parse, embedding, and search failures abort the
/// check. An insert failure does not; it shows up as
/// [`AdmissionOutcome::InsertFailed`] in the report.
#[instrument(skip_all, fields(file = %upload.filename, bytes = upload.bytes.len()))]
pub async fn check_document(
    services: &Services,
    upload: Upload,
    progress: &dyn ProgressReporter,
) -> Result<CheckReport> {
    let start = Instant::now();

    // --- Phase 1: Extraction ---
    progress.phase("Extracting text");
    let text = services.extractor.extract(&upload.bytes).await?;
    info!(chars = text.len(), "text extracted");

    // --- Phase 2: Summarization ---
    progress.phase("Summarizing");
    let raw = services
        .summarizer
        .summarize(&text)
        .await
        .map_err(upstream_error(UpstreamService::Summarizer))
        .inspect_err(|e| error!(error = %e, "summarization failed"))?;
    let parsed = parse_summarizer_output(&raw)
        .inspect_err(|e| error!(error = %e, "could not parse summarizer output"))?;

    // --- Phase 3: Embedding ---
    progress.phase("Embedding summary");
    let embedding = services
        .embedder
        .embed(&parsed.summary)
        .await
        .map_err(upstream_error(UpstreamService::Embedder))
        .inspect_err(|e| error!(error = %e, "embedding failed"))?;

    let doc = SubmittedDocument {
        id: DocId::new(),
        summary: parsed.summary,
        skills: parsed.skills,
        source_file: upload.filename,
        file_size: upload.bytes.len() as u64,
        content_hash: content_hash(&upload.bytes),
        embedding,
    };

    // --- Phase 4: Search + decision ---
    progress.phase("Searching corpus");
    let matches = services
        .corpus
        .search(&doc.embedding, services.top_k)
        .await
        .map_err(upstream_error(UpstreamService::Corpus))
        .inspect_err(|e| error!(error = %e, "corpus search failed"))?;
    let decision = decide(&matches);
    info!(
        matches = matches.len(),
        max_score = decision.max_score,
        duplicate = decision.duplicate_detected,
        "decision made"
    );

    // --- Phase 5: Admission ---
    progress.phase("Updating corpus");
    let outcome = admit(services.corpus.as_ref(), &decision, &doc).await;

    let report = CheckReport {
        doc_id: doc.id,
        source_file: doc.source_file,
        decision,
        outcome,
        threshold: DUPLICATE_THRESHOLD,
        elapsed: start.elapsed(),
    };
    progress.done(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use srsguard_shared::{ExtractionKind, SimilarityMatch, SrsGuardError};

    use crate::services::{Corpus, Embedder, Summarizer, TextExtractor};

    struct FixedText(std::result::Result<&'static str, ExtractionKind>);

    #[async_trait]
    impl TextExtractor for FixedText {
        async fn extract(&self, _data: &[u8]) -> Result<String> {
            self.0.map(str::to_string).map_err(|kind| {
                SrsGuardError::extraction(kind, "PDF file contains no extractable text")
            })
        }
    }

    struct FixedSummary(Option<&'static str>);

    #[async_trait]
    impl Summarizer for FixedSummary {
        async fn summarize(&self, _text: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| SrsGuardError::config("model unavailable"))
        }
    }

    struct FixedEmbedding;

    #[async_trait]
    impl Embedder for FixedEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5, 0.5])
        }
    }

    #[derive(Default)]
    struct FakeCorpus {
        matches: Vec<SimilarityMatch>,
        fail_search: bool,
        fail_insert: bool,
        inserts: Mutex<Vec<SubmittedDocument>>,
        searched_k: Mutex<Option<usize>>,
    }

    #[async_trait]
    impl Corpus for FakeCorpus {
        async fn search(&self, _vector: &[f32], k: usize) -> Result<Vec<SimilarityMatch>> {
            *self.searched_k.lock().unwrap() = Some(k);
            if self.fail_search {
                return Err(SrsGuardError::Storage("index unavailable".into()));
            }
            Ok(self.matches.clone())
        }

        async fn insert(&self, doc: &SubmittedDocument) -> Result<()> {
            if self.fail_insert {
                return Err(SrsGuardError::Storage("write failed".into()));
            }
            self.inserts.lock().unwrap().push(doc.clone());
            Ok(())
        }

        async fn count(&self) -> Result<u64> {
            Ok(self.inserts.lock().unwrap().len() as u64)
        }
    }

    const GOOD_OUTPUT: &str = "SUMMARY:\n- Hotel booking portal\n\nSKILLS:\nReact, Node.js";

    fn services(corpus: Arc<FakeCorpus>) -> Services {
        Services {
            extractor: Arc::new(FixedText(Ok("1.1 Purpose: hotel bookings"))),
            summarizer: Arc::new(FixedSummary(Some(GOOD_OUTPUT))),
            embedder: Arc::new(FixedEmbedding),
            corpus,
            top_k: 3,
        }
    }

    fn upload() -> Upload {
        Upload {
            filename: "hotel.pdf".into(),
            bytes: b"%PDF-1.4 fake".to_vec(),
        }
    }

    #[tokio::test]
    async fn novel_document_is_admitted() {
        let corpus = Arc::new(FakeCorpus {
            matches: vec![SimilarityMatch::new("other.pdf", 0.42)],
            ..Default::default()
        });
        let report = check_document(&services(corpus.clone()), upload(), &SilentProgress)
            .await
            .expect("check");

        assert!(!report.decision.duplicate_detected);
        assert_eq!(report.decision.max_score, 0.42);
        assert!(report.document_added());
        assert_eq!(report.threshold, 0.75);
        assert_eq!(*corpus.searched_k.lock().unwrap(), Some(3));

        let inserts = corpus.inserts.lock().unwrap();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].summary, "- Hotel booking portal");
        assert_eq!(inserts[0].skills, "React, Node.js");
        assert_eq!(inserts[0].source_file, "hotel.pdf");
        assert_eq!(inserts[0].file_size, 13);
        assert_eq!(inserts[0].embedding, vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn duplicate_document_is_not_admitted() {
        let corpus = Arc::new(FakeCorpus {
            matches: vec![
                SimilarityMatch::new("first.pdf", 0.91),
                SimilarityMatch::new("second.pdf", 0.8),
            ],
            ..Default::default()
        });
        let report = check_document(&services(corpus.clone()), upload(), &SilentProgress)
            .await
            .expect("check");

        assert!(report.decision.duplicate_detected);
        assert_eq!(report.decision.matched_files, vec!["first.pdf", "second.pdf"]);
        assert!(!report.document_added());
        assert!(corpus.inserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_failure_keeps_the_decision() {
        let corpus = Arc::new(FakeCorpus {
            matches: vec![SimilarityMatch::new("other.pdf", 0.3)],
            fail_insert: true,
            ..Default::default()
        });
        let report = check_document(&services(corpus), upload(), &SilentProgress)
            .await
            .expect("insert failure must not fail the check");

        assert!(!report.decision.duplicate_detected);
        assert_eq!(report.decision.max_score, 0.3);
        assert!(matches!(report.outcome, AdmissionOutcome::InsertFailed(_)));
        assert!(report.document_added());
    }

    #[tokio::test]
    async fn extraction_errors_pass_through() {
        let mut svc = services(Arc::new(FakeCorpus::default()));
        svc.extractor = Arc::new(FixedText(Err(ExtractionKind::Empty)));
        let err = check_document(&svc, upload(), &SilentProgress).await.unwrap_err();
        assert!(matches!(
            err,
            SrsGuardError::Extraction {
                kind: ExtractionKind::Empty,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn summarizer_failure_is_tagged() {
        let corpus = Arc::new(FakeCorpus::default());
        let mut svc = services(corpus.clone());
        svc.summarizer = Arc::new(FixedSummary(None));
        let err = check_document(&svc, upload(), &SilentProgress).await.unwrap_err();
        assert!(matches!(
            err,
            SrsGuardError::Upstream {
                service: UpstreamService::Summarizer,
                ..
            }
        ));
        assert!(corpus.searched_k.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn unparseable_summary_is_a_parse_error() {
        let corpus = Arc::new(FakeCorpus::default());
        let mut svc = services(corpus.clone());
        svc.summarizer = Arc::new(FixedSummary(Some("SUMMARY:\n")));
        let err = check_document(&svc, upload(), &SilentProgress).await.unwrap_err();
        assert!(matches!(err, SrsGuardError::Parse { .. }));
        assert!(corpus.inserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_failure_is_tagged_and_nothing_is_inserted() {
        let corpus = Arc::new(FakeCorpus {
            fail_search: true,
            ..Default::default()
        });
        let err = check_document(&services(corpus.clone()), upload(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SrsGuardError::Upstream {
                service: UpstreamService::Corpus,
                ..
            }
        ));
        assert!(corpus.inserts.lock().unwrap().is_empty());
    }
}
