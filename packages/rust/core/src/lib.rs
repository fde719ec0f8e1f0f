//! Duplicate-detection workflow for SRS Guard.
//!
//! This crate holds the decision logic (output parsing, duplicate decision,
//! corpus admission) and the `check_document` pipeline that drives the
//! extractor, summarizer, embedder, and corpus collaborators through it.

pub mod admission;
pub mod decision;
pub mod parser;
pub mod pipeline;
pub mod services;

pub use admission::{AdmissionOutcome, admit};
pub use decision::{DUPLICATE_THRESHOLD, decide};
pub use parser::{ParsedSummary, parse_summarizer_output};
pub use pipeline::{CheckReport, ProgressReporter, SilentProgress, Upload, check_document};
pub use services::{Corpus, Embedder, PdfExtractor, Services, Summarizer, TextExtractor};
