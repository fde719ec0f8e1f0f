//! Response bodies.

use serde::{Deserialize, Serialize};
use srsguard_core::CheckReport;

/// Body of a successful `POST /check-plagiarism`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub plagiarism_detected: bool,
    /// Best similarity found, rounded to 4 decimals.
    pub max_score: f64,
    pub matched_files: Vec<String>,
    pub threshold: f64,
    pub document_added: bool,
}

impl From<&CheckReport> for CheckResponse {
    fn from(report: &CheckReport) -> Self {
        Self {
            plagiarism_detected: report.decision.duplicate_detected,
            max_score: round4(report.decision.max_score),
            matched_files: report.decision.matched_files.clone(),
            threshold: report.threshold,
            document_added: report.document_added(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
