//! Duplicate decision over corpus search results.

use srsguard_shared::{DecisionResult, SimilarityMatch};

/// Similarity at or above which two documents count as duplicates.
pub const DUPLICATE_THRESHOLD: f64 = 0.75;

/// Decide whether `matches` (best first) contain a near-duplicate.
///
/// `max_score` is the best score seen regardless of the threshold and stays
/// at 0 for an empty or all-negative result. `matched_files` keeps
/// first-seen order and drops repeats.
pub fn decide(matches: &[SimilarityMatch]) -> DecisionResult {
    let mut max_score = 0.0_f64;
    let mut matched_files: Vec<String> = Vec::new();

    for m in matches {
        if m.score > max_score {
            max_score = m.score;
        }
        if m.score >= DUPLICATE_THRESHOLD && !matched_files.contains(&m.matched_source_file) {
            matched_files.push(m.matched_source_file.clone());
        }
    }

    DecisionResult {
        duplicate_detected: !matched_files.is_empty(),
        max_score,
        matched_files,
    }
}
