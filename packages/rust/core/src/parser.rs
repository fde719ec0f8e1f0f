//! Splits the summarizer's `SUMMARY:` / `SKILLS:` answer into its two parts.
//!
//! This is the only place that knows the answer format requested by the
//! prompt in `srsguard_llm::prompt`.

use srsguard_shared::{Result, SrsGuardError};

const SUMMARY_MARKER: &str = "SUMMARY:";
const SKILLS_MARKER: &str = "SKILLS:";

/// Summary and skills recovered from one summarizer answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSummary {
    /// Never empty.
    pub summary: String,
    /// Comma-separated list, empty when the answer had no `SKILLS:` section.
    pub skills: String,
}

/// Parse raw summarizer output.
///
/// Everything before the first `SKILLS:` is the summary, with every
/// `SUMMARY:` marker removed. Everything after it is the skills list.
/// An empty summary is a [`SrsGuardError::Parse`].
pub fn parse_summarizer_output(raw: &str) -> Result<ParsedSummary> {
    let (head, skills) = match raw.split_once(SKILLS_MARKER) {
        Some((head, tail)) => (head, tail.trim()),
        None => (raw, ""),
    };

    let summary = head.replace(SUMMARY_MARKER, "");
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(SrsGuardError::parse("summarizer output contains no summary"));
    }

    Ok(ParsedSummary {
        summary: summary.to_string(),
        skills: skills.to_string(),
    })
}
