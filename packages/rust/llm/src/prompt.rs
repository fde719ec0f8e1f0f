//! The SRS summarization prompt.
//!
//! The model is asked to answer in the `SUMMARY:` / `SKILLS:` layout that the
//! output parser in `srsguard-core` splits apart. Changing the markers here
//! means changing them there too.

/// Placeholder replaced with the extracted document text.
const TEXT_PLACEHOLDER: &str = "{text}";

/// Appended when the document text was cut to fit the input budget.
const TRUNCATION_MARKER: &str = "\n\n[... document truncated to fit the model context ...]";

/// Prompt template sent as the single user message.
pub const SRS_SUMMARY_TEMPLATE: &str = r#"
You are a summarization assistant for student SRS documents.

Only consider the following **key sections** from the text:
- 1.1 Purpose
- 1.4 Product Scope
- 2.1 Product Perspective
- 2.2 Product Functions
- 4.1 System Features

Ignore sections like UI details, hardware specs, legal, glossary, etc.

**Task**:
1. Create a concise and semantically rich summary (5-7 bullet points) **without including explicit lists of skills or technologies**.
2. Extract the skills/technologies separately as a comma-separated list.

Summary should cover:
- Project title
- Goal or problem being solved
- Main features or modules
- Any unique or innovative aspects

Skills should be:
- Programming languages
- Frameworks
- Libraries
- Tools
- Cloud platforms
- Databases

Format your answer as:
SUMMARY:
<summary text>

SKILLS:
<comma-separated skills list>

SRS Text:
{text}
"#;

/// Fill the template with `text`, cut to at most `max_chars` characters.
pub fn render_summary_prompt(text: &str, max_chars: usize) -> String {
    SRS_SUMMARY_TEMPLATE.replace(TEXT_PLACEHOLDER, &truncate_content(text, max_chars))
}

/// Truncate content to at most `max_chars` characters on a char boundary.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &content[..byte_idx]),
    }
}
