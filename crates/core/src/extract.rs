//! # Structured-Output Extraction
//!
//! Recovers a well-formed JSON value from free-form agent output.
//! Model output is rarely pure JSON: it may be wrapped in markdown
//! fences, preceded by commentary, or followed by trailing narration.
//! Objects are located by brace counting (a naive first-`{`-to-last-`}`
//! scan breaks on nested objects); arrays take the span between the
//! first `[` and the last `]` since result arrays do not nest.

use thiserror::Error;

/// How many characters of the offending input to keep for diagnostics
const SNIPPET_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// No balanced JSON object/array could be located in the text
    #[error("no balanced JSON {shape} found in agent output")]
    MalformedOutput { shape: &'static str },

    /// A candidate span was located but failed to parse
    #[error("invalid JSON in agent output (input started with: {snippet:?})")]
    Parse {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Extract the first balanced JSON object from `text`.
pub fn json_object(text: &str) -> Result<serde_json::Value, ExtractError> {
    let text = strip_fences(text);

    let start = text.find('{').ok_or(ExtractError::MalformedOutput { shape: "object" })?;
    let mut depth = 0usize;
    let mut end = None;
    for (i, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + i + 1);
                    break;
                }
            }
            _ => {}
        }
    }

    // Depth never returned to zero: truncated or unbalanced output
    let end = end.ok_or(ExtractError::MalformedOutput { shape: "object" })?;
    parse_span(&text[start..end], text)
}

/// Extract a JSON array from `text` (first `[` to last `]`).
pub fn json_array(text: &str) -> Result<serde_json::Value, ExtractError> {
    let text = strip_fences(text);

    let start = text.find('[').ok_or(ExtractError::MalformedOutput { shape: "array" })?;
    let end = text.rfind(']').ok_or(ExtractError::MalformedOutput { shape: "array" })?;
    if end < start {
        return Err(ExtractError::MalformedOutput { shape: "array" });
    }
    parse_span(&text[start..=end], text)
}

fn parse_span(span: &str, original: &str) -> Result<serde_json::Value, ExtractError> {
    serde_json::from_str(span).map_err(|source| ExtractError::Parse {
        snippet: original.chars().take(SNIPPET_LEN).collect(),
        source,
    })
}

/// Strip one leading ```json (or bare ```) fence and one trailing ``` fence.
fn strip_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
