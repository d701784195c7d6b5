//! Best-effort JSON extraction from free-form model output.
//!
//! Search-grounded completions cannot use a response schema, so the JSON
//! arrives wrapped in prose or code fences.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{AgentError, AgentResult};

/// Returns the slice from the first `{` to the last `}` after removing code
/// fences, or the fence-stripped text when no such span exists.
pub fn extract_json_block(text: &str) -> String {
    let clean = text.replace("```json", "").replace("```", "");

    match (clean.find('{'), clean.rfind('}')) {
        (Some(start), Some(end)) if end > start => clean[start..=end].to_string(),
        _ => clean.trim().to_string(),
    }
}

/// Parses a JSON object out of `text`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> AgentResult<T> {
    if text.trim().is_empty() {
        return Err(AgentError::Extraction("empty response text".to_string()));
    }

    let block = extract_json_block(text);
    serde_json::from_str(&block).map_err(|e| {
        warn!(
            error = %e,
            content_preview = %text.chars().take(200).collect::<String>(),
            "Failed to parse JSON from model output"
        );
        AgentError::Extraction(e.to_string())
    })
}
