// Best-effort JSON extraction from model output
//
// Models wrap JSON in prose, markdown fences, or both. The extraction order:
// a ```json fence, any ``` fence, the first balanced {...} / [...] span, then
// the raw text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```json[ \t]*\r?\n?(.*?)(?:```|\z)").expect("valid regex")
});

static ANY_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)(?:```|\z)").expect("valid regex")
});

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model returned an empty response")]
    Empty,

    #[error("failed to parse JSON from model response: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("model JSON did not match the expected shape: {source}")]
    Shape {
        #[source]
        source: serde_json::Error,
        value: Value,
    },
}

impl ExtractError {
    /// The raw model text, when available (for debug logging)
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::InvalidJson { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Extract a JSON value from free-form model text
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    let candidate = candidate_span(text);

    serde_json::from_str(candidate).map_err(|source| {
        tracing::warn!("Failed to parse JSON: {}", source);
        tracing::debug!("Raw response:\n{}", text);
        ExtractError::InvalidJson {
            source,
            raw: text.to_string(),
        }
    })
}

/// Extract and decode into `T`
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let value = extract_json(text)?;
    serde_json::from_value(value.clone()).map_err(|source| ExtractError::Shape { source, value })
}

fn candidate_span(text: &str) -> &str {
    if text.contains("```json") {
        if let Some(body) = JSON_FENCE.captures(text).and_then(|c| c.get(1)) {
            return body.as_str().trim();
        }
    }

    if text.contains("```") {
        if let Some(body) = ANY_FENCE.captures(text).and_then(|c| c.get(1)) {
            let body = body.as_str().trim();
            if !body.is_empty() {
                return body;
            }
        }
    }

    balanced_span(text).unwrap_or_else(|| text.trim())
}

/// First `{...}` or `[...]` span, honoring strings and escapes.
///
/// When the brackets never balance (truncated output), falls back to the
/// span ending at the last matching closer so serde can report the error.
fn balanced_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let opener = text.as_bytes()[start];
    let closer = if opener == b'{' { b'}' } else { b']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    let end = text.as_bytes().iter().rposition(|&b| b == closer)?;
    (end > start).then(|| &text[start..=end])
}
