//! Tolerant parsing of JSON embedded in model output.
//!
//! Models asked for "only JSON" still wrap it in Markdown fences or prose.
//! [`parse_structured`] tries, in order: the whole text, the contents of the
//! first code fence, and every balanced `{...}` / `[...]` substring from the
//! longest down.

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;
use tracing::debug;

/// Errors from [`parse_structured`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text is empty or whitespace.
    #[error("model response is empty")]
    Empty,

    /// No JSON object or array could be located.
    #[error("no JSON object or array found in model response")]
    NoJson,

    /// JSON was found but does not have the expected shape.
    #[error("model response JSON has an unexpected shape: {0}")]
    Invalid(String),
}

/// Parses `raw` into `T`, tolerating fences and surrounding prose.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    // Valid JSON with the wrong shape is remembered so it is not reported as NoJson.
    let mut shape_error: Option<String> = None;

    match serde_json::from_str::<T>(text) {
        Ok(value) => return Ok(value),
        Err(e) if e.classify() == Category::Data => shape_error = Some(e.to_string()),
        Err(_) => {}
    }

    if let Some(fenced) = strip_code_fence(text) {
        match serde_json::from_str::<T>(fenced) {
            Ok(value) => {
                debug!("Parsed structured output from code fence");
                return Ok(value);
            }
            Err(e) if e.classify() == Category::Data => shape_error = Some(e.to_string()),
            Err(_) => {}
        }
    }

    let mut candidates = balanced_spans(text);
    candidates.sort_by(|a, b| (b.1 - b.0).cmp(&(a.1 - a.0)).then(a.0.cmp(&b.0)));

    let mut first_error: Option<String> = None;
    for (start, end) in &candidates {
        match serde_json::from_str::<T>(&text[*start..*end]) {
            Ok(value) => {
                debug!(start, end, candidates = candidates.len(), "Parsed structured output from embedded JSON");
                return Ok(value);
            }
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match first_error.or(shape_error) {
        Some(message) => Err(ParseError::Invalid(message)),
        None => Err(ParseError::NoJson),
    }
}

/// Returns the body of the first Markdown code fence, if any.
fn strip_code_fence(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip the info string (e.g. "json") up to the end of the fence line.
    let body_start = after_open.find('\n').map_or(after_open.len(), |i| i + 1);
    let body = &after_open[body_start..];
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    let body = body.trim();
    if body.is_empty() { None } else { Some(body) }
}

/// Byte spans of every balanced `{...}` or `[...]` substring.
///
/// Brackets inside JSON strings are ignored, and escapes inside strings are
/// honoured. A start position whose brackets never balance yields no span.
///
/// Every opener is scanned forward on its own, so input with many unclosed
/// openers costs time quadratic in its length. Callers pass single model
/// responses, which stay small enough for that.
fn balanced_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();

    for (start, &open) in bytes.iter().enumerate() {
        if open != b'{' && open != b'[' {
            continue;
        }

        let mut stack: Vec<u8> = Vec::new();
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &byte) in bytes[start..].iter().enumerate() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                }
                continue;
            }

            match byte {
                b'"' => in_string = true,
                b'{' => stack.push(b'}'),
                b'[' => stack.push(b']'),
                b'}' | b']' => {
                    if stack.pop() != Some(byte) {
                        break;
                    }
                    if stack.is_empty() {
                        spans.push((start, start + offset + 1));
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    spans
}
