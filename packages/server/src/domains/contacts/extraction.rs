//! Locate the JSON payload inside raw model text.
//!
//! Models wrap their answer in prose or markdown fences often enough that the
//! raw completion can't be handed to `serde_json` directly. Candidates are the
//! whole reply (edge fences stripped) and then the inside of each fenced
//! block; each is cut from its first opening to its last closing bracket.
//! Nothing is repaired: if no candidate parses, the batch fails with the raw
//! text attached.

use serde_json::{Map, Value};

use super::errors::PipelineError;

/// Strip a leading ```` ```json ````/```` ``` ```` fence and a trailing ```` ``` ````.
///
/// Only fences at the edges of the (trimmed) text are removed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Inner text of every ```` ``` ```` block, language tag removed.
fn fenced_blocks(raw: &str) -> impl Iterator<Item = &str> {
    raw.split("```").skip(1).step_by(2).map(|block| {
        block
            .strip_prefix("json")
            .or_else(|| block.strip_prefix("JSON"))
            .unwrap_or(block)
            .trim()
    })
}

/// Span from the first `open` to the last `close`, inclusive.
fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn malformed(reason: impl Into<String>, raw: &str) -> PipelineError {
    PipelineError::MalformedOutput {
        reason: reason.into(),
        raw: raw.to_string(),
    }
}

/// What a candidate span has to parse into.
struct Shape<T> {
    name: &'static str,
    open: char,
    close: char,
    pick: fn(Value) -> Option<T>,
}

fn into_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

fn into_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

const ARRAY: Shape<Vec<Value>> = Shape {
    name: "array",
    open: '[',
    close: ']',
    pick: into_array,
};

const OBJECT: Shape<Map<String, Value>> = Shape {
    name: "object",
    open: '{',
    close: '}',
    pick: into_object,
};

fn parse_candidate<T>(text: &str, shape: &Shape<T>) -> Result<T, String> {
    let span = delimited_span(text, shape.open, shape.close)
        .ok_or_else(|| format!("no JSON {} found in model output", shape.name))?;
    let value = serde_json::from_str::<Value>(span)
        .map_err(|e| format!("invalid JSON {}: {}", shape.name, e))?;
    (shape.pick)(value).ok_or_else(|| format!("model output is not a JSON {}", shape.name))
}

/// The whole reply first, then each fenced block. The reported reason is the
/// whole-reply failure.
fn extract<T>(raw: &str, shape: &Shape<T>) -> Result<T, PipelineError> {
    let reason = match parse_candidate(strip_code_fences(raw), shape) {
        Ok(value) => return Ok(value),
        Err(reason) => reason,
    };

    fenced_blocks(raw)
        .find_map(|block| parse_candidate(block, shape).ok())
        .ok_or_else(|| malformed(reason, raw))
}

/// Extract the JSON array of candidate rows from a completion.
///
/// An empty array is a valid result.
pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, PipelineError> {
    extract(raw, &ARRAY)
}

/// Extract a single JSON object from a completion (used by enrichment).
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, PipelineError> {
    extract(raw, &OBJECT)
}
