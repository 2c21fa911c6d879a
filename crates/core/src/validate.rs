//! Model-output validation.
//!
//! The model service is an untrusted black box: its reply is expected to be
//! JSON but is not guaranteed to be. [`validate_response`] turns the raw
//! reply into a [`DiagnosisResult`] or rejects it — there is no partial
//! recovery and no field-by-field defaulting. Two failure classes are kept
//! distinct so callers can report them separately:
//!
//! - [`PagePulseError::MalformedModelOutput`] — the reply is not a single
//!   JSON value at all;
//! - [`PagePulseError::SchemaViolation`] — the JSON misses a required
//!   field, has a mistyped field, or breaks a contractual arity (exactly 3
//!   top issues, exactly 5 quick wins).

use serde_json::Value;

use crate::diagnosis::{DiagnosisResult, QUICK_WIN_COUNT, TOP_ISSUE_COUNT};
use crate::{PagePulseError, Result};

/// Validates and deserializes the model's raw reply.
///
/// A single Markdown code fence around the value is tolerated and stripped;
/// everything else must be one JSON object of the diagnosis shape. The
/// returned result carries a default snapshot — the caller overwrites it
/// with the server-computed one.
pub fn validate_response(raw: &str) -> Result<DiagnosisResult> {
    let text = strip_code_fence(raw.trim());

    let value: Value =
        serde_json::from_str(text).map_err(|e| PagePulseError::MalformedModelOutput(e.to_string()))?;

    check_schema(&value)?;

    serde_json::from_value(value).map_err(|e| PagePulseError::SchemaViolation(e.to_string()))
}

/// Structural checks run before typed deserialization.
///
/// Produces field-specific messages that a bare serde error would bury, and
/// enforces the contractual arities server-side.
fn check_schema(value: &Value) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| PagePulseError::SchemaViolation("top-level value is not an object".to_string()))?;

    let summary = require(object, "summary")?;
    if !summary.is_string() {
        return Err(violation("summary", "must be a string"));
    }

    let score = require(object, "score")?;
    match score.as_u64() {
        Some(n) if n <= 100 => {}
        _ => return Err(violation("score", "must be an integer between 0 and 100")),
    }

    let breakdown = require(object, "breakdown")?;
    if !breakdown.is_object() {
        return Err(violation("breakdown", "must be an object"));
    }

    let top_issues = require_array(object, "top_issues")?;
    if top_issues.len() != TOP_ISSUE_COUNT {
        return Err(violation(
            "top_issues",
            &format!("must contain exactly {} items, got {}", TOP_ISSUE_COUNT, top_issues.len()),
        ));
    }

    let quick_wins = require_array(object, "quick_wins")?;
    if quick_wins.len() != QUICK_WIN_COUNT {
        return Err(violation(
            "quick_wins",
            &format!("must contain exactly {} items, got {}", QUICK_WIN_COUNT, quick_wins.len()),
        ));
    }

    // Length bounds for the plan and checklist are prompt-enforced only;
    // the type still has to be right.
    require_array(object, "priority_plan")?;
    if let Some(checklist) = object.get("checklist")
        && !checklist.is_array()
    {
        return Err(violation("checklist", "must be an array when present"));
    }

    Ok(())
}

fn require<'a>(object: &'a serde_json::Map<String, Value>, field: &str) -> Result<&'a Value> {
    object
        .get(field)
        .ok_or_else(|| violation(field, "is missing"))
}

fn require_array<'a>(object: &'a serde_json::Map<String, Value>, field: &str) -> Result<&'a Vec<Value>> {
    require(object, field)?
        .as_array()
        .ok_or_else(|| violation(field, "must be an array"))
}

fn violation(field: &str, problem: &str) -> PagePulseError {
    PagePulseError::SchemaViolation(format!("field \"{}\" {}", field, problem))
}

/// Strips one surrounding Markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Tolerate a language tag after the opening fence ("```json").
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    inner.trim()
}
