// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response normalization for the Glance pipeline.
//!
//! [`normalize`] turns whatever the model produced -- clean JSON, JSON buried
//! in prose or fences, near-JSON, or plain text -- into a [`StructuredAnswer`]
//! with all four fields present and well-shaped. It is total: every input,
//! including the empty string and megabytes of garbage, yields an answer.
//!
//! Strategy chain, first hit wins:
//! 1. direct parse of the whole string
//! 2. candidate extraction (fences, balanced braces, outermost slice) with
//!    cleanup and textual repair
//! 3. content extraction over the raw prose
//! 4. manual fallback (hard truncation + defaults)
//!
//! No strategy is allowed to fail the chain; each miss falls through to the
//! next, and the manual fallback always produces a value.

mod content;
mod extract;
mod repair;
mod schema;

use serde_json::Value;
use tracing::debug;

use glance_core::StructuredAnswer;

/// Minimum trimmed length for a `response` to count as real content.
pub const MIN_RESPONSE_CHARS: usize = 10;

/// Hard cap applied to the response in the lowest-confidence fallback path.
pub const MANUAL_RESPONSE_CAP: usize = 3_000;

/// Substituted when no usable response text can be recovered at all.
pub const PLACEHOLDER_RESPONSE: &str =
    "I was unable to read a useful answer from the model. Please try asking again.";

/// Substituted when extraction yields no suggested questions.
pub const DEFAULT_SUGGESTED_QUESTIONS: [&str; 6] = [
    "What should I do next?",
    "How can I improve this?",
    "Are there any issues I should fix?",
    "Can you explain this in more detail?",
    "What does this part of the screen mean?",
    "Is there a better approach?",
];

/// Normalizes raw model text into a structured answer. Total; never fails.
pub fn normalize(raw: &str) -> StructuredAnswer {
    // Strategy 1: the whole string is already JSON.
    if let Ok(value) = serde_json::from_str::<Value>(raw.trim())
        && let Some(answer) = schema::conform(&value)
        && is_substantive(&answer)
    {
        return answer;
    }

    // Strategy 2: candidate substrings in pattern order, cleaned and
    // repaired. A candidate wins only if its own response field carries
    // enough text; backfill is reserved for the direct-parse path where the
    // object is unambiguous.
    for candidate in extract::candidates(raw) {
        if let Some(value) = extract::parse_candidate(&candidate)
            && response_field_is_usable(&value)
            && let Some(answer) = schema::conform(&value)
        {
            return answer;
        }
    }

    // Strategy 3: treat the text as prose.
    if let Some(answer) = content::from_prose(raw) {
        debug!("no JSON candidate qualified, used content extraction");
        return answer;
    }

    // Strategy 4: guaranteed terminal case.
    debug!("content extraction found nothing usable, using manual fallback");
    content::manual_fallback(raw)
}

/// Normalizes an already-parsed value, for callers that hold structured
/// output rather than text. Non-object or unusable values degrade to the
/// text pipeline over the value's serialized form.
pub fn normalize_value(value: &Value) -> StructuredAnswer {
    if let Some(answer) = schema::conform(value)
        && is_substantive(&answer)
    {
        return answer;
    }
    normalize(&value.to_string())
}

/// Whether the normalized answer carries recovered content rather than the
/// placeholder.
pub fn is_substantive(answer: &StructuredAnswer) -> bool {
    answer.response.trim().chars().count() >= MIN_RESPONSE_CHARS
        && answer.response != PLACEHOLDER_RESPONSE
}

fn response_field_is_usable(value: &Value) -> bool {
    value
        .get("response")
        .and_then(Value::as_str)
        .map(|s| s.trim().chars().count() >= MIN_RESPONSE_CHARS)
        .unwrap_or(false)
}
