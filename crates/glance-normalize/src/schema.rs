// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema validation and repair for parsed answer candidates.
//!
//! Whatever strategy wins, the object that comes out of it is conformed
//! here: all four fields present, entries coerced to their expected shapes,
//! and a response backfilled from sibling fields when the model put its
//! answer under the wrong key.

use serde_json::Value;

use glance_core::{CodeBlock, LinkRef, StructuredAnswer};

use crate::{content, MIN_RESPONSE_CHARS, PLACEHOLDER_RESPONSE};

/// Keys checked first when backfilling a missing or too-short `response`.
const PREFERRED_RESPONSE_KEYS: [&str; 4] = ["content", "text", "message", "answer"];

/// Conforms a parsed value to the four-field contract. Returns `None` when
/// the value is not a JSON object at all.
pub(crate) fn conform(value: &Value) -> Option<StructuredAnswer> {
    let object = value.as_object()?;

    let mut response = object
        .get("response")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    if response.chars().count() < MIN_RESPONSE_CHARS {
        response = backfill_response(object)
            .unwrap_or_else(|| PLACEHOLDER_RESPONSE.to_string());
    }

    Some(StructuredAnswer {
        response,
        code_blocks: conform_code_blocks(object.get("code_blocks")),
        links: conform_links(object.get("links")),
        suggested_questions: conform_questions(object.get("suggested_questions")),
    })
}

/// Searches the object's other string fields for usable response text:
/// preferred keys first, then any string value longer than ten characters.
fn backfill_response(object: &serde_json::Map<String, Value>) -> Option<String> {
    for key in PREFERRED_RESPONSE_KEYS {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            let trimmed = text.trim();
            if trimmed.chars().count() >= MIN_RESPONSE_CHARS {
                return Some(trimmed.to_string());
            }
        }
    }

    object
        .iter()
        .filter(|(key, _)| key.as_str() != "response")
        .filter_map(|(_, value)| value.as_str())
        .map(str::trim)
        .find(|text| text.chars().count() > 10)
        .map(str::to_string)
}

/// Coerces `code_blocks` entries, dropping anything that is not an object.
fn conform_code_blocks(value: Option<&Value>) -> Vec<CodeBlock> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| CodeBlock {
            language: string_or(entry.get("language"), "text"),
            code: string_or(entry.get("code"), ""),
            description: string_or(entry.get("description"), "Code block"),
        })
        .collect()
}

/// Coerces `links` entries; a `url` key is required, everything else
/// defaults.
fn conform_links(value: Option<&Value>) -> Vec<LinkRef> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let url = entry.get("url").and_then(Value::as_str)?.trim();
            if url.is_empty() {
                return None;
            }
            Some(LinkRef {
                url: url.to_string(),
                title: string_or(entry.get("title"), "Link"),
                description: string_or(entry.get("description"), ""),
            })
        })
        .collect()
}

/// Trims, filters, and caps `suggested_questions` at six entries,
/// substituting the fixed default set when nothing survives.
fn conform_questions(value: Option<&Value>) -> Vec<String> {
    let questions: Vec<String> = value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .take(6)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if questions.is_empty() {
        content::default_questions()
    } else {
        questions
    }
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}
