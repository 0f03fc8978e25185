// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate JSON extraction from raw model text.
//!
//! Models wrap their JSON in markdown fences, preamble prose, or both, and
//! frequently emit near-JSON (smart quotes, literal newlines inside strings).
//! This module finds candidate substrings in a fixed pattern order and
//! cleans each one up enough for `serde_json` to have a fair shot.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::repair;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)```json\s*(.*?)```").unwrap());

static FENCED_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:[A-Za-z0-9_+-]*)\s*(.*?)```").unwrap());

/// Collects candidate JSON substrings from `raw`, most-specific pattern
/// first: ```json fences, plain fences, balanced top-level `{...}` runs,
/// and finally the first-`{`-to-last-`}` slice.
pub(crate) fn candidates(raw: &str) -> Vec<String> {
    let mut found = Vec::new();

    for capture in FENCED_JSON.captures_iter(raw) {
        found.push(capture[1].to_string());
    }
    for capture in FENCED_ANY.captures_iter(raw) {
        found.push(capture[1].to_string());
    }
    for object in balanced_objects(raw) {
        found.push(object.to_string());
    }
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}'))
        && start < end
    {
        found.push(raw[start..=end].to_string());
    }

    found
}

/// Cleans up a candidate and parses it, applying the textual repair pass on
/// a first parse failure. Returns the parsed value or `None`.
pub(crate) fn parse_candidate(candidate: &str) -> Option<Value> {
    let cleaned = cleanup(candidate);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Some(value);
    }

    let repaired = repair::repair_json(&cleaned);
    serde_json::from_str::<Value>(&repaired).ok()
}

/// Cleanup applied to every candidate before parsing: fence stripping,
/// smart-quote normalization, bare-newline escaping inside strings, and a
/// trim to the outermost braces (which also discards stray prose).
fn cleanup(candidate: &str) -> String {
    let defenced = strip_fences(candidate);
    let ascii_quoted = normalize_quotes(defenced);
    let escaped = escape_control_chars_in_strings(&ascii_quoted);
    trim_to_braces(&escaped).to_string()
}

/// Removes leading/trailing markdown fence lines if present.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Replaces typographic quotes with their ASCII equivalents.
fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' | '\u{201e}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Escapes literal newlines, carriage returns, and tabs that appear inside
/// JSON string literals. Models routinely emit multi-line `response` values
/// without escaping them.
fn escape_control_chars_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                in_string = !in_string;
                out.push(c);
            }
            '\n' if in_string => out.push_str("\\n"),
            '\r' if in_string => out.push_str("\\r"),
            '\t' if in_string => out.push_str("\\t"),
            other => out.push(other),
        }
    }

    out
}

/// Slices to the outermost `{...}` span, or returns the input unchanged when
/// no brace pair exists.
fn trim_to_braces(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Finds all top-level balanced `{...}` spans, skipping over string
/// literals so braces inside values do not confuse the depth count.
fn balanced_objects(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = matching_brace(bytes, i) {
                spans.push(&text[i..=end]);
                i = end + 1;
                continue;
            }
            // Scan hit end of text with unclosed braces. Later opens are
            // left to the outermost-slice fallback; rescanning from every
            // position would go quadratic on brace-heavy garbage.
            break;
        }
        i += 1;
    }

    spans
}

/// Returns the index of the brace matching the one at `open`, if any.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[open..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}
