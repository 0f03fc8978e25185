// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prose fallback: when no JSON candidate survives, mine the raw text
//! itself for code blocks and links and use the remaining prose as the
//! response.

use std::sync::LazyLock;

use regex::Regex;

use glance_core::{CodeBlock, LinkRef, StructuredAnswer};

use crate::{DEFAULT_SUGGESTED_QUESTIONS, MANUAL_RESPONSE_CAP, MIN_RESPONSE_CHARS, PLACEHOLDER_RESPONSE};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```([A-Za-z0-9_+-]*)\n?(.*?)```").unwrap());

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?://|www\.)[^\s<>"')\]]+"#).unwrap()
});

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Prose threshold below which the remainder is considered too thin and the
/// substantial-lines rescue kicks in.
const MIN_REMAINDER_CHARS: usize = 20;

/// Treats the whole text as prose: code fences become `code_blocks`, URLs
/// become `links`, and what remains is the response. Returns `None` when no
/// usable text survives.
pub(crate) fn from_prose(raw: &str) -> Option<StructuredAnswer> {
    let (code_blocks, without_code) = pull_code_blocks(raw);
    let links = pull_links(raw);

    let collapsed = BLANK_RUN.replace_all(&without_code, "\n\n");
    let mut response = collapsed.trim().to_string();

    if response.chars().count() < MIN_REMAINDER_CHARS {
        response = substantial_lines(raw);
    }
    if response.trim().chars().count() < MIN_RESPONSE_CHARS {
        return None;
    }

    Some(StructuredAnswer {
        response,
        code_blocks,
        links,
        suggested_questions: default_questions(),
    })
}

/// The guaranteed terminal strategy: raw text truncated hard, best-effort
/// code/link extraction, default questions. Never fails.
pub(crate) fn manual_fallback(raw: &str) -> StructuredAnswer {
    let (code_blocks, _) = pull_code_blocks(raw);
    let links = pull_links(raw);

    let mut response: String = raw.chars().take(MANUAL_RESPONSE_CAP).collect();
    response = response.trim().to_string();
    if response.chars().count() < MIN_RESPONSE_CHARS {
        response = PLACEHOLDER_RESPONSE.to_string();
    }

    StructuredAnswer {
        response,
        code_blocks,
        links,
        suggested_questions: default_questions(),
    }
}

pub(crate) fn default_questions() -> Vec<String> {
    DEFAULT_SUGGESTED_QUESTIONS
        .iter()
        .map(|q| q.to_string())
        .collect()
}

/// Extracts every fenced code block and returns the text with each matched
/// block removed exactly once.
fn pull_code_blocks(raw: &str) -> (Vec<CodeBlock>, String) {
    let mut blocks = Vec::new();
    let mut remaining = String::with_capacity(raw.len());
    let mut last_end = 0;

    for capture in CODE_FENCE.captures_iter(raw) {
        let whole = capture.get(0).unwrap();
        remaining.push_str(&raw[last_end..whole.start()]);
        last_end = whole.end();

        let language = capture.get(1).map(|m| m.as_str()).unwrap_or("");
        blocks.push(CodeBlock {
            language: if language.is_empty() {
                "text".to_string()
            } else {
                language.to_string()
            },
            code: capture.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            description: "Code block".to_string(),
        });
    }
    remaining.push_str(&raw[last_end..]);

    (blocks, remaining)
}

/// Extracts `http(s)://` and `www.` URLs, deriving a title from the five
/// words preceding the URL, falling back to the domain, then to a generic
/// label.
fn pull_links(raw: &str) -> Vec<LinkRef> {
    URL.find_iter(raw)
        .map(|found| {
            let url = found.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
            let preceding: Vec<&str> = raw[..found.start()]
                .split_whitespace()
                .rev()
                .take(5)
                .collect();
            let title = if preceding.is_empty() {
                domain_of(url).unwrap_or_else(|| "Reference Link".to_string())
            } else {
                preceding.into_iter().rev().collect::<Vec<_>>().join(" ")
            };
            LinkRef {
                url: url.to_string(),
                title,
                description: String::new(),
            }
        })
        .collect()
}

/// The host portion of a URL, without scheme or path.
fn domain_of(url: &str) -> Option<String> {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = without_scheme.split('/').next()?.trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Rescue for near-empty remainders: the first ten lines of the original
/// text longer than ten characters, joined by newlines.
fn substantial_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 10)
        .take(10)
        .collect::<Vec<_>>()
        .join("\n")
}
