// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort textual JSON repair.
//!
//! A chain of regex fixups for the malformations models actually produce:
//! trailing commas, unquoted keys, and unquoted scalar values. This is not a
//! lenient parser and does not try to be one; the output must still satisfy
//! `serde_json` or the candidate is discarded.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());

static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#).unwrap());

static BARE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#":\s*([A-Za-z_][^,"{}\[\]]*?)\s*([,}\]])"#).unwrap());

/// Applies the repair chain: trailing commas removed, bare keys quoted,
/// bare scalar values quoted. Numbers, booleans, and `null` are left alone.
pub(crate) fn repair_json(text: &str) -> String {
    let no_trailing = TRAILING_COMMA.replace_all(text, "$1");

    let keyed = BARE_KEY.replace_all(&no_trailing, |caps: &Captures| {
        format!("{}\"{}\":", &caps[1], &caps[2])
    });

    let valued = BARE_VALUE.replace_all(&keyed, |caps: &Captures| {
        let token = caps[1].trim();
        if matches!(token, "true" | "false" | "null") {
            format!(": {}{}", token, &caps[2])
        } else {
            format!(": \"{}\"{}", token, &caps[2])
        }
    });

    valued.into_owned()
}
