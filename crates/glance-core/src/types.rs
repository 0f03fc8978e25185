// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the pipeline, normalizer, and transports.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One prior question/answer exchange from the session history.
///
/// History arrives already bounded by the caller (the session store is an
/// external collaborator); the pipeline forwards it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub question: String,
    pub answer: String,
}

/// A single request into the pipeline.
#[derive(Debug, Clone, Default)]
pub struct AskRequest {
    /// The user's question. Empty means "analyze the attached image with no
    /// specific prompt".
    pub question: String,

    /// Already-encoded still image (PNG bytes from the screenshot supplier).
    pub image: Option<Vec<u8>>,

    /// Chronological prior exchanges, possibly truncated by the caller.
    pub history: Vec<HistoryTurn>,

    /// Extra instructions appended to the system prompt.
    pub custom_instructions: Option<String>,
}

/// A code block extracted from the model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    pub description: String,
}

/// A link extracted from the model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub url: String,
    pub title: String,
    pub description: String,
}

/// The four-field normalized answer contract.
///
/// Constructed once per request by the normalizer and immutable afterwards.
/// All four fields are always present and well-shaped: `response` trims to at
/// least 10 characters (or the fixed placeholder), `suggested_questions`
/// holds at most 6 non-empty entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub response: String,
    pub code_blocks: Vec<CodeBlock>,
    pub links: Vec<LinkRef>,
    pub suggested_questions: Vec<String>,
}

/// Token usage reported by the external API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// An image attachment handed to a transport.
///
/// Raw encoded bytes plus their MIME type; the transport decides how to put
/// them on the wire (base64 data URL, multipart, ...).
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub media_type: String,
    pub data: Vec<u8>,
}

/// The wire-agnostic payload the orchestrator hands to a transport.
#[derive(Debug, Clone)]
pub struct TransportPayload {
    pub system_prompt: String,
    pub user_prompt: String,
    pub history: Vec<HistoryTurn>,
    pub image: Option<ImageAttachment>,
    /// Advisory cap on response tokens, computed by the budget planner.
    pub max_response_tokens: u32,
    /// The transport's own per-call timeout. Always longer than the
    /// orchestrator's watchdog deadline so the watchdog fires first.
    pub timeout: Duration,
}

/// What a transport returns on success.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub text: String,
    pub usage: TokenUsage,
}
