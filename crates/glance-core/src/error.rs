// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Glance request pipeline.
//!
//! `Display` strings double as the user-facing messages: the consumer renders
//! them verbatim, so every variant reads as a short, actionable sentence
//! rather than a debug dump.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across the Glance pipeline and transports.
#[derive(Debug, Error)]
pub enum GlanceError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The API rejected the call for exceeding its rate limits (HTTP 429).
    #[error("rate limit exceeded, try again shortly")]
    RateLimited,

    /// The API rejected the credentials (HTTP 401/403).
    #[error("invalid API key")]
    AuthFailed,

    /// The API rejected the request shape itself (other 4xx).
    #[error("the API rejected the request: {detail}")]
    BadRequest { detail: String },

    /// The API could not be reached, or dropped the connection mid-call.
    #[error("could not reach the API: {detail}")]
    ConnectionFailed { detail: String },

    /// The call exceeded its wall-clock deadline.
    #[error("request timed out after {} seconds", duration.as_secs())]
    Timeout { duration: Duration },

    /// The model returned fewer than 10 meaningful characters.
    #[error("the model returned an empty or unusable answer")]
    EmptyOutput,

    /// Anything that does not fit the taxonomy above.
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl GlanceError {
    /// Whether the pipeline may retry after this error.
    ///
    /// Credential and request-shape failures are surfaced immediately; there
    /// is nothing a second identical attempt could fix.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            GlanceError::AuthFailed | GlanceError::BadRequest { .. } | GlanceError::Config(_)
        )
    }
}
