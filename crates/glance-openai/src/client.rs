// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Chat Completions API.
//!
//! One [`OpenAiClient::send_chat`] call is exactly one HTTP request: retry,
//! backoff, and the watchdog deadline all belong to the orchestrator. The
//! client's job is authentication, the per-call timeout, cooperative
//! cancellation, and mapping HTTP outcomes onto the error taxonomy.

use std::time::Duration;

use glance_core::GlanceError;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Base URL for the Chat Completions API.
const API_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// HTTP client for OpenAI API communication.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new client with the given API key baked into its default
    /// headers. No client-wide timeout is set; each call carries its own.
    pub fn new(api_key: &str) -> Result<Self, GlanceError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| GlanceError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GlanceError::ConnectionFailed {
                detail: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL, for tests and OpenAI-compatible endpoints.
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends one chat request with the given per-call timeout, observing the
    /// cancellation token throughout.
    pub async fn send_chat(
        &self,
        request: &ChatRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, GlanceError> {
        let call = async {
            let response = self
                .client
                .post(&self.base_url)
                .timeout(timeout)
                .json(request)
                .send()
                .await
                .map_err(|e| map_send_error(e, timeout))?;

            let status = response.status();
            debug!(status = %status, model = request.model.as_str(), "chat response received");

            if status.is_success() {
                let body = response
                    .text()
                    .await
                    .map_err(|e| GlanceError::ConnectionFailed {
                        detail: format!("failed to read response body: {e}"),
                    })?;
                serde_json::from_str::<ChatResponse>(&body).map_err(|e| {
                    GlanceError::Unknown(format!("failed to parse API response: {e}"))
                })
            } else {
                let body = response.text().await.unwrap_or_default();
                Err(classify_status(status, &body))
            }
        };

        tokio::select! {
            result = call => result,
            _ = cancel.cancelled() => {
                debug!("chat request cancelled");
                Err(GlanceError::Unknown("request cancelled".into()))
            }
        }
    }
}

/// Maps a reqwest send error onto the taxonomy.
fn map_send_error(error: reqwest::Error, timeout: Duration) -> GlanceError {
    if error.is_timeout() {
        GlanceError::Timeout { duration: timeout }
    } else {
        GlanceError::ConnectionFailed {
            detail: error.to_string(),
        }
    }
}

/// Maps a non-success HTTP status onto the taxonomy, pulling the API's own
/// error message out of the body when it parses.
fn classify_status(status: StatusCode, body: &str) -> GlanceError {
    let detail = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("API returned {status}"));

    match status.as_u16() {
        401 | 403 => GlanceError::AuthFailed,
        429 => GlanceError::RateLimited,
        400..=499 => GlanceError::BadRequest { detail },
        _ => GlanceError::ConnectionFailed { detail },
    }
}
