// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI transport for the Glance pipeline.
//!
//! Implements [`Transport`] over the Chat Completions API with vision
//! support: the optional screenshot rides along as a base64 `data:` URL
//! part on the final user message.

pub mod client;
pub mod types;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio_util::sync::CancellationToken;
use tracing::info;

use glance_config::GlanceConfig;
use glance_core::{
    GlanceError, ImageAttachment, TokenUsage, Transport, TransportPayload, TransportReply,
};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent};

/// OpenAI Chat Completions transport.
///
/// One value per credential, constructed once and injected into the
/// orchestrator; safe for concurrent use.
pub struct OpenAiTransport {
    client: OpenAiClient,
    model: String,
}

impl OpenAiTransport {
    /// Creates a transport from configuration.
    ///
    /// # API Key Resolution
    /// 1. `config.openai.api_key` if set and non-empty
    /// 2. `OPENAI_API_KEY` environment variable
    /// 3. Returns a config error otherwise
    pub fn new(config: &GlanceConfig) -> Result<Self, GlanceError> {
        let api_key = resolve_api_key(&config.openai.api_key)?;
        let client = OpenAiClient::new(&api_key)?;

        info!(model = config.openai.model.as_str(), "OpenAI transport initialized");

        Ok(Self {
            client,
            model: config.openai.model.clone(),
        })
    }

    /// Creates a transport with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: OpenAiClient, model: String) -> Self {
        Self { client, model }
    }

    /// Converts a wire-agnostic payload into a Chat Completions request:
    /// system prompt first, history as alternating user/assistant turns,
    /// then the current question with the screenshot attached if present.
    fn to_chat_request(&self, payload: &TransportPayload) -> ChatRequest {
        let mut messages = Vec::with_capacity(payload.history.len() * 2 + 2);

        messages.push(ChatMessage {
            role: "system".to_string(),
            content: MessageContent::Text(payload.system_prompt.clone()),
        });

        for turn in &payload.history {
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Text(turn.question.clone()),
            });
            messages.push(ChatMessage {
                role: "assistant".to_string(),
                content: MessageContent::Text(turn.answer.clone()),
            });
        }

        let content = match &payload.image {
            Some(image) => MessageContent::Parts(vec![
                ContentPart::Text {
                    text: payload.user_prompt.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url(image),
                    },
                },
            ]),
            None => MessageContent::Text(payload.user_prompt.clone()),
        };
        messages.push(ChatMessage {
            role: "user".to_string(),
            content,
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: payload.max_response_tokens,
        }
    }
}

#[async_trait]
impl Transport for OpenAiTransport {
    async fn send(
        &self,
        payload: TransportPayload,
        cancel: CancellationToken,
    ) -> Result<TransportReply, GlanceError> {
        let request = self.to_chat_request(&payload);
        let response = self.client.send_chat(&request, payload.timeout, &cancel).await?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(TransportReply {
            text,
            usage: TokenUsage {
                input_tokens: response.usage.prompt_tokens,
                output_tokens: response.usage.completion_tokens,
            },
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, GlanceError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("OPENAI_API_KEY").map_err(|_| {
        GlanceError::Config(
            "OpenAI API key not found. Set openai.api_key in config or the OPENAI_API_KEY environment variable.".into(),
        )
    })
}

/// Encodes an image attachment as a `data:` URL.
fn data_url(image: &ImageAttachment) -> String {
    format!("data:{};base64,{}", image.media_type, BASE64.encode(&image.data))
}
