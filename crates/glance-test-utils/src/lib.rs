// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted [`Transport`] implementations for deterministic pipeline tests.
//!
//! No network, no timing dependence: outcomes are popped from a FIFO queue,
//! calls are counted, and the hanging variant blocks until cancelled so
//! watchdog behavior can be exercised on a paused clock.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use glance_core::{GlanceError, TokenUsage, Transport, TransportPayload, TransportReply};

/// Returned by [`MockTransport`] when its scripted queue runs dry.
const DEFAULT_REPLY: &str = r#"{"response": "Scripted default reply from the mock transport.", "code_blocks": [], "links": [], "suggested_questions": []}"#;

/// A transport that replays pre-scripted outcomes in order.
///
/// When the queue is empty, a well-formed default reply is returned so tests
/// that only care about the first few attempts stay concise.
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Result<TransportReply, GlanceError>>>,
    calls: AtomicU32,
}

impl MockTransport {
    pub fn with_outcomes(outcomes: Vec<Result<TransportReply, GlanceError>>) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::from(outcomes)),
            calls: AtomicU32::new(0),
        }
    }

    /// How many times `send` has been invoked.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Appends another scripted outcome.
    pub fn push_outcome(&self, outcome: Result<TransportReply, GlanceError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        _payload: TransportPayload,
        _cancel: CancellationToken,
    ) -> Result<TransportReply, GlanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(TransportReply {
                text: DEFAULT_REPLY.to_string(),
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            })
        })
    }
}

/// A transport that never returns until its cancellation token fires.
///
/// Counts observed cancellations so tests can assert the watchdog actually
/// propagated the abort into the in-flight call.
pub struct HangingTransport {
    cancellations: AtomicU32,
}

impl HangingTransport {
    pub fn new() -> Self {
        Self {
            cancellations: AtomicU32::new(0),
        }
    }

    /// How many in-flight calls have observed cancellation.
    pub fn cancellations(&self) -> u32 {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl Default for HangingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HangingTransport {
    async fn send(
        &self,
        _payload: TransportPayload,
        cancel: CancellationToken,
    ) -> Result<TransportReply, GlanceError> {
        cancel.cancelled().await;
        self.cancellations.fetch_add(1, Ordering::SeqCst);
        Err(GlanceError::Unknown("hanging call cancelled".into()))
    }
}

/// A transport that records the last payload it was handed and answers with
/// a fixed reply. For asserting on prompt/budget/attachment construction.
pub struct RecordingTransport {
    reply_text: String,
    last_payload: Mutex<Option<TransportPayload>>,
}

impl RecordingTransport {
    pub fn new(reply_text: &str) -> Self {
        Self {
            reply_text: reply_text.to_string(),
            last_payload: Mutex::new(None),
        }
    }

    /// The most recently received payload, if any call has been made.
    pub fn last_payload(&self) -> Option<TransportPayload> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        payload: TransportPayload,
        _cancel: CancellationToken,
    ) -> Result<TransportReply, GlanceError> {
        *self.last_payload.lock().unwrap() = Some(payload);
        Ok(TransportReply {
            text: self.reply_text.clone(),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn payload() -> TransportPayload {
        TransportPayload {
            system_prompt: "system".into(),
            user_prompt: "user".into(),
            history: vec![],
            image: None,
            max_response_tokens: 1_000,
            timeout: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn scripted_outcomes_pop_in_order_then_default() {
        let transport = MockTransport::with_outcomes(vec![
            Ok(TransportReply {
                text: "first scripted reply".into(),
                usage: TokenUsage::default(),
            }),
            Err(GlanceError::RateLimited),
        ]);
        let cancel = CancellationToken::new();

        let first = transport.send(payload(), cancel.clone()).await.unwrap();
        assert_eq!(first.text, "first scripted reply");

        let second = transport.send(payload(), cancel.clone()).await;
        assert!(matches!(second, Err(GlanceError::RateLimited)));

        let third = transport.send(payload(), cancel).await.unwrap();
        assert!(third.text.contains("Scripted default reply"));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn hanging_transport_returns_only_on_cancel() {
        let transport = HangingTransport::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = transport.send(payload(), cancel).await;
        assert!(result.is_err());
        assert_eq!(transport.cancellations(), 1);
    }

    #[tokio::test]
    async fn recording_transport_keeps_the_last_payload() {
        let transport = RecordingTransport::new("recorded reply text");
        assert!(transport.last_payload().is_none());

        transport
            .send(payload(), CancellationToken::new())
            .await
            .unwrap();
        let seen = transport.last_payload().unwrap();
        assert_eq!(seen.user_prompt, "user");
    }
}
