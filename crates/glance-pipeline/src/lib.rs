// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The resilient request pipeline: turns an [`AskRequest`] into a validated
//! [`StructuredAnswer`] under a hard wall-clock budget.
//!
//! Each [`Orchestrator::execute`] call runs a strictly sequential attempt
//! loop. Every attempt plans a token budget, builds the wire payload, and
//! dispatches the transport call on its own task, awaited through a watchdog
//! deadline so a hung transport can never hang the caller. Transient
//! failures back off exponentially and retry; credential and request-shape
//! failures surface immediately.

pub mod classify;
pub mod prompt;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use glance_core::{
    AskRequest, GlanceError, ImageAttachment, StructuredAnswer, Transport, TransportPayload,
};

use crate::classify::AttemptOutcome;
pub use crate::prompt::{DEFAULT_SYSTEM_PROMPT, PromptSet};
pub use glance_budget::BudgetParams;

/// Minimum trimmed reply length below which an attempt counts as empty
/// output rather than a success.
pub(crate) const MIN_REPLY_CHARS: usize = 10;

/// Retry and deadline policy for one `execute` call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up.
    pub max_attempts: u32,
    /// First backoff delay; doubles on each further retry.
    pub base_delay: Duration,
    /// Hard wall-clock bound on waiting for a single attempt. Must be
    /// strictly shorter than `transport_timeout` so the watchdog fires
    /// before the transport's own timeout.
    pub watchdog: Duration,
    /// Per-call timeout handed to the transport.
    pub transport_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            watchdog: Duration::from_secs(40),
            transport_timeout: Duration::from_secs(60),
        }
    }
}

/// A terminal pipeline failure, annotated with how many attempts were made.
#[derive(Debug)]
pub struct ExecuteFailure {
    pub error: GlanceError,
    pub attempts: u32,
}

impl fmt::Display for ExecuteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.attempts == 1 { "attempt" } else { "attempts" };
        write!(f, "{} (after {} {noun})", self.error, self.attempts)
    }
}

impl std::error::Error for ExecuteFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Owns the request lifecycle: payload construction, dispatch, retry,
/// classification, and normalization.
///
/// Holds no mutable state; concurrent `execute` calls share nothing but the
/// injected transport, which must itself be safe for concurrent use.
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    prompts: PromptSet,
    budget: BudgetParams,
    policy: RetryPolicy,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn Transport>,
        prompts: PromptSet,
        budget: BudgetParams,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            prompts,
            budget,
            policy,
        }
    }

    /// Convenience constructor with default prompts, budget, and policy.
    pub fn with_defaults(transport: Arc<dyn Transport>) -> Self {
        Self::new(
            transport,
            PromptSet::default(),
            BudgetParams::default(),
            RetryPolicy::default(),
        )
    }

    /// Runs the attempt loop for one request.
    ///
    /// Cancelling `cancel` aborts the in-flight attempt cooperatively: the
    /// token is propagated into the transport call, and the watchdog wait
    /// observes it as well. A transport that ignores cancellation leaves an
    /// orphaned task behind; the orchestrator stops waiting on it either way.
    pub async fn execute(
        &self,
        request: AskRequest,
        cancel: CancellationToken,
    ) -> Result<StructuredAnswer, ExecuteFailure> {
        let mut last_error: Option<GlanceError> = None;

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                let delay = self.policy.base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        return Err(ExecuteFailure {
                            error: GlanceError::Unknown("request cancelled".into()),
                            attempts: attempt,
                        });
                    }
                }
            }

            match self.run_attempt(&request, &cancel).await {
                AttemptOutcome::Success(raw) => {
                    let answer = glance_normalize::normalize(&raw);
                    if glance_normalize::is_substantive(&answer) {
                        info!(attempt, "request completed");
                        return Ok(answer);
                    }
                    // The model answered, but nothing usable survived
                    // normalization. Same treatment as a short reply.
                    warn!(attempt, "reply normalized to a placeholder, retrying");
                    last_error = Some(GlanceError::EmptyOutput);
                }
                AttemptOutcome::Cancelled => {
                    return Err(ExecuteFailure {
                        error: GlanceError::Unknown("request cancelled".into()),
                        attempts: attempt + 1,
                    });
                }
                outcome if !outcome.is_retryable() => {
                    let error = outcome.into_error();
                    warn!(attempt, error = %error, "non-retryable failure, giving up");
                    return Err(ExecuteFailure {
                        error,
                        attempts: attempt + 1,
                    });
                }
                outcome => {
                    let error = outcome.into_error();
                    warn!(attempt, error = %error, "attempt failed");
                    last_error = Some(error);
                }
            }
        }

        Err(ExecuteFailure {
            error: last_error
                .unwrap_or_else(|| GlanceError::Unknown("no attempts were made".into())),
            attempts: self.policy.max_attempts,
        })
    }

    /// Runs one attempt: dispatch on an isolated task, wait up to the
    /// watchdog deadline, classify whatever comes back.
    async fn run_attempt(
        &self,
        request: &AskRequest,
        cancel: &CancellationToken,
    ) -> AttemptOutcome {
        let payload = self.build_payload(request);
        debug!(
            max_response_tokens = payload.max_response_tokens,
            has_image = payload.image.is_some(),
            history_turns = payload.history.len(),
            "dispatching attempt"
        );

        // Child token: cancelled by the watchdog below, or transitively when
        // the caller cancels the parent.
        let attempt_cancel = cancel.child_token();
        let transport = Arc::clone(&self.transport);
        let transport_cancel = attempt_cancel.clone();
        let worker =
            tokio::spawn(async move { transport.send(payload, transport_cancel).await });

        tokio::select! {
            outcome = tokio::time::timeout(self.policy.watchdog, worker) => match outcome {
                Ok(Ok(result)) => AttemptOutcome::from_transport(result),
                Ok(Err(join_error)) => {
                    AttemptOutcome::Unknown(format!("transport worker failed: {join_error}"))
                }
                Err(_) => {
                    // Watchdog fired first. Cancel the in-flight call; a
                    // cooperative transport aborts, anything else is orphaned.
                    attempt_cancel.cancel();
                    AttemptOutcome::TimedOut(self.policy.watchdog)
                }
            },
            _ = cancel.cancelled() => {
                attempt_cancel.cancel();
                AttemptOutcome::Cancelled
            }
        }
    }

    /// Builds the wire-agnostic payload for one attempt, with the response
    /// token cap from the budget planner.
    fn build_payload(&self, request: &AskRequest) -> TransportPayload {
        let system_prompt = self.prompts.system_prompt_for(request);
        let user_prompt = prompt::user_prompt_for(request);
        let budget = glance_budget::plan(
            &system_prompt,
            &user_prompt,
            request.image.as_deref(),
            &self.budget,
        );

        TransportPayload {
            system_prompt,
            user_prompt,
            history: request.history.clone(),
            image: request.image.clone().map(|data| ImageAttachment {
                media_type: "image/png".to_string(),
                data,
            }),
            max_response_tokens: budget.response_tokens,
            timeout: self.policy.transport_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_core::{HistoryTurn, TokenUsage, TransportReply};
    use glance_test_utils::{HangingTransport, MockTransport, RecordingTransport};

    const GOOD_REPLY: &str = r#"{"response": "Hello, this works fine.", "code_blocks": [], "links": [], "suggested_questions": ["a?"]}"#;

    fn reply(text: &str) -> Result<TransportReply, GlanceError> {
        Ok(TransportReply {
            text: text.into(),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            watchdog: Duration::from_secs(40),
            transport_timeout: Duration::from_secs(60),
        }
    }

    fn orchestrator(transport: Arc<MockTransport>) -> Orchestrator {
        Orchestrator::new(
            transport,
            PromptSet::default(),
            BudgetParams::default(),
            fast_policy(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_returns_immediately() {
        let transport = Arc::new(MockTransport::with_outcomes(vec![reply(GOOD_REPLY)]));
        let answer = orchestrator(Arc::clone(&transport))
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(answer.response, "Hello, this works fine.");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn connection_failures_retry_to_exhaustion() {
        let transport = Arc::new(MockTransport::with_outcomes(vec![
            Err(GlanceError::ConnectionFailed { detail: "refused".into() }),
            Err(GlanceError::ConnectionFailed { detail: "refused".into() }),
            Err(GlanceError::ConnectionFailed { detail: "refused".into() }),
        ]));
        let failure = orchestrator(Arc::clone(&transport))
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 3);
        assert_eq!(failure.attempts, 3);
        assert!(matches!(failure.error, GlanceError::ConnectionFailed { .. }));
        assert!(failure.to_string().contains("after 3 attempts"));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_short_circuits_without_retry() {
        let transport = Arc::new(MockTransport::with_outcomes(vec![
            Err(GlanceError::AuthFailed),
            reply(GOOD_REPLY),
        ]));
        let failure = orchestrator(Arc::clone(&transport))
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 1);
        assert_eq!(failure.attempts, 1);
        assert!(matches!(failure.error, GlanceError::AuthFailed));
        assert!(failure.to_string().contains("after 1 attempt"));
    }

    #[tokio::test(start_paused = true)]
    async fn bad_request_short_circuits_without_retry() {
        let transport = Arc::new(MockTransport::with_outcomes(vec![Err(
            GlanceError::BadRequest { detail: "unknown model".into() },
        )]));
        let failure = orchestrator(Arc::clone(&transport))
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(transport.calls(), 1);
        assert!(matches!(failure.error, GlanceError::BadRequest { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn short_reply_retries_as_empty_output_then_succeeds() {
        let transport = Arc::new(MockTransport::with_outcomes(vec![
            reply("ok"),
            reply(GOOD_REPLY),
        ]));
        let answer = orchestrator(Arc::clone(&transport))
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(answer.response, "Hello, this works fine.");
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_empty_output_reports_the_error_not_a_placeholder() {
        let transport = Arc::new(MockTransport::with_outcomes(vec![
            reply("ok"),
            reply("ok"),
            reply("ok"),
        ]));
        let failure = orchestrator(Arc::clone(&transport))
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(failure.attempts, 3);
        assert!(matches!(failure.error, GlanceError::EmptyOutput));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_attempts() {
        let transport = Arc::new(MockTransport::with_outcomes(vec![
            Err(GlanceError::RateLimited),
            Err(GlanceError::RateLimited),
            Err(GlanceError::RateLimited),
        ]));
        let started = tokio::time::Instant::now();
        let failure = orchestrator(Arc::clone(&transport))
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        // Backoff before attempt 1 (2s) and attempt 2 (4s).
        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(matches!(failure.error, GlanceError::RateLimited));
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_fires_and_cancels_the_hung_transport() {
        let transport = Arc::new(HangingTransport::new());
        let policy = RetryPolicy {
            max_attempts: 1,
            ..fast_policy()
        };
        let orchestrator = Orchestrator::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            PromptSet::default(),
            BudgetParams::default(),
            policy,
        );

        let failure = orchestrator
            .execute(AskRequest::default(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            GlanceError::Timeout { duration } if duration.as_secs() == 40
        ));

        // The hung worker observes the cancelled child token shortly after.
        for _ in 0..100 {
            if transport.cancellations() > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(transport.cancellations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn caller_cancellation_aborts_promptly() {
        let transport = Arc::new(HangingTransport::new());
        let orchestrator = Orchestrator::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            PromptSet::default(),
            BudgetParams::default(),
            fast_policy(),
        );

        let cancel = CancellationToken::new();
        let cancel_handle = cancel.clone();
        let task = tokio::spawn(async move {
            orchestrator.execute(AskRequest::default(), cancel_handle).await
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let failure = task.await.unwrap().unwrap_err();
        assert!(failure.error.to_string().contains("cancelled"));
    }

    #[tokio::test(start_paused = true)]
    async fn payload_carries_prompts_history_image_and_budget() {
        let transport = Arc::new(RecordingTransport::new(GOOD_REPLY));
        let orchestrator = Orchestrator::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            PromptSet::default(),
            BudgetParams::default(),
            fast_policy(),
        );

        let request = AskRequest {
            question: "Why does the build fail?".into(),
            image: Some(vec![0u8; 150 * 1024]),
            history: vec![HistoryTurn {
                question: "What is on screen?".into(),
                answer: "A terminal.".into(),
            }],
            custom_instructions: Some("Be terse.".into()),
        };
        orchestrator
            .execute(request, CancellationToken::new())
            .await
            .unwrap();

        let payload = transport.last_payload().unwrap();
        assert!(payload.system_prompt.contains("Be terse."));
        assert!(payload.user_prompt.contains("Why does the build fail?"));
        assert_eq!(payload.history.len(), 1);
        let image = payload.image.as_ref().unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data.len(), 150 * 1024);
        assert!(payload.max_response_tokens >= 1_000);
        assert!(payload.max_response_tokens <= 4_000);
        assert_eq!(payload.timeout, Duration::from_secs(60));
    }
}
