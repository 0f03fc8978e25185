// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-attempt outcome classification.
//!
//! Every transport result becomes exactly one [`AttemptOutcome`]; the retry
//! loop decides what to do purely from the variant, never from error text.

use std::time::Duration;

use glance_core::{GlanceError, TransportReply};

use crate::MIN_REPLY_CHARS;

/// The classified result of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The transport returned text with enough content to normalize.
    Success(String),
    /// HTTP 429 or equivalent.
    RateLimited,
    /// Credentials rejected.
    AuthFailed,
    /// The request shape itself was rejected.
    BadRequest(String),
    /// Network-level failure.
    ConnectionFailed(String),
    /// The watchdog deadline or the transport's own timeout elapsed.
    TimedOut(Duration),
    /// The transport returned fewer than the minimum meaningful characters.
    EmptyOutput,
    /// The caller cancelled the request.
    Cancelled,
    /// Anything else.
    Unknown(String),
}

impl AttemptOutcome {
    /// Classifies a transport result.
    pub fn from_transport(result: Result<TransportReply, GlanceError>) -> Self {
        match result {
            Ok(reply) => {
                if reply.text.trim().chars().count() < MIN_REPLY_CHARS {
                    AttemptOutcome::EmptyOutput
                } else {
                    AttemptOutcome::Success(reply.text)
                }
            }
            Err(GlanceError::RateLimited) => AttemptOutcome::RateLimited,
            Err(GlanceError::AuthFailed) => AttemptOutcome::AuthFailed,
            Err(GlanceError::BadRequest { detail }) => AttemptOutcome::BadRequest(detail),
            Err(GlanceError::ConnectionFailed { detail }) => {
                AttemptOutcome::ConnectionFailed(detail)
            }
            Err(GlanceError::Timeout { duration }) => AttemptOutcome::TimedOut(duration),
            Err(GlanceError::EmptyOutput) => AttemptOutcome::EmptyOutput,
            Err(GlanceError::Config(detail)) | Err(GlanceError::Unknown(detail)) => {
                AttemptOutcome::Unknown(detail)
            }
        }
    }

    /// Whether the retry loop may try again after this outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::RateLimited
                | AttemptOutcome::ConnectionFailed(_)
                | AttemptOutcome::TimedOut(_)
                | AttemptOutcome::EmptyOutput
                | AttemptOutcome::Unknown(_)
        )
    }

    /// Converts a failure outcome back into the error surfaced to the caller.
    pub fn into_error(self) -> GlanceError {
        match self {
            AttemptOutcome::Success(_) => {
                GlanceError::Unknown("success outcome treated as error".into())
            }
            AttemptOutcome::RateLimited => GlanceError::RateLimited,
            AttemptOutcome::AuthFailed => GlanceError::AuthFailed,
            AttemptOutcome::BadRequest(detail) => GlanceError::BadRequest { detail },
            AttemptOutcome::ConnectionFailed(detail) => GlanceError::ConnectionFailed { detail },
            AttemptOutcome::TimedOut(duration) => GlanceError::Timeout { duration },
            AttemptOutcome::EmptyOutput => GlanceError::EmptyOutput,
            AttemptOutcome::Cancelled => GlanceError::Unknown("request cancelled".into()),
            AttemptOutcome::Unknown(detail) => GlanceError::Unknown(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_core::TokenUsage;

    fn reply(text: &str) -> TransportReply {
        TransportReply {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn long_reply_classifies_as_success() {
        let outcome = AttemptOutcome::from_transport(Ok(reply("a reply of reasonable length")));
        assert!(matches!(outcome, AttemptOutcome::Success(_)));
    }

    #[test]
    fn short_reply_classifies_as_empty_output() {
        let outcome = AttemptOutcome::from_transport(Ok(reply("ok")));
        assert!(matches!(outcome, AttemptOutcome::EmptyOutput));
        let outcome = AttemptOutcome::from_transport(Ok(reply("   \n  ")));
        assert!(matches!(outcome, AttemptOutcome::EmptyOutput));
    }

    #[test]
    fn retryable_split_matches_the_error_taxonomy() {
        assert!(AttemptOutcome::RateLimited.is_retryable());
        assert!(AttemptOutcome::ConnectionFailed("dns".into()).is_retryable());
        assert!(AttemptOutcome::TimedOut(Duration::from_secs(40)).is_retryable());
        assert!(AttemptOutcome::EmptyOutput.is_retryable());
        assert!(AttemptOutcome::Unknown("?".into()).is_retryable());

        assert!(!AttemptOutcome::AuthFailed.is_retryable());
        assert!(!AttemptOutcome::BadRequest("bad".into()).is_retryable());
        assert!(!AttemptOutcome::Cancelled.is_retryable());
    }

    #[test]
    fn errors_round_trip_through_classification() {
        let outcome = AttemptOutcome::from_transport(Err(GlanceError::RateLimited));
        assert!(matches!(outcome.into_error(), GlanceError::RateLimited));

        let outcome = AttemptOutcome::from_transport(Err(GlanceError::Timeout {
            duration: Duration::from_secs(40),
        }));
        assert!(matches!(
            outcome.into_error(),
            GlanceError::Timeout { duration } if duration.as_secs() == 40
        ));
    }
}
