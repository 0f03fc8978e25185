// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport seam: the injected capability that actually talks to an LLM API.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::GlanceError;
use crate::types::{TransportPayload, TransportReply};

/// The external-API seam the orchestrator calls through.
///
/// One `send` is one network call; retry, backoff, and the watchdog deadline
/// all live in the orchestrator, never here. Implementations must be safe for
/// concurrent use (the orchestrator may run several `execute` calls against
/// the same transport) and are expected to observe `cancel` cooperatively so
/// the watchdog can abort an in-flight call. A transport that ignores the
/// token still works, but its hung call outlives the attempt as an orphaned
/// task.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the model's raw text plus usage.
    async fn send(
        &self,
        payload: TransportPayload,
        cancel: CancellationToken,
    ) -> Result<TransportReply, GlanceError>;
}
