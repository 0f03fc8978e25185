// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Glance screen assistant.
//!
//! This crate provides the shared data model, the error taxonomy, and the
//! [`Transport`] trait that the request pipeline calls through. Everything
//! else in the workspace depends on it.

pub mod error;
pub mod transport;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GlanceError;
pub use transport::Transport;
pub use types::{
    AskRequest, CodeBlock, HistoryTurn, ImageAttachment, LinkRef, StructuredAnswer, TokenUsage,
    TransportPayload, TransportReply,
};
