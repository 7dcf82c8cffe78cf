// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound session events.
//!
//! The dispatcher's consumers are statically known: events are an enumerated
//! tagged union pushed into an [`EventSink`], in dispatch order. Sinks must
//! not re-enter the dispatcher.

use crate::error::SessionError;
use crate::id::SessionId;
use serde::{Deserialize, Serialize};

/// Category of a user-facing message event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    /// General session progress.
    Info,
    /// Per-test progress (starts, successes, failure summaries).
    Test,
    /// Free-form diagnostics sent by the remote test code.
    TestInfo,
    /// Captured output of a host-side external command.
    ExternalCommandOutput,
}

/// Events emitted by a test session, in dispatch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// User-facing message.
    Message { kind: MessageKind, text: String },
    /// Test framework reported session start.
    Start,
    /// A test-framework envelope addressed to this session arrived.
    TestMessage,
    /// Test framework reported the session result.
    Result,
    /// Failure escalated to an error. `session` names the source.
    Error {
        session: SessionId,
        error: SessionError,
    },
    /// Failure downgraded to a warning (device/agent fault before start).
    Warning {
        session: SessionId,
        error: SessionError,
    },
    /// Session finalized; emitted exactly once.
    Done,
}

impl SessionEvent {
    /// Short name for tracing.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Message { .. } => "message",
            SessionEvent::Start => "start",
            SessionEvent::TestMessage => "test_message",
            SessionEvent::Result => "result",
            SessionEvent::Error { .. } => "error",
            SessionEvent::Warning { .. } => "warning",
            SessionEvent::Done => "done",
        }
    }
}

/// Consumer seam for session events.
pub trait EventSink {
    fn emit(&mut self, event: SessionEvent);
}

/// Collecting sink, used by tests and by callers that batch events.
impl EventSink for Vec<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
