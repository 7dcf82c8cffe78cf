// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session failure taxonomy.
//!
//! Device and agent faults are downgradeable (warning before the session has
//! started, error after); protocol violations and external-command failures
//! are not. The split itself is applied by the dispatcher, not encoded here.

use crate::state::SessionState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named failure kinds surfaced on the session error/warning channels.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionError {
    /// Device fault: out of code space, out of memory, nonzero exit code.
    #[error("device error: {message}")]
    Device { message: String },

    /// Runtime error reported by the device-side code.
    #[error("device runtime error: {message}")]
    DeviceRuntime { message: String },

    /// Runtime error reported by the agent-side code.
    #[error("agent runtime error: {message}")]
    AgentRuntime { message: String },

    /// Device dropped its connection while disconnects were not allowed.
    #[error("device unexpectedly disconnected")]
    DeviceDisconnected,

    /// A test-framework message arrived while the session was in the wrong
    /// state. Indicates stream desynchronization; never downgraded.
    #[error("invalid session state: expected {expected}, was {actual}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    /// A remote test case explicitly failed.
    #[error("test failed: {message}")]
    TestMethodFailed { message: String },

    /// Aggregate failure reported at session-result time.
    #[error("session failed: {message}")]
    SessionFailed { message: String },

    /// An external command exited nonzero.
    #[error("external command failed with exit code {status}")]
    ExternalCommandExit { status: i32 },

    /// An external command hit the configured timeout.
    #[error("external command timed out after {timeout_secs}s")]
    ExternalCommandTimeout { timeout_secs: u64 },

    /// Executor-level failure other than a timeout (e.g. spawn failure).
    #[error("external command failed: {message}")]
    ExternalCommand { message: String },

    /// Error reported by the log source itself, forwarded verbatim.
    #[error("log source error: {message}")]
    LogSource { message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
