// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a test session.
///
/// Advances monotonically `Initialized → Ready → Started → Finished` under a
/// well-formed log stream. Transitions are driven by incoming records, so a
/// desynchronized stream surfaces as an invalid-state error rather than a
/// silent regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session object exists but the device agent has not restarted yet.
    Initialized,
    /// Agent restart observed; the test framework may start the session.
    Ready,
    /// Test framework reported session start; tests are running.
    Started,
    /// Session result received; no further test records are expected.
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Initialized => write!(f, "initialized"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Started => write!(f, "started"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
