// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! rig-session: the test-session log dispatcher
//!
//! Consumes the log-record stream of one remote test run and turns it into a
//! session lifecycle with classified messages, warnings and errors, plus the
//! embedded external-command sub-protocol.

mod run;
pub mod session;
pub mod source;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{RecordingReassigner, ScriptedLogSource};

pub use session::{
    DispatchError, SessionConfig, TestSession, DEFAULT_EXTERNAL_COMMANDS_TIMEOUT,
};
pub use source::{DeviceGroupReassigner, LogSource, ReassignError, SourceSignal};
