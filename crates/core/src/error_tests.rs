// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    device = {
        SessionError::Device { message: "out of memory".into() },
        "device error: out of memory",
    },
    device_runtime = {
        SessionError::DeviceRuntime { message: "index out of range".into() },
        "device runtime error: index out of range",
    },
    agent_runtime = {
        SessionError::AgentRuntime { message: "null reference".into() },
        "agent runtime error: null reference",
    },
    disconnected = {
        SessionError::DeviceDisconnected,
        "device unexpectedly disconnected",
    },
    invalid_state = {
        SessionError::InvalidState {
            expected: SessionState::Ready,
            actual: SessionState::Initialized,
        },
        "invalid session state: expected ready, was initialized",
    },
    test_failed = {
        SessionError::TestMethodFailed { message: "assertTrue failed".into() },
        "test failed: assertTrue failed",
    },
    session_failed = {
        SessionError::SessionFailed { message: "Tests: 2, Assertions: 5, Failures: 1".into() },
        "session failed: Tests: 2, Assertions: 5, Failures: 1",
    },
    exit_code = {
        SessionError::ExternalCommandExit { status: 7 },
        "external command failed with exit code 7",
    },
    timeout = {
        SessionError::ExternalCommandTimeout { timeout_secs: 30 },
        "external command timed out after 30s",
    },
    log_source = {
        SessionError::LogSource { message: "stream closed".into() },
        "log source error: stream closed",
    },
)]
fn display(error: SessionError, expected: &str) {
    assert_eq!(error.to_string(), expected);
}

#[test]
fn serde_roundtrip() {
    let errors = vec![
        SessionError::Device {
            message: "out of code space".into(),
        },
        SessionError::InvalidState {
            expected: SessionState::Started,
            actual: SessionState::Finished,
        },
        SessionError::ExternalCommandExit { status: 1 },
        SessionError::DeviceDisconnected,
    ];

    for error in errors {
        let json = serde_json::to_string(&error).unwrap();
        let parsed: SessionError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, error);
    }
}

#[test]
fn serde_kind_tag() {
    let json = serde_json::to_string(&SessionError::ExternalCommandExit { status: 7 }).unwrap();
    assert_eq!(json, r#"{"kind":"external_command_exit","status":7}"#);
}
