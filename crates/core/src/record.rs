// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire records delivered by the device/agent log transport.
//!
//! A record is a `{kind, value}` pair whose kind is a case-insensitive literal
//! tag. Most kinds carry free-form values; the `IMPUNIT` kind nests a
//! test-framework envelope tagged with the originating session id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One discrete event delivered by the log transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Literal kind tag, matched case-insensitively.
    pub kind: String,
    /// Kind-dependent payload. Absent payloads deserialize to `Null`.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl LogRecord {
    pub fn new(kind: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }

    /// Classify the record's kind tag. `None` means an unrecognized tag,
    /// which still dispatches (as a generic info message).
    pub fn record_kind(&self) -> Option<RecordKind> {
        RecordKind::parse(&self.kind)
    }
}

/// Recognized record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Device agent restarted; the session may now start.
    AgentRestarted,
    /// Periodic code-space usage report (percentage).
    CodeSpaceUsage,
    /// Device ran out of code space.
    OutOfCodeSpace,
    /// Device ran out of memory.
    OutOfMemory,
    /// Device reported its last exit code.
    DeviceExitCode,
    /// Device-side runtime error.
    DeviceRuntimeError,
    /// Agent-side runtime error.
    AgentRuntimeError,
    /// Device (re)connected to the cloud.
    DeviceConnected,
    /// Device disconnected from the cloud.
    DeviceDisconnected,
    /// Device power state report.
    PowerState,
    /// Device firmware version report.
    Firmware,
    /// Nested test-framework envelope (`IMPUNIT` wire tag).
    TestFramework,
}

impl RecordKind {
    /// Parse a kind tag, case-insensitively.
    pub fn parse(kind: &str) -> Option<Self> {
        let tag = kind.to_ascii_uppercase();
        match tag.as_str() {
            "AGENT_RESTARTED" => Some(RecordKind::AgentRestarted),
            "DEVICE_CODE_SPACE_USAGE" => Some(RecordKind::CodeSpaceUsage),
            "DEVICE_OUT_OF_CODE_SPACE" => Some(RecordKind::OutOfCodeSpace),
            "DEVICE_OUT_OF_MEMORY" => Some(RecordKind::OutOfMemory),
            "LASTEXITCODE" => Some(RecordKind::DeviceExitCode),
            "DEVICE_ERROR" => Some(RecordKind::DeviceRuntimeError),
            "AGENT_ERROR" => Some(RecordKind::AgentRuntimeError),
            "DEVICE_CONNECTED" => Some(RecordKind::DeviceConnected),
            "DEVICE_DISCONNECTED" => Some(RecordKind::DeviceDisconnected),
            "POWERSTATE" => Some(RecordKind::PowerState),
            "FIRMWARE" => Some(RecordKind::Firmware),
            "IMPUNIT" => Some(RecordKind::TestFramework),
            _ => None,
        }
    }
}

/// Test-framework envelope nested inside a `TestFramework` record's value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestEnvelope {
    /// Id of the session this envelope belongs to.
    pub session: String,
    /// Sub-kind tag, matched case-insensitively.
    #[serde(rename = "type")]
    pub kind: String,
    /// Sub-kind-dependent payload.
    #[serde(default)]
    pub message: serde_json::Value,
}

impl TestEnvelope {
    /// Deserialize an envelope from a record value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Classify the envelope's sub-kind tag. `None` means an unrecognized
    /// tag, which is ignored.
    pub fn message_kind(&self) -> Option<TestMessageKind> {
        TestMessageKind::parse(&self.kind)
    }
}

/// Recognized test-framework envelope sub-kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMessageKind {
    SessionStart,
    TestStart,
    TestFail,
    TestOk,
    SessionResult,
    ExternalCommand,
    Info,
}

impl TestMessageKind {
    /// Parse a sub-kind tag, case-insensitively.
    pub fn parse(kind: &str) -> Option<Self> {
        let tag = kind.to_ascii_uppercase();
        match tag.as_str() {
            "SESSION_START" => Some(TestMessageKind::SessionStart),
            "TEST_START" => Some(TestMessageKind::TestStart),
            "TEST_FAIL" => Some(TestMessageKind::TestFail),
            "TEST_OK" => Some(TestMessageKind::TestOk),
            "SESSION_RESULT" => Some(TestMessageKind::SessionResult),
            "EXTERNAL_COMMAND" => Some(TestMessageKind::ExternalCommand),
            "INFO" => Some(TestMessageKind::Info),
            _ => None,
        }
    }
}

/// Counters reported by the test framework at session-result time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub tests: u64,
    #[serde(default)]
    pub failures: u64,
    #[serde(default)]
    pub assertions: u64,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tests: {}, Assertions: {}, Failures: {}",
            self.tests, self.assertions, self.failures
        )
    }
}

/// Render a record value as user-facing text: strings verbatim, everything
/// else as compact JSON.
pub fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
