// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test session state machine.
//!
//! One `TestSession` tracks one remote test run start to finish. Records are
//! dispatched one at a time; every emission goes through the caller's sink in
//! dispatch order, so partial emissions preceding a thrown error are
//! preserved. Device and agent faults are downgraded to warnings until the
//! test framework reports session start; protocol violations and
//! external-command failures are thrown out of dispatch instead.

use rig_core::{
    value_text, EventSink, LogRecord, MessageKind, RecordKind, SessionError, SessionEvent,
    SessionId, SessionState, SessionSummary, TestEnvelope, TestMessageKind,
};
use rig_exec::{host_env_without, CommandExecutor, ExecError, ExecOptions};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default hard timeout for external commands requested by remote test cases.
pub const DEFAULT_EXTERNAL_COMMANDS_TIMEOUT: Duration = Duration::from_secs(30);

/// Session-scoped configuration, set by the owning caller before the session
/// is bound to a log source. Immutable for the session's lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Treat device disconnects as informational instead of faults.
    pub allow_disconnect: bool,
    /// Hard timeout for external commands.
    pub external_commands_timeout: Duration,
    /// Working directory for external commands; host cwd when unset.
    pub external_commands_cwd: Option<PathBuf>,
    /// Variable names stripped from the host environment before an external
    /// command runs.
    pub external_commands_blocked_env_vars: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allow_disconnect: false,
            external_commands_timeout: DEFAULT_EXTERNAL_COMMANDS_TIMEOUT,
            external_commands_cwd: None,
            external_commands_blocked_env_vars: Vec::new(),
        }
    }
}

/// Errors thrown synchronously out of record dispatch.
///
/// This is the deliberate escalation path, distinct from the warning/error
/// split applied to device and agent faults: the caller turns a thrown error
/// into a session `Error` event and ends the run.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Executor-level failure other than a timeout, propagated unchanged.
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl DispatchError {
    /// Collapse into the error-channel representation.
    pub fn into_session_error(self) -> SessionError {
        match self {
            DispatchError::Session(error) => error,
            DispatchError::Exec(error) => SessionError::ExternalCommand {
                message: error.to_string(),
            },
        }
    }
}

/// One executed remote test run, tracked start to finish.
///
/// Single-use: create, configure, bind to a log source, discard after `Done`.
pub struct TestSession {
    id: SessionId,
    /// Disambiguates concurrent sessions sharing an id; display only.
    index: Option<u32>,
    config: SessionConfig,
    state: SessionState,
    tests: u64,
    failures: u64,
    assertions: u64,
    stopped: bool,
    /// Last-seen code space usage, for duplicate suppression.
    code_space_usage: Option<f64>,
    /// Terminal failure flag, set by the owner (or by a failed session
    /// result); styles the finalization message.
    pub error: bool,
}

impl TestSession {
    pub fn new(id: SessionId, config: SessionConfig) -> Self {
        Self {
            id,
            index: None,
            config,
            state: SessionState::Initialized,
            tests: 0,
            failures: 0,
            assertions: 0,
            stopped: false,
            code_space_usage: None,
            error: false,
        }
    }

    /// Attach a display index for runs where several sessions share an id.
    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Counters recorded at session-result time; zero until then.
    pub fn tests(&self) -> u64 {
        self.tests
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn assertions(&self) -> u64 {
        self.assertions
    }

    /// Name used in user-facing messages.
    pub fn display_name(&self) -> String {
        match self.index {
            Some(index) => format!("{} (#{})", self.id, index),
            None => self.id.to_string(),
        }
    }

    /// Dispatch one log record.
    ///
    /// Emitted events land in `sink` in dispatch order. An `Err` return is
    /// the thrown escalation path; everything emitted before the throw has
    /// already reached the sink.
    pub async fn handle_record<E>(
        &mut self,
        record: &LogRecord,
        executor: &E,
        sink: &mut dyn EventSink,
    ) -> Result<(), DispatchError>
    where
        E: CommandExecutor + ?Sized,
    {
        debug!(session_id = %self.id, kind = %record.kind, "dispatching log record");

        let Some(kind) = record.record_kind() else {
            self.info(
                sink,
                format!(
                    "Log message of type {}: {}",
                    record.kind,
                    value_text(&record.value)
                ),
            );
            return Ok(());
        };

        match kind {
            RecordKind::AgentRestarted => {
                if self.state == SessionState::Initialized {
                    self.state = SessionState::Ready;
                }
                Ok(())
            }
            RecordKind::CodeSpaceUsage => {
                if let Some(usage) = record.value.as_f64() {
                    if self.code_space_usage != Some(usage) {
                        self.code_space_usage = Some(usage);
                        self.info(
                            sink,
                            format!("Device code space usage: {}%", value_text(&record.value)),
                        );
                    }
                }
                Ok(())
            }
            RecordKind::OutOfCodeSpace => {
                // Always an error, even before the session starts.
                sink.emit(SessionEvent::Error {
                    session: self.id.clone(),
                    error: SessionError::Device {
                        message: "out of code space".to_string(),
                    },
                });
                Ok(())
            }
            RecordKind::OutOfMemory => {
                self.fault(
                    sink,
                    SessionError::Device {
                        message: "out of memory".to_string(),
                    },
                );
                Ok(())
            }
            RecordKind::DeviceExitCode => {
                self.fault(
                    sink,
                    SessionError::Device {
                        message: format!("exit code {}", value_text(&record.value)),
                    },
                );
                Ok(())
            }
            RecordKind::DeviceRuntimeError => {
                self.fault(
                    sink,
                    SessionError::DeviceRuntime {
                        message: value_text(&record.value),
                    },
                );
                Ok(())
            }
            RecordKind::AgentRuntimeError => {
                self.fault(
                    sink,
                    SessionError::AgentRuntime {
                        message: value_text(&record.value),
                    },
                );
                Ok(())
            }
            RecordKind::DeviceConnected => Ok(()),
            RecordKind::DeviceDisconnected => {
                if self.config.allow_disconnect {
                    self.info(sink, "Device disconnected");
                } else {
                    self.fault(sink, SessionError::DeviceDisconnected);
                }
                Ok(())
            }
            RecordKind::PowerState => {
                self.info(sink, format!("Power state: {}", value_text(&record.value)));
                Ok(())
            }
            RecordKind::Firmware => {
                self.info(
                    sink,
                    format!("Firmware version: {}", value_text(&record.value)),
                );
                Ok(())
            }
            RecordKind::TestFramework => self.handle_envelope(record, executor, sink).await,
        }
    }

    /// Stop the session, finalizing exactly once.
    ///
    /// The false→true transition emits the final styled message and `Done`;
    /// repeated calls are no-ops. Callers that own a log source must stop it
    /// once this returns (the run loop does).
    pub fn stop(&mut self, sink: &mut dyn EventSink) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        let text = if self.error {
            format!("Session {} failed", self.display_name())
        } else {
            format!("Session {} succeeded", self.display_name())
        };
        self.info(sink, text);
        sink.emit(SessionEvent::Done);
    }

    async fn handle_envelope<E>(
        &mut self,
        record: &LogRecord,
        executor: &E,
        sink: &mut dyn EventSink,
    ) -> Result<(), DispatchError>
    where
        E: CommandExecutor + ?Sized,
    {
        let envelope = match TestEnvelope::from_value(&record.value) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(
                    session_id = %self.id,
                    error = %error,
                    "unparseable test-framework envelope, ignoring"
                );
                return Ok(());
            }
        };

        if envelope.session != self.id.as_str() {
            // Interleaved sessions share the device log; foreign envelopes
            // are dropped without comment.
            debug!(
                session_id = %self.id,
                envelope_session = %envelope.session,
                "envelope for another session, ignoring"
            );
            return Ok(());
        }

        sink.emit(SessionEvent::TestMessage);

        let Some(kind) = envelope.message_kind() else {
            return Ok(());
        };

        match kind {
            TestMessageKind::SessionStart => {
                sink.emit(SessionEvent::Start);
                self.require_state(SessionState::Ready)?;
                self.state = SessionState::Started;
                Ok(())
            }
            TestMessageKind::TestStart => {
                self.require_state(SessionState::Started)?;
                self.test_message(sink, value_text(&envelope.message));
                Ok(())
            }
            TestMessageKind::TestFail => {
                self.require_state(SessionState::Started)?;
                sink.emit(SessionEvent::Error {
                    session: self.id.clone(),
                    error: SessionError::TestMethodFailed {
                        message: value_text(&envelope.message),
                    },
                });
                Ok(())
            }
            TestMessageKind::TestOk => {
                let text = if envelope.message.is_null() {
                    "Success".to_string()
                } else {
                    format!("Success: {}", value_text(&envelope.message))
                };
                self.test_message(sink, text);
                Ok(())
            }
            TestMessageKind::SessionResult => self.handle_session_result(&envelope, sink),
            TestMessageKind::ExternalCommand => {
                self.run_external_command(&envelope, executor, sink).await
            }
            TestMessageKind::Info => {
                self.message(sink, MessageKind::TestInfo, value_text(&envelope.message));
                Ok(())
            }
        }
    }

    fn handle_session_result(
        &mut self,
        envelope: &TestEnvelope,
        sink: &mut dyn EventSink,
    ) -> Result<(), DispatchError> {
        sink.emit(SessionEvent::Result);
        self.require_state(SessionState::Started)?;

        let summary: SessionSummary =
            serde_json::from_value(envelope.message.clone()).unwrap_or_default();
        self.tests = summary.tests;
        self.failures = summary.failures;
        self.assertions = summary.assertions;
        self.state = SessionState::Finished;

        let line = summary.to_string();
        if summary.failures > 0 {
            self.test_message(sink, line.clone());
            self.error = true;
            sink.emit(SessionEvent::Error {
                session: self.id.clone(),
                error: SessionError::SessionFailed { message: line },
            });
        } else {
            self.info(sink, line);
        }

        self.stop(sink);
        Ok(())
    }

    async fn run_external_command<E>(
        &mut self,
        envelope: &TestEnvelope,
        executor: &E,
        sink: &mut dyn EventSink,
    ) -> Result<(), DispatchError>
    where
        E: CommandExecutor + ?Sized,
    {
        let command = value_text(&envelope.message);
        self.info(sink, format!("Running external command: {command}"));

        let timeout = self.config.external_commands_timeout;
        let opts = ExecOptions {
            cwd: self.config.external_commands_cwd.clone(),
            env: host_env_without(&self.config.external_commands_blocked_env_vars),
        };

        let output = match executor.execute(&command, timeout, &opts).await {
            Ok(output) => output,
            Err(ExecError::Timeout { .. }) => {
                return Err(SessionError::ExternalCommandTimeout {
                    timeout_secs: timeout.as_secs(),
                }
                .into());
            }
            Err(other) => return Err(other.into()),
        };

        if !output.stderr.is_empty() {
            debug!(session_id = %self.id, stderr = %output.stderr, "external command stderr");
        }
        self.message(
            sink,
            MessageKind::ExternalCommandOutput,
            prefix_output(&output.stdout),
        );

        if !output.success() {
            return Err(SessionError::ExternalCommandExit {
                status: output.status,
            }
            .into());
        }
        Ok(())
    }

    fn require_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    /// Escalate to an error once testing is running; downgrade to a warning
    /// while startup noise is still tolerated.
    fn fault(&self, sink: &mut dyn EventSink, error: SessionError) {
        let event = if self.state == SessionState::Started {
            SessionEvent::Error {
                session: self.id.clone(),
                error,
            }
        } else {
            SessionEvent::Warning {
                session: self.id.clone(),
                error,
            }
        };
        sink.emit(event);
    }

    fn info(&self, sink: &mut dyn EventSink, text: impl Into<String>) {
        self.message(sink, MessageKind::Info, text);
    }

    fn test_message(&self, sink: &mut dyn EventSink, text: impl Into<String>) {
        self.message(sink, MessageKind::Test, text);
    }

    fn message(&self, sink: &mut dyn EventSink, kind: MessageKind, text: impl Into<String>) {
        sink.emit(SessionEvent::Message {
            kind,
            text: text.into(),
        });
    }
}

/// Prefix each stdout line with `"> "` for presentation.
fn prefix_output(stdout: &str) -> String {
    stdout
        .trim()
        .lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
