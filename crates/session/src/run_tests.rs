// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the session run loop

use super::*;
use crate::fake::{RecordingReassigner, ScriptedLogSource};
use crate::session::SessionConfig;
use rig_core::{LogRecord, MessageKind, SessionId, SessionState};
use rig_exec::FakeExecutor;
use serde_json::json;

const ID: &str = "run-1";

fn session() -> TestSession {
    TestSession::new(SessionId::new(ID), SessionConfig::default())
}

fn record(kind: &str, value: serde_json::Value) -> SourceSignal {
    SourceSignal::Record(LogRecord::new(kind, value))
}

fn envelope(kind: &str, message: serde_json::Value) -> SourceSignal {
    record(
        "IMPUNIT",
        json!({"session": ID, "type": kind, "message": message}),
    )
}

fn done_count(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Done))
        .count()
}

#[tokio::test]
async fn well_formed_stream_runs_to_done() {
    let mut session = session();
    let mut source = ScriptedLogSource::new([
        SourceSignal::Ready,
        record("AGENT_RESTARTED", json!(null)),
        envelope("SESSION_START", json!(null)),
        envelope(
            "SESSION_RESULT",
            json!({"tests": 1, "failures": 0, "assertions": 1}),
        ),
        // Past the result: must stay unconsumed once the session stops
        record("POWERSTATE", json!("online")),
    ]);
    let executor = FakeExecutor::new();
    let reassigner = RecordingReassigner::new();
    let mut sink: Vec<SessionEvent> = Vec::new();
    let device = DeviceId::new("dev-1");

    session
        .run(&device, &mut source, &executor, Some(&reassigner), &mut sink)
        .await;

    assert_eq!(
        sink,
        vec![
            SessionEvent::TestMessage,
            SessionEvent::Start,
            SessionEvent::TestMessage,
            SessionEvent::Result,
            SessionEvent::Message {
                kind: MessageKind::Info,
                text: "Tests: 1, Assertions: 1, Failures: 0".to_string(),
            },
            SessionEvent::Message {
                kind: MessageKind::Info,
                text: "Session run-1 succeeded".to_string(),
            },
            SessionEvent::Done,
        ]
    );
    assert_eq!(session.state(), SessionState::Finished);
    assert!(session.is_stopped());
    assert!(source.is_stopped());
    assert_eq!(source.remaining(), 1);
    assert_eq!(reassigner.calls(), vec![device]);
}

#[tokio::test]
async fn reassigner_failure_is_nonfatal() {
    let mut session = session();
    let mut source = ScriptedLogSource::new([SourceSignal::Ready, SourceSignal::Done]);
    let executor = FakeExecutor::new();
    let reassigner = RecordingReassigner::new();
    reassigner.fail_with("api unavailable");
    let mut sink: Vec<SessionEvent> = Vec::new();

    session
        .run(
            &DeviceId::new("dev-1"),
            &mut source,
            &executor,
            Some(&reassigner),
            &mut sink,
        )
        .await;

    assert_eq!(reassigner.calls().len(), 1);
    assert_eq!(done_count(&sink), 1);
    assert!(!session.error);
}

#[tokio::test]
async fn runs_without_a_reassigner() {
    let mut session = session();
    let mut source = ScriptedLogSource::new([SourceSignal::Ready, SourceSignal::Done]);
    let executor = FakeExecutor::new();
    let mut sink: Vec<SessionEvent> = Vec::new();

    session
        .run(
            &DeviceId::new("dev-1"),
            &mut source,
            &executor,
            None,
            &mut sink,
        )
        .await;

    assert!(session.is_stopped());
    assert_eq!(done_count(&sink), 1);
}

#[tokio::test]
async fn dispatch_error_fails_and_stops_the_session() {
    let mut session = session();
    // SESSION_START before AGENT_RESTARTED: protocol violation
    let mut source = ScriptedLogSource::new([
        envelope("SESSION_START", json!(null)),
        record("POWERSTATE", json!("online")),
    ]);
    let executor = FakeExecutor::new();
    let mut sink: Vec<SessionEvent> = Vec::new();

    session
        .run(
            &DeviceId::new("dev-1"),
            &mut source,
            &executor,
            None,
            &mut sink,
        )
        .await;

    assert_eq!(
        sink,
        vec![
            SessionEvent::TestMessage,
            SessionEvent::Start,
            SessionEvent::Error {
                session: SessionId::new(ID),
                error: SessionError::InvalidState {
                    expected: SessionState::Ready,
                    actual: SessionState::Initialized,
                },
            },
            SessionEvent::Message {
                kind: MessageKind::Info,
                text: "Session run-1 failed".to_string(),
            },
            SessionEvent::Done,
        ]
    );
    assert!(session.error);
    assert!(source.is_stopped());
    assert_eq!(source.remaining(), 1);
}

#[tokio::test]
async fn external_command_failure_ends_the_run() {
    let mut session = session();
    let mut source = ScriptedLogSource::new([
        record("AGENT_RESTARTED", json!(null)),
        envelope("SESSION_START", json!(null)),
        envelope("EXTERNAL_COMMAND", json!("make flash")),
        envelope("TEST_OK", json!(null)),
    ]);
    let executor = FakeExecutor::new();
    executor.push_output("", 5);
    let mut sink: Vec<SessionEvent> = Vec::new();

    session
        .run(
            &DeviceId::new("dev-1"),
            &mut source,
            &executor,
            None,
            &mut sink,
        )
        .await;

    assert!(sink.contains(&SessionEvent::Error {
        session: SessionId::new(ID),
        error: SessionError::ExternalCommandExit { status: 5 },
    }));
    assert!(session.error);
    assert_eq!(done_count(&sink), 1);
    // The TEST_OK after the failed command was never consumed
    assert_eq!(source.remaining(), 1);
}

#[tokio::test]
async fn source_error_is_forwarded_verbatim() {
    let mut session = session();
    let mut source = ScriptedLogSource::new([
        SourceSignal::Error("stream reset by peer".to_string()),
        SourceSignal::Done,
    ]);
    let executor = FakeExecutor::new();
    let mut sink: Vec<SessionEvent> = Vec::new();

    session
        .run(
            &DeviceId::new("dev-1"),
            &mut source,
            &executor,
            None,
            &mut sink,
        )
        .await;

    assert_eq!(
        sink,
        vec![
            SessionEvent::Error {
                session: SessionId::new(ID),
                error: SessionError::LogSource {
                    message: "stream reset by peer".to_string(),
                },
            },
            SessionEvent::Message {
                kind: MessageKind::Info,
                text: "Session run-1 succeeded".to_string(),
            },
            SessionEvent::Done,
        ]
    );
}

#[tokio::test]
async fn source_exhaustion_stops_the_session() {
    let mut session = session();
    let mut source = ScriptedLogSource::new([]);
    let executor = FakeExecutor::new();
    let mut sink: Vec<SessionEvent> = Vec::new();

    session
        .run(
            &DeviceId::new("dev-1"),
            &mut source,
            &executor,
            None,
            &mut sink,
        )
        .await;

    assert!(session.is_stopped());
    assert_eq!(done_count(&sink), 1);
}
