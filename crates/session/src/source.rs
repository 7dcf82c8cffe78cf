// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound log-source contract.
//!
//! The transport (how log lines are fetched or streamed) lives behind
//! [`LogSource`]; the session only consumes typed signals, one at a time.

use async_trait::async_trait;
use rig_core::{DeviceId, LogRecord};
use thiserror::Error;

/// One signal from the log transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSignal {
    /// The transport is ready; log parsing is about to begin.
    Ready,
    /// A parsed log record.
    Record(LogRecord),
    /// Transport-level error, forwarded verbatim to the session.
    Error(String),
    /// The transport finished producing.
    Done,
}

/// Contract for the device/agent log transport.
///
/// Implementations may poll or stream internally; the session consumes
/// signals strictly one at a time, so record handling is serialized per
/// session. `stop` asks the transport to terminate its production loop;
/// subsequent `next` calls should return `None` promptly.
#[async_trait]
pub trait LogSource: Send {
    async fn next(&mut self) -> Option<SourceSignal>;

    async fn stop(&mut self);
}

/// Device-group reassignment hook, invoked when the source reports ready.
///
/// Works around a race between code deployment and device restart: the device
/// is moved back into its device group before any log processing begins.
/// Best-effort: failures are logged and never fatal, and no restart
/// handshake is awaited.
#[async_trait]
pub trait DeviceGroupReassigner: Send + Sync {
    async fn reassign(&self, device: &DeviceId) -> Result<(), ReassignError>;
}

/// Failure from a reassignment hook.
#[derive(Debug, Error)]
#[error("device group reassignment failed: {0}")]
pub struct ReassignError(pub String);
