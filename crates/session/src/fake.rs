// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake log source and reassignment hook for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::source::{DeviceGroupReassigner, LogSource, ReassignError, SourceSignal};
use async_trait::async_trait;
use parking_lot::Mutex;
use rig_core::DeviceId;
use std::collections::VecDeque;
use std::sync::Arc;

/// Scripted log source: yields queued signals in order, then `None`.
///
/// `stop` halts production immediately; unconsumed signals stay queued so
/// tests can assert the session stopped reading mid-stream.
pub struct ScriptedLogSource {
    signals: VecDeque<SourceSignal>,
    stopped: bool,
}

impl ScriptedLogSource {
    pub fn new(signals: impl IntoIterator<Item = SourceSignal>) -> Self {
        Self {
            signals: signals.into_iter().collect(),
            stopped: false,
        }
    }

    /// Whether `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Signals left unconsumed.
    pub fn remaining(&self) -> usize {
        self.signals.len()
    }
}

#[async_trait]
impl LogSource for ScriptedLogSource {
    async fn next(&mut self) -> Option<SourceSignal> {
        if self.stopped {
            None
        } else {
            self.signals.pop_front()
        }
    }

    async fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Reassignment hook that records calls; optionally scripted to fail once.
#[derive(Clone, Default)]
pub struct RecordingReassigner {
    inner: Arc<Mutex<ReassignerState>>,
}

#[derive(Default)]
struct ReassignerState {
    calls: Vec<DeviceId>,
    fail_with: Option<String>,
}

impl RecordingReassigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded reassignment calls.
    pub fn calls(&self) -> Vec<DeviceId> {
        self.inner.lock().calls.clone()
    }

    /// Fail the next reassignment with the given message.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.inner.lock().fail_with = Some(message.into());
    }
}

#[async_trait]
impl DeviceGroupReassigner for RecordingReassigner {
    async fn reassign(&self, device: &DeviceId) -> Result<(), ReassignError> {
        let mut inner = self.inner.lock();
        inner.calls.push(device.clone());
        match inner.fail_with.take() {
            Some(message) => Err(ReassignError(message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
