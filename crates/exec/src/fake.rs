// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake command executor for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::executor::{CommandExecutor, CommandOutput, ExecError, ExecOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Recorded call to [`FakeExecutor::execute`].
#[derive(Debug, Clone)]
pub struct ExecCall {
    pub command: String,
    pub timeout: Duration,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

/// Fake executor: returns scripted results and records all calls.
///
/// Results are consumed in FIFO order; once the script is exhausted, every
/// call succeeds with empty output and exit status 0.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    inner: Arc<Mutex<FakeExecutorState>>,
}

#[derive(Default)]
struct FakeExecutorState {
    calls: Vec<ExecCall>,
    results: VecDeque<Result<CommandOutput, ExecError>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<ExecCall> {
        self.inner.lock().calls.clone()
    }

    /// Script a successful invocation.
    pub fn push_output(&self, stdout: impl Into<String>, status: i32) {
        self.inner.lock().results.push_back(Ok(CommandOutput {
            stdout: stdout.into(),
            stderr: String::new(),
            status,
        }));
    }

    /// Script a full output triple.
    pub fn push_result(&self, output: CommandOutput) {
        self.inner.lock().results.push_back(Ok(output));
    }

    /// Script a timeout on the next invocation.
    pub fn push_timeout(&self, timeout: Duration) {
        self.inner
            .lock()
            .results
            .push_back(Err(ExecError::Timeout { timeout }));
    }

    /// Script a spawn failure on the next invocation.
    pub fn push_spawn_error(&self, message: impl Into<String>) {
        self.inner.lock().results.push_back(Err(ExecError::Spawn(
            std::io::Error::other(message.into()),
        )));
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute(
        &self,
        command: &str,
        timeout: Duration,
        opts: &ExecOptions,
    ) -> Result<CommandOutput, ExecError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ExecCall {
            command: command.to_string(),
            timeout,
            cwd: opts.cwd.clone(),
            env: opts.env.clone(),
        });
        inner.results.pop_front().unwrap_or(Ok(CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            status: 0,
        }))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
