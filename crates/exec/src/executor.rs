// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External command execution with a hard timeout.
//!
//! The session dispatcher blocks on one invocation at a time, so the contract
//! is a single awaited call: run the command, capture both streams, report
//! the exit status, and make timeout expiry distinguishable from every other
//! failure.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command did not finish within the allotted timeout.
    #[error("command timed out after {}s", .timeout.as_secs())]
    Timeout { timeout: Duration },

    /// The command could not be spawned or its output could not be read.
    #[error("command failed to run: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Per-invocation options.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Working directory; inherits the host's when unset.
    pub cwd: Option<PathBuf>,
    /// Complete child environment. The child sees exactly these variables,
    /// nothing is inherited.
    pub env: Vec<(String, String)>,
}

/// Captured result of a completed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status; -1 when the process was terminated by a signal.
    pub status: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Contract for running host-side commands on behalf of a remote test case.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` to completion, or fail with [`ExecError::Timeout`] once
    /// `timeout` elapses.
    async fn execute(
        &self,
        command: &str,
        timeout: Duration,
        opts: &ExecOptions,
    ) -> Result<CommandOutput, ExecError>;
}

/// Production executor: runs commands through `sh -c` under
/// `tokio::time::timeout`. The child is killed when the timeout fires (via
/// `kill_on_drop` on the dropped output future).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandExecutor;

#[async_trait]
impl CommandExecutor for ShellCommandExecutor {
    async fn execute(
        &self,
        command: &str,
        timeout: Duration,
        opts: &ExecOptions,
    ) -> Result<CommandOutput, ExecError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .env_clear()
            .envs(opts.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true);
        if let Some(cwd) = &opts.cwd {
            cmd.current_dir(cwd);
        }

        match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                status: output.status.code().unwrap_or(-1),
            }),
            Ok(Err(io_err)) => Err(ExecError::Spawn(io_err)),
            Err(_elapsed) => Err(ExecError::Timeout { timeout }),
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
