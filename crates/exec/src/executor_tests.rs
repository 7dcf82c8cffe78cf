// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const FIVE_SECONDS: Duration = Duration::from_secs(5);

#[tokio::test]
async fn captures_stdout_and_exit_zero() {
    let out = ShellCommandExecutor
        .execute("echo hello", FIVE_SECONDS, &ExecOptions::default())
        .await
        .unwrap();
    assert_eq!(out.stdout, "hello\n");
    assert_eq!(out.status, 0);
    assert!(out.success());
}

#[tokio::test]
async fn reports_nonzero_exit_status() {
    let out = ShellCommandExecutor
        .execute("exit 7", FIVE_SECONDS, &ExecOptions::default())
        .await
        .unwrap();
    assert_eq!(out.status, 7);
    assert!(!out.success());
}

#[tokio::test]
async fn captures_stderr() {
    let out = ShellCommandExecutor
        .execute("echo oops >&2", FIVE_SECONDS, &ExecOptions::default())
        .await
        .unwrap();
    assert_eq!(out.stderr, "oops\n");
    assert_eq!(out.stdout, "");
}

#[tokio::test]
async fn runs_in_requested_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();
    let opts = ExecOptions {
        cwd: Some(dir.path().to_path_buf()),
        env: Vec::new(),
    };
    let out = ShellCommandExecutor
        .execute("pwd", FIVE_SECONDS, &opts)
        .await
        .unwrap();
    assert_eq!(out.stdout.trim(), canonical.to_string_lossy());
}

#[tokio::test]
async fn child_sees_exactly_the_provided_env() {
    let opts = ExecOptions {
        cwd: None,
        env: vec![("RIG_EXEC_TEST_VAR".to_string(), "42".to_string())],
    };
    let out = ShellCommandExecutor
        .execute(
            "printf '%s:%s' \"$RIG_EXEC_TEST_VAR\" \"${HOME:-unset}\"",
            FIVE_SECONDS,
            &opts,
        )
        .await
        .unwrap();
    // HOME was not in the provided env, so env_clear removed it
    assert_eq!(out.stdout, "42:unset");
}

#[tokio::test]
async fn timeout_is_distinguishable() {
    let result = ShellCommandExecutor
        .execute("sleep 5", Duration::from_millis(100), &ExecOptions::default())
        .await;
    assert!(matches!(result, Err(ExecError::Timeout { .. })));
}

#[tokio::test]
async fn spawn_failure_is_not_a_timeout() {
    let opts = ExecOptions {
        cwd: Some(PathBuf::from("/nonexistent/rig/cwd")),
        env: Vec::new(),
    };
    let result = ShellCommandExecutor.execute("true", FIVE_SECONDS, &opts).await;
    assert!(matches!(result, Err(ExecError::Spawn(_))));
}
