//! Integration tests for the CLI apply runner.
//!
//! These tests use small shell scripts as stand-ins for `kubectl`, so they
//! only run on Unix.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use k8scrd_runner::{
    ApplyRunner, KubectlRunner, KubectlRunnerOptions, ProviderConfiguration, RunnerError,
};
use tempfile::{tempdir, TempDir};

/// Write an executable script into a fresh directory.
fn script(body: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kubectl");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    (dir, path)
}

fn runner(path: &Path) -> KubectlRunner {
    KubectlRunner::new(KubectlRunnerOptions::new().executable(path)).unwrap()
}

fn token_config() -> ProviderConfiguration {
    ProviderConfiguration::new("https://api:6443").token("secret123")
}

#[tokio::test]
async fn test_document_is_streamed_to_stdin() {
    let (_dir, path) = script("cat");
    let runner = runner(&path);

    let output = runner
        .apply(&token_config(), "kind: Widget\nname: alpha\n")
        .await
        .unwrap();

    assert!(output.success());
    assert_eq!(output.output, b"kind: Widget\nname: alpha\n");
}

#[tokio::test]
async fn test_arguments_with_token() {
    let (_dir, path) = script("cat > /dev/null\necho \"$@\"");
    let runner = runner(&path);

    let output = runner.apply(&token_config(), "doc").await.unwrap();
    assert_eq!(
        output.output_lossy(),
        "apply --server https://api:6443 --token secret123 --output json\n"
    );
}

#[tokio::test]
async fn test_arguments_with_basic_auth() {
    let (_dir, path) = script("cat > /dev/null\necho \"$@\"");
    let runner = runner(&path);

    let config = ProviderConfiguration::new("https://api:6443").basic_auth("admin", "pw");
    let output = runner.apply(&config, "doc").await.unwrap();
    assert_eq!(
        output.output_lossy(),
        "apply --server https://api:6443 --username admin --password pw --output json\n"
    );
}

#[tokio::test]
async fn test_stdout_and_stderr_are_combined() {
    let (_dir, path) = script("cat > /dev/null\necho applied\necho warning >&2");
    let runner = runner(&path);

    let output = runner.apply(&token_config(), "doc").await.unwrap();
    assert_eq!(output.output_lossy(), "applied\nwarning\n");
}

#[tokio::test]
async fn test_nonzero_exit_carries_output() {
    let (_dir, path) = script("cat > /dev/null\necho 'error: the server rejected the object' >&2\nexit 3");
    let runner = runner(&path);

    let err = runner.apply(&token_config(), "doc").await.unwrap_err();
    match &err {
        RunnerError::ExitFailure { code, output, .. } => {
            assert_eq!(*code, Some(3));
            assert_eq!(output, b"error: the server rejected the object\n");
        }
        other => panic!("expected exit failure, got {:?}", other),
    }
    assert!(err.to_string().contains("exit status 3"));
    assert!(err.to_string().contains("the server rejected the object"));
}

#[tokio::test]
async fn test_large_document_does_not_deadlock() {
    let (_dir, path) = script("cat");
    let runner = runner(&path);

    let line = "key: 0123456789abcdef0123456789abcdef0123456789abcdef\n";
    let document = line.repeat(40_000);

    let output = runner.apply(&token_config(), &document).await.unwrap();
    assert_eq!(output.output.len(), document.len());
}

#[tokio::test]
async fn test_same_document_applied_twice() {
    let (_dir, path) = script("cat");
    let runner = runner(&path);

    let first = runner.apply(&token_config(), "kind: A\n").await.unwrap();
    let second = runner.apply(&token_config(), "kind: A\n").await.unwrap();
    assert_eq!(first.output, second.output);
}

#[tokio::test]
async fn test_is_available() {
    let (_dir, path) = script("exit 0");
    let runner = runner(&path);
    assert!(runner.is_available().await);
    assert!(runner.executable().ends_with("kubectl"));
}

#[tokio::test]
async fn test_unread_document_with_success_exit_is_reported() {
    let (_dir, path) = script("exit 0");
    let runner = runner(&path);

    let document = "x".repeat(4 * 1024 * 1024);
    let err = runner.apply(&token_config(), &document).await.unwrap_err();

    match err {
        RunnerError::StdinWriteFailed { message, output } => {
            assert!(!message.is_empty());
            assert!(output.is_empty());
        }
        other => panic!("expected StdinWriteFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unread_document_with_failed_exit_keeps_write_error() {
    let (_dir, path) = script("echo boom >&2\nexit 2");
    let runner = runner(&path);

    let document = "x".repeat(4 * 1024 * 1024);
    let err = runner.apply(&token_config(), &document).await.unwrap_err();

    match err {
        RunnerError::ExitFailure {
            code,
            output,
            stdin_error,
        } => {
            assert_eq!(code, Some(2));
            assert_eq!(output, b"boom\n");
            assert!(stdin_error.is_some());
        }
        other => panic!("expected ExitFailure, got {:?}", other),
    }
}
