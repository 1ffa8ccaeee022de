//! CLI-based apply runner.
//!
//! Invokes a `kubectl`-compatible executable as
//! `apply --server <host> <auth> --output json`, streaming the rendered
//! document to its standard input while the combined output is collected.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info, trace};

use crate::config::{redact_args, ProviderConfiguration, DEFAULT_OUTPUT_FORMAT};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{combine_output, ApplyOutput, ApplyRunner};

/// Executable looked up on `PATH` when none is configured.
pub const DEFAULT_EXECUTABLE: &str = "kubectl";

/// CLI-based apply runner options.
#[derive(Debug, Clone)]
pub struct KubectlRunnerOptions {
    /// Executable name or path (if not set, `kubectl` on `PATH`)
    pub executable: Option<PathBuf>,
    /// Value passed to `--output`
    pub output_format: String,
    /// Dry-run mode (log commands without executing)
    pub dry_run: bool,
}

impl Default for KubectlRunnerOptions {
    fn default() -> Self {
        Self {
            executable: None,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            dry_run: false,
        }
    }
}

impl KubectlRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Apply runner backed by an external executable.
pub struct KubectlRunner {
    executable: PathBuf,
    options: KubectlRunnerOptions,
}

impl KubectlRunner {
    /// Create a runner, locating the executable up front.
    pub fn new(options: KubectlRunnerOptions) -> RunnerResult<Self> {
        let executable = Self::locate(options.executable.as_deref())?;
        info!("Using apply executable: {}", executable.display());

        Ok(Self {
            executable,
            options,
        })
    }

    /// Create a runner for an executable that has already been located.
    pub fn with_executable(executable: impl Into<PathBuf>, options: KubectlRunnerOptions) -> Self {
        Self {
            executable: executable.into(),
            options,
        }
    }

    /// Resolve an executable name through `PATH`, or check an explicit path.
    pub fn locate(requested: Option<&Path>) -> RunnerResult<PathBuf> {
        let name = requested.unwrap_or_else(|| Path::new(DEFAULT_EXECUTABLE));
        which::which(name)
            .map_err(|e| RunnerError::ExecutableNotFound(format!("{} ({})", name.display(), e)))
    }

    /// Get the located executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// Format command for logging, hiding secrets.
    fn format_command(&self, args: &[String]) -> String {
        let mut cmd = self.executable.display().to_string();
        for arg in redact_args(args) {
            if arg.contains(' ') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }

    /// Run the executable with `document` on stdin and capture its output.
    ///
    /// A separate task owns stdin and drops it once the document is written
    /// (or the write fails), which closes the pipe; the caller meanwhile reads
    /// stdout and stderr to completion.
    async fn execute(&self, args: &[String], document: &str) -> RunnerResult<(i32, Vec<u8>)> {
        let mut child = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::SpawnFailed {
                executable: self.executable.clone(),
                source,
            })?;

        let Some(mut stdin) = child.stdin.take() else {
            let _ = child.kill().await;
            return Err(RunnerError::StdinUnavailable);
        };

        let payload = document.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            let written = stdin.write_all(&payload).await;
            let closed = match written {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            };
            drop(stdin);
            trace!("stdin closed after {} bytes", payload.len());
            closed
        });

        let output = child.wait_with_output().await?;

        let write_result = match writer.await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("stdin writer task failed: {}", e)),
        };

        let combined = combine_output(output.stdout, output.stderr);

        if !output.status.success() {
            return Err(RunnerError::ExitFailure {
                code: output.status.code(),
                output: combined,
                stdin_error: write_result.err(),
            });
        }

        if let Err(message) = write_result {
            return Err(RunnerError::StdinWriteFailed {
                message,
                output: combined,
            });
        }

        Ok((output.status.code().unwrap_or(0), combined))
    }
}

#[async_trait]
impl ApplyRunner for KubectlRunner {
    async fn is_available(&self) -> bool {
        self.executable.is_file()
    }

    async fn apply(
        &self,
        config: &ProviderConfiguration,
        document: &str,
    ) -> RunnerResult<ApplyOutput> {
        let args = config
            .apply_args(&self.options.output_format)
            .ok_or_else(|| RunnerError::MissingCredentials {
                host: config.host.clone(),
            })?;
        let cmd_str = self.format_command(&args);

        info!("Applying document to {}", config.host);
        debug!("Command: {}", cmd_str);

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", cmd_str);
            let now = Utc::now();
            return Ok(ApplyOutput {
                exit_code: 0,
                output: format!("[DRY-RUN] Command: {}", cmd_str).into_bytes(),
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            });
        }

        let started_at = Utc::now();
        let result = self.execute(&args, document).await;
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        match result {
            Ok((exit_code, output)) => {
                info!("Apply completed successfully in {}ms", duration_ms);
                debug!("kubectl apply's output: {}", String::from_utf8_lossy(&output));
                Ok(ApplyOutput {
                    exit_code,
                    output,
                    started_at,
                    finished_at,
                    duration_ms,
                })
            }
            Err(e) => {
                error!("Apply failed after {}ms: {}", duration_ms, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_missing_executable() {
        let result = KubectlRunner::locate(Some(Path::new("k8scrd-no-such-apply-tool")));
        assert!(matches!(result, Err(RunnerError::ExecutableNotFound(_))));

        let result = KubectlRunner::new(
            KubectlRunnerOptions::new().executable("/nonexistent/dir/kubectl"),
        );
        match result {
            Err(RunnerError::ExecutableNotFound(msg)) => {
                assert!(msg.contains("/nonexistent/dir/kubectl"))
            }
            _ => panic!("expected ExecutableNotFound"),
        }
    }

    #[test]
    fn test_format_command_redacts_secrets() {
        let runner = KubectlRunner::with_executable("kubectl", KubectlRunnerOptions::default());
        let config = ProviderConfiguration::new("https://api:6443").token("secret123");
        let args = config.apply_args("json").unwrap();

        let formatted = runner.format_command(&args);
        assert_eq!(
            formatted,
            "kubectl apply --server https://api:6443 --token <redacted> --output json"
        );
    }

    #[tokio::test]
    async fn test_dry_run_does_not_spawn() {
        let runner = KubectlRunner::with_executable(
            "/nonexistent/kubectl",
            KubectlRunnerOptions::new().dry_run(),
        );
        assert!(runner.is_dry_run());

        let config = ProviderConfiguration::new("h").basic_auth("u", "p");
        let output = runner.apply(&config, "kind: Widget\n").await.unwrap();

        assert!(output.success());
        assert!(output.output_lossy().starts_with("[DRY-RUN] Command:"));
        assert!(output.output_lossy().contains("--password <redacted>"));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let runner = KubectlRunner::with_executable(
            "/nonexistent/kubectl",
            KubectlRunnerOptions::default(),
        );
        let config = ProviderConfiguration::new("h").basic_auth("u", "");

        let err = runner.apply(&config, "doc").await.unwrap_err();
        assert!(matches!(err, RunnerError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let runner = KubectlRunner::with_executable(
            "/nonexistent/kubectl",
            KubectlRunnerOptions::default(),
        );
        assert!(!runner.is_available().await);

        let config = ProviderConfiguration::new("h").token("t");
        let err = runner.apply(&config, "doc").await.unwrap_err();
        assert!(matches!(err, RunnerError::SpawnFailed { .. }));
    }
}
