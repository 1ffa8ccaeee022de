//! Apply runner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfiguration;
use crate::error::RunnerResult;

/// Result of a successful apply invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutput {
    /// Exit code of the apply process
    pub exit_code: i32,
    /// Combined stdout and stderr bytes
    pub output: Vec<u8>,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ApplyOutput {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output decoded as UTF-8, replacing invalid sequences.
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Combine captured stdout and stderr into one buffer.
pub fn combine_output(stdout: Vec<u8>, stderr: Vec<u8>) -> Vec<u8> {
    if stderr.is_empty() {
        return stdout;
    }
    if stdout.is_empty() {
        return stderr;
    }
    let mut combined = stdout;
    if !combined.ends_with(b"\n") {
        combined.push(b'\n');
    }
    combined.extend(stderr);
    combined
}

/// Declarative apply tool.
///
/// Implementations send a rendered document to the cluster and leave
/// convergence to the tool's own reconciliation. Calling `apply` twice with
/// the same document sends it twice.
#[async_trait]
pub trait ApplyRunner: Send + Sync {
    /// Check if the apply tool can be invoked.
    async fn is_available(&self) -> bool;

    /// Apply `document` against the API server described by `config`.
    async fn apply(
        &self,
        config: &ProviderConfiguration,
        document: &str,
    ) -> RunnerResult<ApplyOutput>;
}
