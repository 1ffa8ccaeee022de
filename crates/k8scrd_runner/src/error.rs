//! Error types for the runner module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while invoking the apply tool.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Apply executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("No usable credentials for API server {host}: a token or a username/password pair is required")]
    MissingCredentials { host: String },

    #[error("Failed to start {executable}: {source}")]
    SpawnFailed {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Standard input of the apply process is not available")]
    StdinUnavailable,

    #[error("Writing the document to the apply process failed: {message}")]
    StdinWriteFailed { message: String, output: Vec<u8> },

    #[error("Apply exited with {}: {}", exit_label(*.code), String::from_utf8_lossy(.output).trim())]
    ExitFailure {
        code: Option<i32>,
        output: Vec<u8>,
        stdin_error: Option<String>,
    },

    #[error("Simulated failure: {0}")]
    Simulated(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Output captured from the apply process before it failed, if any.
    pub fn output(&self) -> Option<&[u8]> {
        match self {
            Self::StdinWriteFailed { output, .. } | Self::ExitFailure { output, .. } => {
                Some(output.as_slice())
            }
            _ => None,
        }
    }
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}
