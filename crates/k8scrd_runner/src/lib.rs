//! # k8scrd_runner
//!
//! Declarative apply tool execution for k8scrd.
//!
//! This crate sends rendered resource documents to an external
//! `kubectl apply` compatible executable. The document travels on the
//! process's standard input; the combined output is returned to the caller.
//!
//! # Features
//!
//! - **Connection config**: host plus token or basic-auth credentials, token first
//! - **CLI runner**: executable located at startup (explicit path or `PATH`)
//! - **Dry-Run Mode**: Log commands without execution
//! - **Mock Runner**: For testing without an apply tool
//!
//! # Example
//!
//! ```rust,no_run
//! use k8scrd_runner::{ApplyRunner, KubectlRunner, KubectlRunnerOptions, ProviderConfiguration};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = KubectlRunner::new(KubectlRunnerOptions::default())?;
//!     let config = ProviderConfiguration::new("https://127.0.0.1:6443").token("secret");
//!
//!     let result = runner.apply(&config, "apiVersion: v1\nkind: Namespace\n").await?;
//!     println!("{}", result.output_lossy());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mock;
pub mod runner;

pub use cli::{KubectlRunner, KubectlRunnerOptions, DEFAULT_EXECUTABLE};
pub use config::{redact_args, Credentials, ProviderConfiguration, DEFAULT_OUTPUT_FORMAT};
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{combine_output, ApplyOutput, ApplyRunner};
