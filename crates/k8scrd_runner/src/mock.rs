//! Mock apply runner for testing.
//!
//! Provides a configurable mock implementation of the ApplyRunner trait
//! for use in unit tests without a real apply tool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::config::{ProviderConfiguration, DEFAULT_OUTPUT_FORMAT};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ApplyOutput, ApplyRunner};

/// Predefined mock response for an apply call.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    pub output: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: output.into(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
            duration_ms: 100,
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub method: String,
    pub host: Option<String>,
    pub args: Option<Vec<String>>,
    pub document: Option<String>,
}

/// Mock apply runner for testing.
#[derive(Clone)]
pub struct MockRunner {
    /// Whether the runner should report as available.
    available: Arc<RwLock<bool>>,
    /// Predefined responses for apply calls.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next response to return.
    response_index: Arc<AtomicUsize>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Simulated failure to return.
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self {
            available: Arc::new(RwLock::new(true)),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Set whether the runner is available.
    pub fn set_available(self, available: bool) -> Self {
        *self.available.write() = available;
        self
    }

    /// Add a mock response for the next apply call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set multiple responses.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Set a failure to simulate.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Documents passed to `apply`, in call order.
    pub fn applied_documents(&self) -> Vec<String> {
        self.get_method_calls("apply")
            .into_iter()
            .filter_map(|c| c.document)
            .collect()
    }

    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }

    fn check_failure(&self) -> RunnerResult<()> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::Simulated(msg));
        }
        Ok(())
    }
}

#[async_trait]
impl ApplyRunner for MockRunner {
    async fn is_available(&self) -> bool {
        self.record_call(CapturedCall {
            method: "is_available".to_string(),
            host: None,
            args: None,
            document: None,
        });
        *self.available.read()
    }

    async fn apply(
        &self,
        config: &ProviderConfiguration,
        document: &str,
    ) -> RunnerResult<ApplyOutput> {
        let args = config.apply_args(DEFAULT_OUTPUT_FORMAT);
        self.record_call(CapturedCall {
            method: "apply".to_string(),
            host: Some(config.host.clone()),
            args: args.clone(),
            document: Some(document.to_string()),
        });

        self.check_failure()?;
        if args.is_none() {
            return Err(RunnerError::MissingCredentials {
                host: config.host.clone(),
            });
        }

        let response = self.next_response();
        if response.exit_code != 0 {
            return Err(RunnerError::ExitFailure {
                code: Some(response.exit_code),
                output: response.output.into_bytes(),
                stdin_error: None,
            });
        }

        let started_at = Utc::now();
        let finished_at = started_at + chrono::Duration::milliseconds(response.duration_ms as i64);

        Ok(ApplyOutput {
            exit_code: response.exit_code,
            output: response.output.into_bytes(),
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfiguration {
        ProviderConfiguration::new("https://api:6443").token("secret123")
    }

    #[tokio::test]
    async fn test_mock_runner_basic() {
        let runner = MockRunner::new().add_response(MockResponse::success("{\"status\":\"ok\"}"));

        let result = runner.apply(&config(), "kind: Widget\n").await.unwrap();

        assert!(result.success());
        assert_eq!(result.output_lossy(), "{\"status\":\"ok\"}");
    }

    #[tokio::test]
    async fn test_mock_runner_captures_calls() {
        let runner = MockRunner::new();

        let _ = runner.apply(&config(), "kind: Widget\n").await;

        let calls = runner.get_method_calls("apply");
        assert_eq!(calls.len(), 1);

        let call = &calls[0];
        assert_eq!(call.host.as_deref(), Some("https://api:6443"));
        assert_eq!(call.document.as_deref(), Some("kind: Widget\n"));
        let args = call.args.as_ref().unwrap();
        assert!(args.windows(2).any(|w| w[0] == "--token" && w[1] == "secret123"));
    }

    #[tokio::test]
    async fn test_mock_runner_failure_simulation() {
        let runner = MockRunner::new().simulate_failure("simulated error");

        let result = runner.apply(&config(), "doc").await;
        assert!(matches!(result, Err(RunnerError::Simulated(_))));
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_runner_multiple_responses() {
        let runner = MockRunner::new().with_responses(vec![
            MockResponse::success("first"),
            MockResponse::failure(1, "error: rejected"),
        ]);

        let r1 = runner.apply(&config(), "a").await.unwrap();
        assert_eq!(r1.output_lossy(), "first");

        let r2 = runner.apply(&config(), "b").await.unwrap_err();
        assert_eq!(r2.output(), Some(b"error: rejected".as_slice()));

        assert_eq!(runner.applied_documents(), vec!["a", "b"]);
        runner.clear_calls();
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_runner_availability() {
        assert!(MockRunner::new().set_available(true).is_available().await);
        assert!(!MockRunner::new().set_available(false).is_available().await);
    }
}
