//! Structured diagnostics returned to the caller.
//!
//! Every failure in the provider ends up as a [`Diagnostic`] carrying a
//! severity, a short summary, and a detail string with the underlying
//! template or apply-tool message, so the caller can show it to the end
//! user as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

use k8scrd_runner::RunnerError;
use k8scrd_templates::TemplateError;

use crate::error::ConfigError;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Class of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// A configuration value cannot be resolved yet.
    UnknownConfiguration,
    MissingHost,
    MissingCredentials,
    TemplateParse,
    TemplateExec,
    /// The apply tool failed to start or exited with an error.
    Exec,
    ExecutableNotFound,
    InvalidArgument,
}

impl DiagnosticCode {
    /// Whether the caller should defer the operation instead of failing it.
    pub fn is_deferrable(&self) -> bool {
        matches!(self, Self::UnknownConfiguration)
    }
}

/// A single error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub summary: String,
    pub detail: String,
    /// Attribute path the diagnostic refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(
        code: DiagnosticCode,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, summary, detail)
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        match &self.attribute {
            Some(attribute) => write!(f, "{} [{}]: {}", label, attribute, self.summary)?,
            None => write!(f, "{}: {}", label, self.summary)?,
        }
        if !self.detail.is_empty() {
            write!(f, "\n  {}", self.detail)?;
        }
        Ok(())
    }
}

impl From<ConfigError> for Diagnostic {
    fn from(err: ConfigError) -> Self {
        let diagnostic = Diagnostic::error(err.code(), err.to_string(), err.detail());
        match err.attribute() {
            Some(attribute) => diagnostic.with_attribute(attribute),
            None => diagnostic,
        }
    }
}

impl From<&TemplateError> for Diagnostic {
    fn from(err: &TemplateError) -> Self {
        match err {
            TemplateError::Parse { .. } => Diagnostic::error(
                DiagnosticCode::TemplateParse,
                "Invalid Custom Resource Definition template.",
                format!(
                    "The provided Custom Resource Definition template is not valid as it could not be parsed: {}",
                    err
                ),
            ),
            TemplateError::Exec { .. } => Diagnostic::error(
                DiagnosticCode::TemplateExec,
                "Invalid Custom Resource Definition template.",
                format!(
                    "The provided Custom Resource Definition template could not be executed against the supplied attributes: {}",
                    err
                ),
            ),
        }
        .with_attribute("template")
    }
}

impl From<&RunnerError> for Diagnostic {
    fn from(err: &RunnerError) -> Self {
        match err {
            RunnerError::ExecutableNotFound(_) => Diagnostic::error(
                DiagnosticCode::ExecutableNotFound,
                "Apply executable not found.",
                format!(
                    "The kubectl executable could not be located: {}. \
                     Configure its path explicitly or make sure it is on PATH.",
                    err
                ),
            ),
            RunnerError::MissingCredentials { .. } => Diagnostic::error(
                DiagnosticCode::MissingCredentials,
                "Missing Kubernetes API Server credentials",
                err.to_string(),
            ),
            RunnerError::ExitFailure {
                stdin_error: Some(stdin_error),
                ..
            } => Diagnostic::error(
                DiagnosticCode::Exec,
                "Error executing external kubectl command.",
                format!(
                    "The kubectl apply command failed: {} (writing the document to its input also failed: {})",
                    err, stdin_error
                ),
            ),
            RunnerError::StdinWriteFailed { output, .. } => Diagnostic::error(
                DiagnosticCode::Exec,
                "Error executing external kubectl command.",
                format!(
                    "The kubectl apply command failed: {}\nOutput:\n{}",
                    err,
                    String::from_utf8_lossy(output).trim()
                ),
            ),
            _ => Diagnostic::error(
                DiagnosticCode::Exec,
                "Error executing external kubectl command.",
                format!("The kubectl apply command failed: {}", err),
            ),
        }
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// Whether every error can be resolved by deferring the operation.
    pub fn is_deferrable(&self) -> bool {
        self.has_error()
            && self
                .0
                .iter()
                .filter(|d| d.is_error())
                .all(|d| d.code.is_deferrable())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.0.iter().map(|d| d.code).collect()
    }

    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.0.iter().any(|d| d.code == code)
    }

    /// `Ok(value)` when no error was recorded, the diagnostics otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, Diagnostics> {
        if self.has_error() {
            Err(self)
        } else {
            Ok(value)
        }
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
