//! Error types for templates.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while compiling or executing a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template text is malformed.
    #[error("template: {name}:{line}: {message}")]
    Parse {
        name: String,
        line: usize,
        message: String,
    },

    /// The template compiled but could not be executed against the attributes.
    #[error("template: {name}:{line}:{column}: executing \"{name}\" at <{action}>: {message}")]
    Exec {
        name: String,
        line: usize,
        column: usize,
        action: String,
        message: String,
    },
}

impl TemplateError {
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub fn is_exec(&self) -> bool {
        matches!(self, Self::Exec { .. })
    }
}
