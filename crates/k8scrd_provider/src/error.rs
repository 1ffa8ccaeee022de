//! Error types for provider configuration.

use thiserror::Error;

use crate::diagnostics::{DiagnosticCode, Diagnostics};

/// Result type alias for provider operations.
///
/// The error side is never empty.
pub type ProviderResult<T> = Result<T, Diagnostics>;

/// Problems found while resolving the provider configuration.
///
/// `prefix` is the environment variable prefix (e.g. `K8S`), used to point
/// the user at the right fallback variables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown Kubernetes API Server host")]
    UnknownHost { prefix: String },

    #[error("Unknown Kubernetes API Server credentials")]
    UnknownCredentials { prefix: String },

    #[error("Missing Kubernetes API Server host")]
    MissingHost { prefix: String },

    #[error("Missing Kubernetes API Server credentials")]
    MissingCredentials { prefix: String },
}

impl ConfigError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::UnknownHost { .. } | Self::UnknownCredentials { .. } => {
                DiagnosticCode::UnknownConfiguration
            }
            Self::MissingHost { .. } => DiagnosticCode::MissingHost,
            Self::MissingCredentials { .. } => DiagnosticCode::MissingCredentials,
        }
    }

    /// Configuration attribute the problem belongs to, if a single one.
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Self::UnknownHost { .. } | Self::MissingHost { .. } => Some("host"),
            _ => None,
        }
    }

    /// Explanation shown to the user below the summary.
    pub fn detail(&self) -> String {
        match self {
            Self::UnknownHost { prefix } => format!(
                "The provider cannot create the Kubernetes API client as there is an unknown configuration value for the API Server endpoint. \
                 Set the value statically in the configuration, or use the {}_HOST environment variable.",
                prefix
            ),
            Self::UnknownCredentials { prefix } => format!(
                "The provider cannot create the Kubernetes API client as there are no valid credentials specified. \
                 Statically set the value of either the token, or the username and password combination, in the configuration, \
                 or use the {p}_TOKEN, {p}_USERNAME and {p}_PASSWORD environment variables.",
                p = prefix
            ),
            Self::MissingHost { prefix } => format!(
                "The provider cannot create the Kubernetes API client as there is a missing or empty value for the API Server host. \
                 Set the host value in the configuration or use the {}_HOST environment variable. \
                 If either is already set, ensure the value is not empty.",
                prefix
            ),
            Self::MissingCredentials { prefix } => format!(
                "The provider cannot create the Kubernetes API client as there is a missing or empty value for the API Server credentials. \
                 Set the token value, or a valid username/password combination in the configuration or use the {p}_TOKEN, \
                 {p}_USERNAME and {p}_PASSWORD environment variables. \
                 If either is already set, ensure the values are not empty.",
                p = prefix
            ),
        }
    }
}
