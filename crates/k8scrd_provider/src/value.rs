//! Tri-state configuration values.

use serde::{Deserialize, Serialize};

/// A statically supplied value as seen by the host framework.
///
/// `Unknown` means the value depends on something not resolved yet (for
/// example an attribute of a resource that has not been applied), which is
/// different from not being set at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "value")]
pub enum ConfigValue {
    #[default]
    Null,
    Unknown,
    Known(String),
}

impl ConfigValue {
    pub fn known(value: impl Into<String>) -> Self {
        Self::Known(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The value when known, including the empty string.
    pub fn as_known(&self) -> Option<&str> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Option<String>> for ConfigValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) => Self::Known(value),
            None => Self::Null,
        }
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Known(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Known(value.to_string())
    }
}
