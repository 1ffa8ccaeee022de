//! Persisted resource record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Unmanaged,
    Managed,
}

/// Template, attributes, rendered output and identifier of one resource.
///
/// `applied` and `id` are computed by the controller and never taken from
/// user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub applied: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl ResourceRecord {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn state(&self) -> ResourceState {
        if self.id.is_some() {
            ResourceState::Managed
        } else {
            ResourceState::Unmanaged
        }
    }
}
