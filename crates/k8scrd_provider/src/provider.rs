//! Provider entry point: metadata, schemas and configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use k8scrd_runner::{ApplyRunner, ProviderConfiguration};

use crate::config::{CredentialResolver, EnvSource, ProviderConfig};
use crate::error::ProviderResult;
use crate::resource::ResourceController;
use crate::schema::{Attribute, PlanModifier, Schema};

/// Type name the provider registers under.
pub const PROVIDER_TYPE_NAME: &str = "custom-resource";

/// Name and version reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub type_name: String,
    pub version: String,
}

/// Resource types offered by the provider. Both share the same lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A Custom Resource Definition manifest.
    Definition,
    /// An instance of a registered Custom Resource Definition.
    Instance,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Definition, ResourceKind::Instance];

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Instance => "instance",
        }
    }

    /// Full resource type name, e.g. `custom-resource_definition`.
    pub fn type_name(&self, provider_type_name: &str) -> String {
        format!("{}_{}", provider_type_name, self.suffix())
    }

    pub fn schema(&self) -> Schema {
        let description = match self {
            Self::Definition => "Custom Resource Definition (CRD) registered from a template",
            Self::Instance => {
                "Resource instance created according to a registered Custom Resource Definition (CRD)"
            }
        };

        Schema::new(description)
            .with_attribute(
                "attributes",
                Attribute::optional_string_map().with_description("Template attributes"),
            )
            .with_attribute(
                "template",
                Attribute::required_string()
                    .with_description("The template to use to define the custom resource"),
            )
            .with_attribute(
                "applied",
                Attribute::computed_string()
                    .with_description("The actual YAML used to create the CRD(s)"),
            )
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_description("Identifier for the Custom Resource Definition")
                    .with_plan_modifier(PlanModifier::UseStateForUnknown),
            )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    /// Accepts the suffix (`definition`) or the full type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s
            .strip_prefix(PROVIDER_TYPE_NAME)
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(s);
        match suffix {
            "definition" => Ok(Self::Definition),
            "instance" => Ok(Self::Instance),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// The custom-resource provider.
#[derive(Debug, Clone)]
pub struct Provider {
    version: String,
}

impl Provider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: self.version.clone(),
        }
    }

    /// Schema of the provider block.
    pub fn schema(&self) -> Schema {
        Schema::new("Applies templated Kubernetes custom resources through kubectl")
            .with_attribute(
                "host",
                Attribute::required_string()
                    .with_description("The address of the API server host to connect to."),
            )
            .with_attribute(
                "token",
                Attribute::optional_string()
                    .with_description(
                        "The bearer token to use in order to authenticate against the API server; \
                         if not specified, a username and password combination should be provided instead.",
                    )
                    .sensitive(),
            )
            .with_attribute(
                "username",
                Attribute::optional_string().with_description(
                    "The username to use, in combination with a password, in order to authenticate \
                     against the API server. If a bearer token has been provided, it will take \
                     precedence over username and password basic authentication",
                ),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .with_description(
                        "The password to use, in combination with a username, in order to authenticate \
                         against the API server. If a bearer token has been provided, it will take \
                         precedence over username and password basic authentication",
                    )
                    .sensitive(),
            )
    }

    pub fn resources(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL.to_vec()
    }

    /// Resolve the provider block once; the result is shared by every operation.
    pub fn configure<E: EnvSource>(
        &self,
        config: &ProviderConfig,
        resolver: &CredentialResolver<E>,
    ) -> ProviderResult<Arc<ProviderConfiguration>> {
        info!("Configuring {} provider {}", PROVIDER_TYPE_NAME, self.version);
        resolver.resolve(config).map(Arc::new)
    }

    pub fn controller(&self, kind: ResourceKind, runner: Arc<dyn ApplyRunner>) -> ResourceController {
        ResourceController::new(kind, runner)
    }
}
