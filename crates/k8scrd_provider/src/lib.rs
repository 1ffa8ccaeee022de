//! # k8scrd_provider
//!
//! Resource convergence engine for the `custom-resource` provider.
//!
//! This crate ties the template renderer and the apply runner together into
//! a create/read/update/delete lifecycle, resolves API server credentials
//! from static configuration and the environment, and reports every failure
//! as structured diagnostics.
//!
//! ## Features
//!
//! - Layered credential resolution (static block over `K8S_*` variables)
//! - `custom-resource_definition` and `custom-resource_instance` resources
//! - Declarative attribute schemas
//! - Diagnostics carrying the underlying template or kubectl message
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use k8scrd_provider::{CredentialResolver, ProcessEnv, Provider, ProviderConfig, ResourceKind, ResourceRecord};
//! use k8scrd_runner::{KubectlRunner, KubectlRunnerOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::new("0.1.0");
//! let config = ProviderConfig::new().host("https://api:6443").token("secret");
//! let configuration = provider.configure(&config, &CredentialResolver::new("K8S", ProcessEnv))?;
//!
//! let runner = Arc::new(KubectlRunner::new(KubectlRunnerOptions::default())?);
//! let controller = provider.controller(ResourceKind::Instance, runner);
//!
//! let plan = ResourceRecord::new("kind: Widget\nname: {{.name}}\n").with_attribute("name", "alpha");
//! let created = controller.create(&configuration, &plan).await?;
//! assert_eq!(created.applied.as_deref(), Some("kind: Widget\nname: alpha\n"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod value;

pub use config::{CredentialLayer, CredentialResolver, EnvSource, ProcessEnv, ProviderConfig, DEFAULT_ENV_PREFIX};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use error::{ConfigError, ProviderResult};
pub use model::{ResourceRecord, ResourceState};
pub use provider::{Provider, ProviderMetadata, ResourceKind, PROVIDER_TYPE_NAME};
pub use resource::{ResourceController, PLACEHOLDER_ID};
pub use schema::{Attribute, AttributeType, PlanModifier, Schema};
pub use value::ConfigValue;
