//! Provider configuration and credential resolution.
//!
//! Connection settings come from two layers: the statically authored
//! provider block and `<PREFIX>_*` environment variables. The static layer
//! is overlaid on the environment layer, then the result is validated.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use k8scrd_runner::{Credentials, ProviderConfiguration};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ConfigError, ProviderResult};
use crate::value::ConfigValue;

/// Environment variable prefix used when none is given.
pub const DEFAULT_ENV_PREFIX: &str = "K8S";

/// Statically authored provider block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub host: ConfigValue,
    #[serde(default)]
    pub token: ConfigValue,
    #[serde(default)]
    pub username: ConfigValue,
    #[serde(default)]
    pub password: ConfigValue,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<ConfigValue>) -> Self {
        self.host = host.into();
        self
    }

    pub fn token(mut self, token: impl Into<ConfigValue>) -> Self {
        self.token = token.into();
        self
    }

    pub fn username(mut self, username: impl Into<ConfigValue>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<ConfigValue>) -> Self {
        self.password = password.into();
        self
    }
}

/// Source of environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// One layer of connection settings; `None` leaves the lower layer visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialLayer {
    pub host: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialLayer {
    pub fn from_env<E: EnvSource + ?Sized>(prefix: &str, env: &E) -> Self {
        let read = |name: &str| env.var(&format!("{}_{}", prefix, name));
        Self {
            host: read("HOST"),
            token: read("TOKEN"),
            username: read("USERNAME"),
            password: read("PASSWORD"),
        }
    }

    /// Known static values, including empty ones.
    pub fn from_static(config: &ProviderConfig) -> Self {
        let known = |value: &ConfigValue| value.as_known().map(str::to_string);
        Self {
            host: known(&config.host),
            token: known(&config.token),
            username: known(&config.username),
            password: known(&config.password),
        }
    }

    /// Place `top` over `self`, field by field.
    pub fn overlay(self, top: CredentialLayer) -> Self {
        Self {
            host: top.host.or(self.host),
            token: top.token.or(self.token),
            username: top.username.or(self.username),
            password: top.password.or(self.password),
        }
    }

    pub fn into_configuration(self) -> ProviderConfiguration {
        ProviderConfiguration {
            host: self.host.unwrap_or_default(),
            token: self.token.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        }
    }
}

/// Resolves a [`ProviderConfig`] into a usable [`ProviderConfiguration`].
#[derive(Debug, Clone)]
pub struct CredentialResolver<E = ProcessEnv> {
    prefix: String,
    env: E,
}

impl Default for CredentialResolver<ProcessEnv> {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX, ProcessEnv)
    }
}

impl<E: EnvSource> CredentialResolver<E> {
    pub fn new(prefix: impl Into<String>, env: E) -> Self {
        Self {
            prefix: prefix.into(),
            env,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve `config`, falling back to the environment for unset values.
    ///
    /// Returns every applicable violation at once; never a partially
    /// resolved configuration.
    pub fn resolve(&self, config: &ProviderConfig) -> ProviderResult<ProviderConfiguration> {
        self.check_unknown(config)?;

        let env = CredentialLayer::from_env(&self.prefix, &self.env);
        let resolved = env.overlay(CredentialLayer::from_static(config));
        let configuration = resolved.into_configuration();

        self.validate(&configuration)?;

        let mode = match configuration.credentials() {
            Some(Credentials::Token(_)) => "token",
            _ => "basic",
        };
        info!(
            "Configured API server {} using {} authentication",
            configuration.host, mode
        );
        debug!("Resolved configuration: {:?}", configuration);

        Ok(configuration)
    }

    fn check_unknown(&self, config: &ProviderConfig) -> ProviderResult<()> {
        let mut diags = Diagnostics::new();

        if config.host.is_unknown() {
            diags.push(Diagnostic::from(ConfigError::UnknownHost {
                prefix: self.prefix.clone(),
            }));
        }
        if config.token.is_unknown()
            && (config.username.is_unknown() || config.password.is_unknown())
        {
            diags.push(Diagnostic::from(ConfigError::UnknownCredentials {
                prefix: self.prefix.clone(),
            }));
        }

        if diags.has_error() {
            warn!("Provider configuration depends on unknown values");
        }
        diags.into_result(())
    }

    fn validate(&self, configuration: &ProviderConfiguration) -> ProviderResult<()> {
        let mut diags = Diagnostics::new();

        if configuration.host.is_empty() {
            diags.push(Diagnostic::from(ConfigError::MissingHost {
                prefix: self.prefix.clone(),
            }));
        }
        if configuration.token.is_empty()
            && (configuration.username.is_empty() || configuration.password.is_empty())
        {
            diags.push(Diagnostic::from(ConfigError::MissingCredentials {
                prefix: self.prefix.clone(),
            }));
        }

        if diags.has_error() {
            warn!("Provider configuration is incomplete: {:?}", diags.codes());
        }
        diags.into_result(())
    }
}
