//! CLI command definitions.
//!
//! Each lifecycle subcommand maps to one resource controller operation and
//! keeps the resource record in a JSON state file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use k8scrd_provider::{
    ConfigValue, CredentialResolver, Diagnostic, Diagnostics, Provider, ProviderConfig,
    ResourceController, ResourceKind, ResourceRecord, DEFAULT_ENV_PREFIX,
};
use k8scrd_runner::{
    ApplyRunner, KubectlRunner, KubectlRunnerOptions, ProviderConfiguration, DEFAULT_EXECUTABLE,
};

pub mod create;
pub mod delete;
pub mod read;
pub mod render;
pub mod schema;
pub mod update;

/// k8scrd - templated Kubernetes custom resources through kubectl
#[derive(Parser)]
#[command(name = "k8scrd")]
#[command(version, about = "k8scrd - templated Kubernetes custom resources through kubectl")]
#[command(long_about = r#"
k8scrd renders a resource template against a set of attributes and applies
the result with `kubectl apply`, keeping the resource record in a JSON
state file.

COMMANDS:
  render   → Render a template to stdout
  create   → Render, apply, and write a new state file
  read     → Show the stored record
  update   → Re-render and re-apply, keeping the identifier
  delete   → Forget the record (nothing is removed from the cluster)
  schema   → Print the provider and resource schemas

CONNECTION:
  --host/--token/--username/--password override the K8S_HOST, K8S_TOKEN,
  K8S_USERNAME and K8S_PASSWORD environment variables.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Template error
  5 - Apply error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// kubectl executable (name on PATH or explicit path)
    #[arg(long, global = true, env = "K8SCRD_KUBECTL")]
    pub kubectl: Option<PathBuf>,

    /// Log the kubectl command instead of running it
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn context(&self) -> Context {
        Context {
            kubectl: self.kubectl.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template without applying it
    Render(render::RenderArgs),

    /// Create a resource and write its state file
    Create(create::CreateArgs),

    /// Show the stored resource record
    Read(read::ReadArgs),

    /// Re-apply a resource, keeping its identifier
    Update(update::UpdateArgs),

    /// Remove a resource from tracked state
    Delete(delete::DeleteArgs),

    /// Print provider and resource schemas
    Schema(schema::SchemaArgs),
}

/// Global options shared by the lifecycle commands.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub kubectl: Option<PathBuf>,
    pub dry_run: bool,
}

impl Context {
    /// Build the kubectl runner, locating the executable unless in dry-run mode.
    pub fn runner(&self) -> Result<Arc<dyn ApplyRunner>> {
        let mut options = KubectlRunnerOptions::new();
        if let Some(path) = &self.kubectl {
            options = options.executable(path.clone());
        }

        if self.dry_run {
            let executable = self
                .kubectl
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE));
            return Ok(Arc::new(KubectlRunner::with_executable(
                executable,
                options.dry_run(),
            )));
        }

        let runner = KubectlRunner::new(options)
            .map_err(|e| Diagnostics::from(Diagnostic::from(&e)))?;
        Ok(Arc::new(runner))
    }

    /// Configure the provider and build a controller for `kind`.
    pub fn controller(
        &self,
        connection: &ConnectionArgs,
        kind: ResourceKind,
    ) -> Result<(Arc<ProviderConfiguration>, ResourceController)> {
        let provider = Provider::new(env!("CARGO_PKG_VERSION"));
        let resolver = CredentialResolver::new(connection.env_prefix.clone(), k8scrd_provider::ProcessEnv);
        let configuration = provider.configure(&connection.provider_config(), &resolver)?;
        let controller = provider.controller(kind, self.runner()?);
        Ok((configuration, controller))
    }
}

/// API server connection flags. Unset flags fall back to the environment.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API server address
    #[arg(long)]
    pub host: Option<String>,

    /// Bearer token (takes precedence over username/password)
    #[arg(long)]
    pub token: Option<String>,

    /// Basic authentication username
    #[arg(long)]
    pub username: Option<String>,

    /// Basic authentication password
    #[arg(long)]
    pub password: Option<String>,

    /// Prefix of the fallback environment variables
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,
}

impl ConnectionArgs {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            host: ConfigValue::from(self.host.clone()),
            token: ConfigValue::from(self.token.clone()),
            username: ConfigValue::from(self.username.clone()),
            password: ConfigValue::from(self.password.clone()),
        }
    }
}

/// Template and attribute inputs.
#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Template file
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Attribute as key=value (repeatable, wins over --attributes)
    #[arg(short = 'a', long = "attr", value_parser = parse_key_val)]
    pub attrs: Vec<(String, String)>,

    /// YAML or JSON file with a flat map of attributes
    #[arg(long)]
    pub attributes: Option<PathBuf>,
}

impl TemplateArgs {
    pub fn load_template(&self) -> Result<Option<String>> {
        self.template
            .as_deref()
            .map(|path| {
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read template {}", path.display()))
            })
            .transpose()
    }

    /// Attributes from the file overlaid with `--attr` flags; `None` when neither is given.
    pub fn load_attributes(&self) -> Result<Option<BTreeMap<String, String>>> {
        if self.attributes.is_none() && self.attrs.is_empty() {
            return Ok(None);
        }

        let mut attributes = match &self.attributes {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read attributes {}", path.display()))?;
                parse_attributes(&content)
                    .with_context(|| format!("Invalid attributes file {}", path.display()))?
            }
            None => BTreeMap::new(),
        };

        for (key, value) in &self.attrs {
            attributes.insert(key.clone(), value.clone());
        }
        debug!("Loaded {} attributes", attributes.len());
        Ok(Some(attributes))
    }

    pub fn has_input(&self) -> bool {
        self.template.is_some() || self.attributes.is_some() || !self.attrs.is_empty()
    }
}

/// Parse a flat YAML (or JSON) map of scalars into string attributes.
pub fn parse_attributes(content: &str) -> Result<BTreeMap<String, String>> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    let mapping = match value {
        serde_yaml::Value::Null => return Ok(BTreeMap::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => anyhow::bail!("attributes must be a map of key/value pairs"),
    };

    let mut attributes = BTreeMap::new();
    for (key, value) in mapping {
        let key = scalar_to_string(&key).context("attribute keys must be scalars")?;
        let value = scalar_to_string(&value)
            .with_context(|| format!("attribute {} must be a scalar", key))?;
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid attribute '{}': expected key=value", s))?;
    if key.is_empty() {
        return Err(format!("invalid attribute '{}': empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse a resource kind flag value.
pub fn parse_kind(s: &str) -> std::result::Result<ResourceKind, String> {
    s.parse()
}

pub fn read_state(path: &Path) -> Result<ResourceRecord> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid state file {}", path.display()))
}

pub fn write_state(path: &Path, record: &ResourceRecord) -> Result<()> {
    let content = serde_json::to_string_pretty(record)?;
    fs::write(path, content + "\n")
        .with_context(|| format!("Failed to write state file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("name=alpha"),
            Ok(("name".to_string(), "alpha".to_string()))
        );
        assert_eq!(
            parse_key_val("labels=a=b"),
            Ok(("labels".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_val("name").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_parse_attributes() {
        let attributes = parse_attributes("name: alpha\nreplicas: 3\nenabled: true\n").unwrap();
        assert_eq!(attributes["name"], "alpha");
        assert_eq!(attributes["replicas"], "3");
        assert_eq!(attributes["enabled"], "true");

        let attributes = parse_attributes(r#"{"group": "example.com"}"#).unwrap();
        assert_eq!(attributes["group"], "example.com");

        assert!(parse_attributes("").unwrap().is_empty());
        assert!(parse_attributes("- a\n- b\n").is_err());
        assert!(parse_attributes("nested:\n  key: value\n").is_err());
    }

    #[test]
    fn test_attr_flags_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("attrs.yaml");
        fs::write(&file, "name: from-file\nkind: Widget\n").unwrap();

        let args = TemplateArgs {
            template: None,
            attrs: vec![("name".to_string(), "from-flag".to_string())],
            attributes: Some(file),
        };
        let attributes = args.load_attributes().unwrap().unwrap();
        assert_eq!(attributes["name"], "from-flag");
        assert_eq!(attributes["kind"], "Widget");
    }

    #[test]
    fn test_no_attributes() {
        let args = TemplateArgs {
            template: None,
            attrs: Vec::new(),
            attributes: None,
        };
        assert!(args.load_attributes().unwrap().is_none());
        assert!(!args.has_input());
    }

    #[test]
    fn test_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let record = ResourceRecord::new("kind: Widget\n").with_attribute("name", "alpha");

        write_state(&path, &record).unwrap();
        assert_eq!(read_state(&path).unwrap(), record);
    }

    #[test]
    fn test_connection_args() {
        let args = ConnectionArgs {
            host: Some("h".to_string()),
            token: None,
            username: Some(String::new()),
            password: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        };
        let config = args.provider_config();
        assert_eq!(config.host, ConfigValue::known("h"));
        assert!(config.token.is_null());
        assert_eq!(config.username, ConfigValue::known(""));
    }
}
