//! API server connection configuration.

use std::fmt;

/// Output format requested from the apply tool.
pub const DEFAULT_OUTPUT_FORMAT: &str = "json";

/// Resolved connection settings shared by every resource operation.
///
/// Empty strings mean "not set". Built once when the provider is configured
/// and only read afterwards.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfiguration {
    /// Address of the API server.
    pub host: String,
    /// Bearer token; takes precedence over basic authentication.
    pub token: String,
    pub username: String,
    pub password: String,
}

/// Authentication mode selected from a [`ProviderConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    Token(&'a str),
    Basic { username: &'a str, password: &'a str },
}

impl ProviderConfiguration {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Select the authentication mode. A non-empty token always wins.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        if !self.token.is_empty() {
            Some(Credentials::Token(&self.token))
        } else if !self.username.is_empty() && !self.password.is_empty() {
            Some(Credentials::Basic {
                username: &self.username,
                password: &self.password,
            })
        } else {
            None
        }
    }

    /// Arguments selecting the authentication mode, or `None` when no mode is usable.
    pub fn auth_args(&self) -> Option<Vec<String>> {
        self.credentials().map(|credentials| match credentials {
            Credentials::Token(token) => vec!["--token".to_string(), token.to_string()],
            Credentials::Basic { username, password } => vec![
                "--username".to_string(),
                username.to_string(),
                "--password".to_string(),
                password.to_string(),
            ],
        })
    }

    /// Full argument list for `apply`.
    pub fn apply_args(&self, output_format: &str) -> Option<Vec<String>> {
        let auth = self.auth_args()?;

        let mut args = vec!["apply".to_string(), "--server".to_string(), self.host.clone()];
        args.extend(auth);
        args.push("--output".to_string());
        args.push(output_format.to_string());
        Some(args)
    }
}

impl fmt::Debug for ProviderConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(value: &str) -> &'static str {
            if value.is_empty() {
                ""
            } else {
                "<redacted>"
            }
        }

        f.debug_struct("ProviderConfiguration")
            .field("host", &self.host)
            .field("token", &mask(&self.token))
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .finish()
    }
}

/// Render an argument list for logs with secret values replaced.
pub fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            redacted.push("<redacted>".to_string());
            hide_next = false;
            continue;
        }
        hide_next = arg == "--token" || arg == "--password";
        redacted.push(arg.clone());
    }
    redacted
}
