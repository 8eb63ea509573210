//! Startup validation.
//!
//! Produces diagnostics for a loaded [`RelayConfig`]; any error-level
//! diagnostic must stop the process before it connects to Discord.

use secrecy::ExposeSecret;

use crate::{
    error::{Error, Result},
    schema::RelayConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "completion.api_key"
    pub path: &'static str,
    pub message: String,
    /// Environment variable that can supply the value, if any.
    pub env: Option<&'static str>,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Convert the first error-level diagnostic into an [`Error`].
    pub fn into_result(self) -> Result<()> {
        let Some(first) = self
            .diagnostics
            .into_iter()
            .find(|d| d.severity == Severity::Error)
        else {
            return Ok(());
        };
        Err(match first.env {
            Some(env) => Error::Missing {
                key: first.path,
                env,
            },
            None => Error::invalid(first.path, first.message),
        })
    }

    fn error(&mut self, path: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path,
            message: message.into(),
            env: None,
        });
    }

    fn missing(&mut self, path: &'static str, env: &'static str) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path,
            message: format!("required, set it in the config file or via ${env}"),
            env: Some(env),
        });
    }

    fn warning(&mut self, path: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            path,
            message: message.into(),
            env: None,
        });
    }
}

/// Check a loaded configuration for fatal and suspicious settings.
#[must_use]
pub fn validate(config: &RelayConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.discord.token.expose_secret().trim().is_empty() {
        result.missing("discord.token", "DISCORD_TOKEN");
    }
    if config.completion.api_key.expose_secret().trim().is_empty() {
        result.missing("completion.api_key", "OPENROUTER_API_KEY");
    }
    if config.completion.model.trim().is_empty() {
        result.error("completion.model", "must not be empty");
    }
    if config.completion.timeout_secs == 0 {
        result.error("completion.timeout_secs", "must be greater than zero");
    }
    if config.history.max_exchanges == 0 {
        result.error("history.max_exchanges", "must keep at least one exchange");
    }
    if config.discord.command_prefix.trim().is_empty() {
        result.error("discord.command_prefix", "must not be empty");
    }

    let base_url = config.completion.base_url.trim();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        result.error("completion.base_url", "must be an http(s) URL");
    } else if base_url.starts_with("http://")
        && !base_url.starts_with("http://localhost")
        && !base_url.starts_with("http://127.0.0.1")
    {
        result.warning(
            "completion.base_url",
            "plain http sends the API key unencrypted",
        );
    }
    if config.chat.system_prompt.trim().is_empty() {
        result.warning("chat.system_prompt", "empty system prompt");
    }

    result
}
