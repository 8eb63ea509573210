//! Configuration loading, env substitution, env overrides and validation.
//!
//! Config files: `chatrelay.toml`, `chatrelay.yaml` or `chatrelay.json`,
//! searched in `./` then `~/.config/chatrelay/`. Every file is optional;
//! the two secrets usually arrive through `DISCORD_TOKEN` and
//! `OPENROUTER_API_KEY`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution in file contents.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::{ChatConfig, CompletionConfig, DiscordConfig, HistoryConfig, RelayConfig, ServerConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
