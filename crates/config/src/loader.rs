use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::RelayConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "chatrelay.toml",
    "chatrelay.yaml",
    "chatrelay.yml",
    "chatrelay.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<RelayConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load the configuration and apply environment overrides.
///
/// An explicit path must load successfully. Otherwise the standard locations
/// are searched:
/// 1. `./chatrelay.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/chatrelay/chatrelay.{toml,yaml,yml,json}` (user-global)
///
/// A discovered file that fails to parse is logged and replaced by defaults,
/// since the required secrets may still come from the environment.
pub fn discover_and_load(explicit: Option<&Path>) -> Result<RelayConfig> {
    let mut config = match explicit {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(path)?
        },
        None => match find_config_file() {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                load_config(&path).unwrap_or_else(|e| {
                    warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                    RelayConfig::default()
                })
            },
            None => {
                debug!("no config file found, using defaults");
                RelayConfig::default()
            },
        },
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Overlay values from the process environment.
///
/// `DISCORD_TOKEN` and `OPENROUTER_API_KEY` replace the secrets;
/// `CHATRELAY_PORT` (or the platform-provided `PORT`) replaces the liveness port.
pub fn apply_env_overrides(config: &mut RelayConfig) -> Result<()> {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    config: &mut RelayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = lookup("DISCORD_TOKEN") {
        config.discord.token = Secret::new(token);
    }
    if let Some(key) = lookup("OPENROUTER_API_KEY") {
        config.completion.api_key = Secret::new(key);
    }
    if let Some(port) = lookup("CHATRELAY_PORT").or_else(|| lookup("PORT")) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("invalid port override `{port}`"))?;
    }
    Ok(())
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/chatrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "chatrelay").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<RelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, secrecy::ExposeSecret, std::io::Write};

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "chatrelay.toml",
            "[completion]\nmodel = \"x/y\"\ntimeout_secs = 5\n",
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.completion.model, "x/y");
        assert_eq!(cfg.completion.timeout_secs, 5);
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = write_file(&dir, "c.yaml", "history:\n  max_exchanges: 3\n");
        assert_eq!(load_config(&yaml).unwrap().history.max_exchanges, 3);

        let json = write_file(&dir, "c.json", r#"{"server": {"port": 9000}}"#);
        assert_eq!(load_config(&json).unwrap().server.port, 9000);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "c.ini", "x=1");
        assert!(matches!(
            load_config(&path),
            Err(Error::UnsupportedFormat(ext)) if ext == "ini"
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            discover_and_load(Some(&missing)),
            Err(Error::Read { .. })
        ));
    }

    #[test]
    fn env_overrides_replace_secrets_and_port() {
        let mut cfg = RelayConfig::default();
        apply_env_overrides_with(&mut cfg, |name| match name {
            "DISCORD_TOKEN" => Some("discord-tok".into()),
            "OPENROUTER_API_KEY" => Some("or-key".into()),
            "PORT" => Some("10000".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.discord.token.expose_secret(), "discord-tok");
        assert_eq!(cfg.completion.api_key.expose_secret(), "or-key");
        assert_eq!(cfg.server.port, 10000);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = RelayConfig::default();
        cfg.discord.token = Secret::new("from-file".into());
        apply_env_overrides_with(&mut cfg, |name| {
            (name == "DISCORD_TOKEN").then(|| "  ".to_string())
        })
        .unwrap();
        assert_eq!(cfg.discord.token.expose_secret(), "from-file");
    }

    #[test]
    fn bad_port_override_is_reported() {
        let mut cfg = RelayConfig::default();
        let err = apply_env_overrides_with(&mut cfg, |name| {
            (name == "CHATRELAY_PORT").then(|| "eighty".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("eighty"));
    }
}
