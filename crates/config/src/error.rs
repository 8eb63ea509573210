use std::path::PathBuf;

/// Crate-wide result type for configuration handling.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required secret is absent from both the config file and the environment.
    #[error("missing required setting `{key}` (set it in the config file or via ${env})")]
    Missing { key: &'static str, env: &'static str },

    /// A setting is present but unusable.
    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: .{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl chatrelay_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

chatrelay_common::impl_context!();
