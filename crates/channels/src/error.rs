use std::error::Error as StdError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures an outbound adapter can report back to the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad channel id or empty text.
    #[error("invalid outbound request: {message}")]
    InvalidInput { message: String },

    /// No platform client attached yet.
    #[error("platform unavailable: {message}")]
    Unavailable { message: String },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
