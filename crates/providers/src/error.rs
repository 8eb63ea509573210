use std::time::Duration;

/// Crate-wide result type for completion calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a completion call.
///
/// Every variant is recoverable from the caller's point of view: the relay
/// turns it into a channel notice and keeps serving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, TLS or body-decoding failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("API error HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// No answer within the configured bound.
    #[error("request timed out after {}s", after.as_secs())]
    Timeout { after: Duration },

    /// The body parsed but did not look like a chat completion.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl Error {
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
