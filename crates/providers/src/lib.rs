//! Completion service clients.
//!
//! The relay talks to the completion backend through [`CompletionProvider`],
//! a single request/response call over role-tagged turns.

pub mod error;
pub mod openai;

use async_trait::async_trait;

use chatrelay_common::Turn;

pub use {
    error::{Error, Result},
    openai::OpenAiCompatProvider,
};

/// A text-generation backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name used in logs (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Model identifier (e.g. "openai/gpt-oss-120b:free").
    fn id(&self) -> &str;

    /// Run one completion over `turns`, oldest first.
    async fn complete(&self, turns: &[Turn]) -> Result<CompletionResponse>;
}

/// Response from a completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Visible reply text. `None` when the service returned no usable content.
    pub text: Option<String>,
}

impl CompletionResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self { text: None }
    }
}
