use async_trait::async_trait;

use crate::{Result, commands::ParsedCommand};

/// A message received from the platform, already mapped out of the client
/// library's native type.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Channel the message was posted in; replies go back here.
    pub channel_id: String,
    pub author_id: String,
    pub author_name: Option<String>,
    /// The bot itself wrote this message.
    pub author_is_self: bool,
    /// Any bot account wrote this message (including the bot itself).
    pub author_is_bot: bool,
    /// The bot's user is in the mention list.
    pub mentions_self: bool,
    /// Raw message text, mention tokens included.
    pub content: String,
    /// Literal tokens the platform uses to mention the bot (e.g. `<@123>`).
    pub self_mention_tokens: Vec<String>,
    /// Prefix command detected in `content`, if any.
    pub command: Option<ParsedCommand>,
}

impl InboundMessage {
    /// A bot other than this one wrote the message.
    #[must_use]
    pub fn author_is_other_bot(&self) -> bool {
        self.author_is_bot && !self.author_is_self
    }
}

/// Send messages to a channel.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()>;

    /// Show a "typing" indicator. No-op by default.
    async fn send_typing(&self, _channel_id: &str) -> Result<()> {
        Ok(())
    }
}
