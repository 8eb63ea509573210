use std::sync::{Arc, RwLock};

use {
    async_trait::async_trait,
    serenity::all::{ChannelId, Http},
    tracing::debug,
};

use chatrelay_channels::{ChannelOutbound, Error, Result};

use crate::text::{DISCORD_MAX_MESSAGE_LEN, chunk_message};

/// Outbound message sender for Discord.
///
/// The REST client is attached once the gateway client exists; sends before
/// that fail with [`Error::Unavailable`].
#[derive(Default)]
pub struct DiscordOutbound {
    http: RwLock<Option<Arc<Http>>>,
}

impl DiscordOutbound {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the REST client used for sending.
    pub fn attach(&self, http: Arc<Http>) {
        *self.http.write().unwrap_or_else(|e| e.into_inner()) = Some(http);
    }

    fn http(&self) -> Result<Arc<Http>> {
        self.http
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| Error::unavailable("discord not connected"))
    }
}

/// Parse a channel id as produced by the handler (decimal snowflake).
pub(crate) fn parse_channel_id(channel_id: &str) -> Result<ChannelId> {
    match channel_id.parse::<u64>() {
        Ok(0) | Err(_) => Err(Error::invalid_input(format!(
            "not a discord channel id: {channel_id}"
        ))),
        Ok(id) => Ok(ChannelId::new(id)),
    }
}

#[async_trait]
impl ChannelOutbound for DiscordOutbound {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()> {
        let channel = parse_channel_id(channel_id)?;
        if text.trim().is_empty() {
            return Err(Error::invalid_input("refusing to send an empty message"));
        }
        let http = self.http()?;

        let chunks = chunk_message(text, DISCORD_MAX_MESSAGE_LEN);
        debug!(channel_id, chunks = chunks.len(), "sending discord message");
        for chunk in chunks {
            channel
                .say(&*http, chunk)
                .await
                .map_err(|e| Error::external("failed to send discord message", e))?;
        }
        Ok(())
    }

    async fn send_typing(&self, channel_id: &str) -> Result<()> {
        let channel = parse_channel_id(channel_id)?;
        let http = self.http()?;
        channel
            .broadcast_typing(&*http)
            .await
            .map_err(|e| Error::external("failed to send typing indicator", e))
    }
}
