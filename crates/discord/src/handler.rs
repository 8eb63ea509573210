//! Discord event handler for serenity.
//!
//! Implements the EventHandler trait to receive gateway events and feed them
//! to the relay dispatcher. Serenity runs each event on its own task, so a
//! slow completion in one channel never holds up the others.

use std::sync::Arc;

use {
    serenity::{
        all::{Context, EventHandler, GatewayIntents, GuildId, Message, Ready},
        async_trait,
    },
    tracing::{debug, info},
};

use {
    chatrelay_auto_reply::{Outcome, RelayDispatcher},
    chatrelay_channels::{InboundMessage, parse_command},
};

use crate::{outbound::DiscordOutbound, text::mention_tokens};

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    pub command_prefix: String,
    pub dispatcher: Arc<RelayDispatcher>,
    pub outbound: Arc<DiscordOutbound>,
}

/// The fields of a gateway message the relay cares about.
#[derive(Debug, Clone)]
pub struct RawMessage<'a> {
    pub channel_id: u64,
    pub author_id: u64,
    pub author_name: &'a str,
    pub author_is_bot: bool,
    pub mention_ids: Vec<u64>,
    pub content: &'a str,
}

impl<'a> RawMessage<'a> {
    fn from_message(msg: &'a Message) -> Self {
        Self {
            channel_id: msg.channel_id.get(),
            author_id: msg.author.id.get(),
            author_name: &msg.author.name,
            author_is_bot: msg.author.bot,
            mention_ids: msg.mentions.iter().map(|u| u.id.get()).collect(),
            content: &msg.content,
        }
    }
}

/// Map a gateway message into the relay's platform-neutral form.
#[must_use]
pub fn to_inbound(raw: &RawMessage<'_>, bot_user_id: u64, command_prefix: &str) -> InboundMessage {
    InboundMessage {
        channel_id: raw.channel_id.to_string(),
        author_id: raw.author_id.to_string(),
        author_name: Some(raw.author_name.to_string()),
        author_is_self: raw.author_id == bot_user_id,
        author_is_bot: raw.author_is_bot,
        mentions_self: raw.mention_ids.contains(&bot_user_id),
        content: raw.content.to_string(),
        self_mention_tokens: mention_tokens(bot_user_id),
        command: parse_command(command_prefix, raw.content),
    }
}

impl DiscordHandler {
    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            bot_user_id = ready.user.id.get(),
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        self.outbound.attach(ctx.http.clone());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let bot_user_id = ctx.cache.current_user().id.get();
        let inbound = to_inbound(
            &RawMessage::from_message(&msg),
            bot_user_id,
            &self.command_prefix,
        );
        let channel_id = inbound.channel_id.clone();

        match self.dispatcher.handle(inbound).await {
            Outcome::Ignored(reason) => {
                debug!(channel_id = %channel_id, ?reason, "discord message ignored");
            },
            outcome => {
                info!(
                    channel_id = %channel_id,
                    author = %msg.author.name,
                    ?outcome,
                    "discord message handled"
                );
            },
        }
    }

    async fn cache_ready(&self, _ctx: Context, guilds: Vec<GuildId>) {
        debug!(guild_count = guilds.len(), "discord cache ready");
    }
}
