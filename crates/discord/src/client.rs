use std::sync::Arc;

use {secrecy::ExposeSecret, serenity::Client, tracing::debug};

use {chatrelay_auto_reply::RelayDispatcher, chatrelay_config::DiscordConfig};

use crate::{
    error::{Error, Result},
    handler::DiscordHandler,
    outbound::DiscordOutbound,
};

/// Build the gateway client wired to `dispatcher`.
///
/// The outbound adapter gets the client's REST handle right away so replies
/// work as soon as the first event arrives. Call `start()` on the returned
/// client to connect.
pub async fn build_client(
    config: &DiscordConfig,
    dispatcher: Arc<RelayDispatcher>,
    outbound: Arc<DiscordOutbound>,
) -> Result<Client> {
    let token = config.token.expose_secret().trim();
    if token.is_empty() {
        return Err(Error::message("discord token is empty"));
    }

    let handler = DiscordHandler {
        command_prefix: config.command_prefix.clone(),
        dispatcher,
        outbound: outbound.clone(),
    };

    let client = Client::builder(token, DiscordHandler::intents())
        .event_handler(handler)
        .await?;
    outbound.attach(client.http.clone());
    debug!(command_prefix = %config.command_prefix, "discord client built");

    Ok(client)
}
