//! Discord adapter for the relay, built on serenity.
//!
//! [`DiscordHandler`] maps gateway messages into platform-neutral
//! [`InboundMessage`](chatrelay_channels::InboundMessage)s for the dispatcher;
//! [`DiscordOutbound`] sends replies back through the REST API.

pub mod client;
pub mod error;
pub mod handler;
pub mod outbound;
pub mod text;

pub use {
    client::build_client,
    error::{Error, Result},
    handler::DiscordHandler,
    outbound::DiscordOutbound,
};
