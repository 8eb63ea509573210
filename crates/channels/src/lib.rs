//! Platform-neutral messaging types.
//!
//! A messaging platform adapter (Discord today) turns its native events into
//! [`InboundMessage`]s and implements [`ChannelOutbound`] so the relay core
//! never depends on a concrete client library.

pub mod commands;
pub mod error;
pub mod mention;
pub mod plugin;

pub use {
    commands::{ParsedCommand, parse_command},
    error::{Error, Result},
    mention::strip_mentions,
    plugin::{ChannelOutbound, InboundMessage},
};
