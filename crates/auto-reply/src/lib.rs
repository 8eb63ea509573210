//! Inbound message processing: the glue between the messaging platform and
//! the completion service.
//!
//! Flow: inbound message → [`policy::decide`] → per-channel lock →
//! history snapshot → completion call → deliver → commit exchange.

pub mod dispatcher;
pub mod history;
pub mod modes;
pub mod policy;

pub use {
    dispatcher::{Outcome, RelayDispatcher, RelaySettings, RelayState},
    history::{ConversationWindow, HistoryStore},
    modes::ChannelModeRegistry,
    policy::{ControlCommand, Decision, IgnoreReason, decide},
};
