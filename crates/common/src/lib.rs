//! Shared conversation types and error helpers used across the chatrelay crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{Role, Turn},
};
