//! Chat transport boundary.
//!
//! The transport delivers [`IncomingMessage`]s to the bot and carries its
//! replies back out, either as plain chat text or as an emote.

mod console;
mod message;

pub use console::*;
pub use message::*;

use async_trait::async_trait;

/// Errors surfaced by a transport when delivering output.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to write to transport: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport closed")]
    Closed,
}

/// Outbound side of the chat connection.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send chat text to a channel or user.
    async fn send(&self, target: &str, text: &str) -> Result<(), TransportError>;

    /// Send an action (`/me ...`) to a channel or user.
    async fn emote(&self, target: &str, text: &str) -> Result<(), TransportError>;
}
