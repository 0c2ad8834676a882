//! Capabilities the relay borrows from the host runtime.
//!
//! The relay never talks to a phone, browser or watch directly. Everything
//! outward-facing goes through a [`Host`], so the relay can run against the
//! stdio adapter in production and a recording stand-in under test.

use async_trait::async_trait;
use scba_sdk::objects::AppMessage;
use thiserror::Error;
use url::Url;

/// Errors reported by a [`Host`].
#[derive(Debug, Error)]
pub enum HostError {
    /// The watch rejected the message or it could not be delivered.
    #[error("message {transaction_id} was rejected: {reason}")]
    Nack { transaction_id: u32, reason: String },

    /// No acknowledgement arrived in time.
    #[error("message {transaction_id} was not acknowledged in time")]
    Timeout { transaction_id: u32 },

    /// The host went away before answering.
    #[error("host disconnected")]
    Disconnected,

    /// Writing to the host failed.
    #[error("host I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The outgoing frame could not be serialized.
    #[error("frame serialization error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Acknowledgement of a delivered app message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageAck {
    pub transaction_id: u32,
}

/// Host runtime capabilities used by the relay.
#[async_trait]
pub trait Host: Send + Sync {
    /// Open an external URL, typically the settings form.
    async fn open_url(&self, url: &Url) -> Result<(), HostError>;

    /// Send a key-value message to the paired watch app.
    ///
    /// Resolves once the watch acknowledged the message.
    async fn send_app_message(&self, message: AppMessage) -> Result<MessageAck, HostError>;
}
