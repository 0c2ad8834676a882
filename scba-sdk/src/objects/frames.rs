//! Frames exchanged with the host runtime over stdio.
//!
//! The bridge talks to the phone-side host through line-delimited JSON.
//! Each line is one internally-tagged object, dispatched on its `"type"`
//! field.
//!
//! # Protocol
//!
//! 1. The host sends [`InboundFrame::Ready`] once its runtime is up.
//! 2. When the user asks for the settings page the host sends
//!    [`InboundFrame::ShowConfiguration`]; the bridge answers with
//!    [`OutboundFrame::OpenUrl`].
//! 3. When the settings web view closes the host sends
//!    [`InboundFrame::WebviewClosed`]; the bridge answers with two
//!    [`OutboundFrame::AppMessage`] frames.
//! 4. The host acknowledges each app message with [`InboundFrame::Ack`]
//!    or [`InboundFrame::Nack`], echoing its `transaction_id`.

use serde::{Deserialize, Serialize};
use url::Url;

use super::message::AppMessage;

/// Host-to-bridge frame.
///
/// ```json
/// {"type":"ready"}
/// {"type":"show_configuration"}
/// {"type":"webview_closed","response":"%7B%22breath_rate%22%3A50%7D"}
/// {"type":"ack","transaction_id":1}
/// {"type":"nack","transaction_id":2,"error":"APP_MSG_BUSY"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// The host runtime is ready to relay messages.
    Ready,
    /// The user opened the app's settings page.
    ShowConfiguration,
    /// The settings web view closed.
    WebviewClosed {
        /// URL-encoded JSON produced by the form. Missing when the web
        /// view was dismissed without submitting.
        #[serde(default)]
        response: String,
    },
    /// The watch accepted an app message.
    Ack { transaction_id: u32 },
    /// The watch rejected an app message, or it could not be delivered.
    Nack {
        transaction_id: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Bridge-to-host frame.
///
/// ```json
/// {"type":"open_url","url":"https://example.com/settings"}
/// {"type":"app_message","transaction_id":1,"payload":{"SCBA_STORE_KEY_BREATHING_RATE":50}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Open an external URL in the host's browser or web view.
    OpenUrl { url: Url },
    /// Deliver a key-value message to the watch app.
    AppMessage {
        transaction_id: u32,
        payload: AppMessage,
    },
}
