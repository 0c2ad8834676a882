#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

//! Shared types for the SCBA tracker configuration bridge.
//!
//! Everything that crosses a process or device boundary lives here: the
//! settings payload returned by the hosted form, the storage keys the watch
//! firmware understands, the app message built from them, and the JSON
//! frames exchanged with the host runtime.

pub mod codec;
pub mod objects;

pub use codec::{PayloadError, decode_webview_response, encode_webview_response};

/// Address of the hosted settings form opened on a configuration request.
pub const SETTINGS_FORM_URL: &str =
    "https://www.googledrive.com/host/0B2O_EhizVtu7NUN0QkFUU3RKZHc";
