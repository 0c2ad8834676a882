//! Decoding of the settings web view response.
//!
//! The hosted form returns its settings as a JSON object, percent-encoded
//! so that it survives being passed back through the web view's return URL:
//!
//! ```text
//! %7B%22breath_rate%22%3A50%2C%22type1%22%3Atrue%7D  ->  {"breath_rate":50,"type1":true}
//! ```

use crate::objects::settings::SettingsPayload;

/// Errors produced while decoding a web view response.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The percent-decoded bytes are not valid UTF-8.
    #[error("invalid percent-encoding: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The decoded text is not JSON.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the `response` string handed back by the settings web view.
///
/// An empty response (the web view was dismissed) is a JSON error. Valid
/// JSON that is not an object has none of the form's fields and decodes to
/// an empty payload.
pub fn decode_webview_response(response: &str) -> Result<SettingsPayload, PayloadError> {
    let decoded = urlencoding::decode(response)?;
    let value: serde_json::Value = serde_json::from_str(&decoded)?;
    if !value.is_object() {
        return Ok(SettingsPayload::default());
    }
    Ok(serde_json::from_value(value)?)
}

/// Encode a payload the way the settings form does.
pub fn encode_webview_response(payload: &SettingsPayload) -> Result<String, PayloadError> {
    let json = serde_json::to_string(payload)?;
    Ok(urlencoding::encode(&json).into_owned())
}
