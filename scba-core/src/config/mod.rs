//! Runtime configuration for the relay.
//!
//! The file format and loading live in the bridge binary; this is the
//! validated form handed to [`ConfigRelay`](crate::relay::ConfigRelay).

use scba_sdk::SETTINGS_FORM_URL;
use url::Url;

/// Configuration of a [`ConfigRelay`](crate::relay::ConfigRelay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Page opened when the user asks for the settings page.
    pub form_url: Url,
}

impl RelayConfig {
    pub fn new(form_url: Url) -> Self {
        Self { form_url }
    }

    /// The built-in settings form address.
    #[allow(clippy::expect_used)]
    pub fn default_form_url() -> Url {
        Url::parse(SETTINGS_FORM_URL).expect("SETTINGS_FORM_URL is a valid URL")
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new(Self::default_form_url())
    }
}
