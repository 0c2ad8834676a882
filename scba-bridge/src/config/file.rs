//! TOML file configuration structures.
//!
//! These structs directly map to the `scba-bridge.toml` file format. Every
//! section and field is optional.

use scba_sdk::SETTINGS_FORM_URL;
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub relay: RelayConfig,
    pub host: HostConfig,
    pub log: LogConfig,
}

/// Relay configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// The settings form opened on a configuration request.
    pub form_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            form_url: SETTINGS_FORM_URL.to_string(),
        }
    }
}

/// Host adapter configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// How long to wait for the watch to acknowledge an app message.
    pub ack_timeout_ms: u64,
}

fn default_ack_timeout_ms() -> u64 {
    10_000
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: default_ack_timeout_ms(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive. `RUST_LOG` takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}
