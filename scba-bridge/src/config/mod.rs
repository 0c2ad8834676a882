//! Configuration module for scba-bridge.
//!
//! Handles loading configuration from a TOML file and CLI overrides.

pub mod file;

use crate::config::file::FileConfig;
use scba_core::RelayConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./scba-bridge.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid form url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub relay: RelayConfig,
    pub ack_timeout: Duration,
    pub log_filter: Option<String>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    form_url_override: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader.
    ///
    /// Without an explicit path, [`DEFAULT_CONFIG_PATH`] is read if it exists
    /// and built-in defaults are used otherwise.
    pub fn new(config_path: Option<impl AsRef<Path>>, form_url_override: Option<String>) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            form_url_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, if any
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = self.read_file()?;

        if let Some(form_url) = &self.form_url_override {
            file_config.relay.form_url = form_url.clone();
        }

        self.build_loaded_config(file_config)
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default_path.exists() {
                    return Ok(FileConfig::default());
                }
                default_path
            }
        };

        let config_content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&config_content)?)
    }

    fn build_loaded_config(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let form_url = Url::parse(&file_config.relay.form_url)?;
        if form_url.scheme() != "https" {
            return Err(ConfigError::ValidationError(format!(
                "form url must use https, got {}",
                form_url.scheme()
            )));
        }

        if file_config.host.ack_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "ack_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(LoadedConfig {
            relay: RelayConfig::new(form_url),
            ack_timeout: Duration::from_millis(file_config.host.ack_timeout_ms),
            log_filter: file_config.log.filter,
        })
    }
}
