//! Configuration management for peershare
//!
//! Handles loading configuration from ~/.config/peershare/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::session::{DEFAULT_PORT, DEFAULT_TOKEN_LENGTH};

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Application name for config directory
const APP_NAME: &str = "peershare";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Default port for the web server (used when --port is not given)
    #[serde(default)]
    pub default_port: Option<u16>,

    /// Length of generated access tokens
    #[serde(default)]
    pub token_length: Option<usize>,
}

impl Config {
    /// Get the config file path
    ///
    /// Returns ~/.config/peershare/config.toml on Linux/macOS
    pub fn config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Get effective port: CLI argument, then config, then default
    pub fn effective_port(&self, cli_port: Option<u16>) -> u16 {
        cli_port.or(self.default_port).unwrap_or(DEFAULT_PORT)
    }

    /// Get effective token length: config, then default
    pub fn effective_token_length(&self) -> usize {
        self.token_length.unwrap_or(DEFAULT_TOKEN_LENGTH)
    }
}
