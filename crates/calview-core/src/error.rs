//! Configuration error types.
//!
//! Errors carry enough context for logs; `user_message()` gives the short
//! text shown to whoever runs the preview tool.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, reading, writing or validating the config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory could not be determined")]
    NoConfigDir,

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NoConfigDir => "No configuration directory available. Pass --config.",
            ConfigError::Read { .. } => "Configuration file could not be read.",
            ConfigError::Write { .. } => "Configuration file could not be saved.",
            ConfigError::Parse(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Serialize(_) => "Configuration could not be saved.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}
