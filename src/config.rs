//! Configuration module for input-guard
//!
//! Configuration is supplied as JSON bytes by the embedding program.
//! Every field has a default so an empty object `{}` is a valid config.

use serde::Deserialize;
use thiserror::Error;

/// Guard configuration
#[derive(Clone, Debug, Deserialize)]
pub struct GuardConfig {
    /// Capacity of the line buffer in bytes, terminator included
    #[serde(default = "default_input_capacity")]
    pub input_capacity: usize,

    /// Whether gate decisions and truncations emit audit events
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,

    /// Whether audit events carry the matched operand text
    #[serde(default = "default_log_operands")]
    pub log_operands: bool,
}

fn default_input_capacity() -> usize {
    20
}

fn default_audit_enabled() -> bool {
    true
}

fn default_log_operands() -> bool {
    true
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            input_capacity: default_input_capacity(),
            audit_enabled: default_audit_enabled(),
            log_operands: default_log_operands(),
        }
    }
}

impl GuardConfig {
    /// Parse configuration from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config_str =
            std::str::from_utf8(bytes).map_err(|e| ConfigError::InvalidUtf8(e.to_string()))?;

        Self::from_json_str(config_str)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(config_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(config_str).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the reader cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Configuration parsing errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("input_capacity must be at least 1")]
    ZeroCapacity,
}
