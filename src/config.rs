//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Configuration carries the deployment-specific wiring (which pin and
//! hardware channel drive the ESC); protocol timings are fixed by the DShot
//! specification and are not configurable.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::dshot::protocol::CLOCK_DIVIDER;
use crate::error::{DshotError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub esc: EscConfig,
}

/// ESC wiring configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EscConfig {
    /// GPIO pin the DShot signal is emitted on
    #[serde(default = "default_pin")]
    pub pin: u8,

    /// Hardware transmission channel index
    #[serde(default = "default_channel")]
    pub channel: u8,

    /// Transmitter clock divider; 7 yields the 19-tick DShot bit period
    #[serde(default = "default_clock_divider")]
    pub clock_divider: u8,
}

fn default_pin() -> u8 {
    4
}

fn default_channel() -> u8 {
    0
}

fn default_clock_divider() -> u8 {
    CLOCK_DIVIDER
}

impl Default for EscConfig {
    fn default() -> Self {
        Self {
            pin: default_pin(),
            channel: default_channel(),
            clock_divider: default_clock_divider(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.esc.clock_divider == 0 {
            return Err(DshotError::Configuration(
                "clock_divider must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
