//! # Error Types
//!
//! Custom error types for DShot Link using `thiserror`.

use thiserror::Error;

/// Main error type for DShot Link
#[derive(Debug, Error)]
pub enum DshotError {
    /// Transmitter hardware could not be configured; the controller is
    /// unusable until a later `install` succeeds
    #[error("Transmitter configuration failed: {0}")]
    Configuration(String),

    /// Operation called before `install` succeeded (or after `uninstall`)
    #[error("Channel not installed: call install() first")]
    NotInstalled,

    /// Throttle value outside the valid DShot range (48-2047)
    #[error("Throttle value {0} outside valid range 48..=2047")]
    InvalidThrottle(u16),

    /// Underlying transmitter failed or timed out; propagated verbatim,
    /// never retried
    #[error("Transmission failed: {0}")]
    Transmission(String),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DShot Link
pub type Result<T> = std::result::Result<T, DshotError>;
