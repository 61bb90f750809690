//! Error types for loudness settings and tag ingestion
//!
//! The gain path itself never fails; these only surface from settings
//! validation, config loading and tag reading.

use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur outside the gain calculation
#[derive(Error, Debug)]
pub enum LoudnessError {
    /// Target loudness is non-finite or out of range
    #[error("Invalid target loudness: {0} LUFS (must be between -70 and 0)")]
    InvalidTarget(f64),

    /// Unknown gain source name in persisted settings
    #[error("Unknown gain source: {0}")]
    UnknownGainSource(String),

    /// Configuration could not be built or deserialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tag reading error
    #[error("Failed to read audio tags: {0}")]
    TagReadError(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl From<lofty::error::LoftyError> for LoudnessError {
    fn from(err: lofty::error::LoftyError) -> Self {
        Self::TagReadError(err.to_string())
    }
}

impl From<config::ConfigError> for LoudnessError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
