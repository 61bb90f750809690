//! Error types for playback volume control

use echo_loudness::LoudnessError;
use thiserror::Error;

/// Playback errors
///
/// The normalization path never fails; these come from the fallible
/// entry points that validate caller input.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Volume outside 0.0-1.0 or not a number
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f64),

    /// Loudness settings error
    #[error("Loudness error: {0}")]
    Loudness(#[from] LoudnessError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
