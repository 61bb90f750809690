//! Loudness normalization for Echo playback
//!
//! This crate provides:
//! - The gain model: stored track gain + user target → attenuation multiplier
//! - Clipping prevention against a fixed -1 dBTP headroom
//! - Normalization settings with config file / environment loading
//! - ReplayGain tag reading as a bridge into [`TrackLoudnessInfo`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ TrackLoudnessInfo│ ──► │  GainModel   │ ──► │  GainResult  │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//!                                 ▲
//!                                 │
//!                      ┌──────────────────────┐
//!                      │ NormalizationSettings│
//!                      └──────────────────────┘
//! ```
//!
//! The gain model never boosts. Stored gains are relative to
//! [`REFERENCE_LUFS`]; the user's target shifts them before limiting.
//!
//! # Example
//!
//! ```
//! use echo_loudness::{calculate_gain, NormalizationSettings, TrackLoudnessInfo};
//!
//! let settings = NormalizationSettings::default();
//! let track = TrackLoudnessInfo::new(Some(-2.0), Some(0.7));
//!
//! let result = calculate_gain(Some(&track), &settings);
//! assert!((result.gain_db - (-2.0)).abs() < 1e-9);
//! assert!(!result.was_limited);
//! ```

mod error;
mod gain;
mod settings;
mod tags;
mod track;

pub use error::{LoudnessError, Result};
pub use gain::{calculate_gain, db_to_linear, linear_to_db, GainModel, GainResult};
pub use settings::{GainSource, NormalizationSettings};
pub use tags::{parse_gain, read_replaygain_tags, ReplayGainTags};
pub use track::TrackLoudnessInfo;

/// Reference loudness that stored track gains are computed against (-16 LUFS)
pub const REFERENCE_LUFS: f64 = -16.0;

/// Peak ceiling kept after gain is applied (-1 dBTP)
pub const HEADROOM_DBTP: f64 = -1.0;

/// Deepest attenuation the gain model returns (-200 dB, about 1e-10 linear)
///
/// Keeps the linear multiplier strictly positive for any finite stored gain.
pub const MIN_GAIN_DB: f64 = -200.0;

/// Streaming-service parity target (-14 LUFS)
pub const STREAMING_TARGET_LUFS: f64 = -14.0;

/// Default target, a little more conservative than streaming services
pub const DEFAULT_TARGET_LUFS: f64 = REFERENCE_LUFS;

/// ReplayGain 2.0 reference level (-18 LUFS)
///
/// Tags without an explicit reference loudness are assumed to use this.
pub const REPLAYGAIN_REFERENCE_LUFS: f64 = -18.0;

/// EBU R128 broadcast reference level (-23 LUFS)
pub const EBU_R128_BROADCAST_LUFS: f64 = -23.0;

/// Lowest accepted target loudness
pub const MIN_TARGET_LUFS: f64 = -70.0;

/// Highest accepted target loudness
pub const MAX_TARGET_LUFS: f64 = 0.0;
