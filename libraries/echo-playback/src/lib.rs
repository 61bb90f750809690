//! Echo - Playback Volume
//!
//! Applies loudness normalization to the outputs of a playback session.
//!
//! This crate provides:
//! - Output handle abstraction (`OutputHandle`, lock-free `SharedVolume`)
//! - Volume application: user volume × normalization gain, clamped to 0-1
//! - Dual-output registration for crossfade playback
//! - A controller that recomputes gain from the latest settings
//!
//! # Architecture
//!
//! `echo-playback` does not own the outputs. The playback engine registers
//! them and keeps them alive; this crate only writes their volume.
//!
//! ```text
//! Track change ──► NormalizationController ──► GainModel (echo-loudness)
//!                          │
//!                          ▼
//! Volume slider ──► VolumeApplier ──► OutputHandle(s).set_volume()
//! ```
//!
//! # Example
//!
//! ```rust
//! use echo_loudness::{NormalizationSettings, TrackLoudnessInfo};
//! use echo_playback::{NormalizationController, OutputHandle, SharedVolume};
//!
//! let current = SharedVolume::default();
//! let next = SharedVolume::default();
//!
//! let mut controller = NormalizationController::new(NormalizationSettings::default());
//! controller.register_audio_elements(Some(current.handle()), Some(next.handle()));
//!
//! // Track with no loudness data: unity gain
//! controller.apply_gain(Some(&TrackLoudnessInfo::default()));
//! controller.set_user_volume(0.5);
//! assert_eq!(current.volume(), 0.5);
//! assert_eq!(next.volume(), 0.5);
//! ```

mod controller;
mod error;
mod output;
mod volume;

// Public exports
pub use controller::NormalizationController;
pub use error::{PlaybackError, Result};
pub use output::{OutputHandle, SharedOutput, SharedVolume};
pub use volume::{VolumeApplier, DEFAULT_USER_VOLUME};
