//! Normalization controller
//!
//! Owns the latest settings and the volume applier for one playback session.
//! Settings are read on every calculation; nothing derived from an older
//! settings value is reused.

use crate::error::Result;
use crate::output::SharedOutput;
use crate::volume::VolumeApplier;
use echo_loudness::{GainModel, GainResult, NormalizationSettings, TrackLoudnessInfo};
use tracing::debug;

/// Loudness normalization for a playback session
///
/// # Example
///
/// ```
/// use echo_loudness::{NormalizationSettings, TrackLoudnessInfo};
/// use echo_playback::{NormalizationController, OutputHandle, SharedVolume};
///
/// let output = SharedVolume::default();
/// let mut controller = NormalizationController::new(NormalizationSettings::default());
/// controller.register_audio_elements(Some(output.handle()), None);
///
/// let track = TrackLoudnessInfo::new(Some(-6.0), Some(0.5));
/// controller.apply_gain(Some(&track));
/// assert!(output.volume() < 0.7);
/// ```
#[derive(Debug)]
pub struct NormalizationController {
    settings: NormalizationSettings,
    model: GainModel,
    applier: VolumeApplier,
    last_result: GainResult,
}

impl NormalizationController {
    /// Create a controller with the default user volume
    pub fn new(settings: NormalizationSettings) -> Self {
        Self::with_applier(settings, VolumeApplier::default())
    }

    /// Create a controller around an existing applier
    pub fn with_applier(settings: NormalizationSettings, applier: VolumeApplier) -> Self {
        Self {
            settings,
            model: GainModel::new(),
            applier,
            last_result: GainResult::IDENTITY,
        }
    }

    /// Replace the settings
    ///
    /// Takes effect on the next [`calculate_gain`](Self::calculate_gain) or
    /// [`apply_gain`](Self::apply_gain). Outputs are not touched until then.
    pub fn set_settings(&mut self, settings: NormalizationSettings) {
        if settings != self.settings {
            debug!(
                "Normalization settings changed: enabled={}, target={} LUFS, prevent_clipping={}",
                settings.enabled, settings.target_lufs, settings.prevent_clipping
            );
        }
        self.settings = settings;
    }

    /// Validate and replace the settings
    pub fn try_set_settings(&mut self, settings: NormalizationSettings) -> Result<()> {
        settings.validate()?;
        self.set_settings(settings);
        Ok(())
    }

    /// Current settings
    pub fn settings(&self) -> &NormalizationSettings {
        &self.settings
    }

    /// Gain for a track under the current settings, without applying it
    pub fn calculate_gain(&self, track: Option<&TrackLoudnessInfo>) -> GainResult {
        self.model.calculate(track, &self.settings)
    }

    /// Calculate and apply the gain for a track
    ///
    /// `None` resets the gain to unity and leaves the user volume alone.
    pub fn apply_gain(&mut self, track: Option<&TrackLoudnessInfo>) -> GainResult {
        let result = self.calculate_gain(track);

        if result.was_limited {
            debug!(
                "Applying limited normalization gain: {:.2} dB ({:.4})",
                result.gain_db, result.gain_linear
            );
        }

        self.applier.apply_gain_linear(result.gain_linear);
        self.last_result = result;
        result
    }

    /// Set the user volume (0.0-1.0) and re-apply with the last gain
    pub fn set_user_volume(&mut self, volume: f64) {
        self.applier.set_user_volume(volume);
    }

    /// Set the user volume, rejecting values outside 0.0-1.0
    pub fn try_set_user_volume(&mut self, volume: f64) -> Result<()> {
        self.applier.try_set_user_volume(volume)
    }

    /// User volume (0.0-1.0)
    pub fn user_volume(&self) -> f64 {
        self.applier.user_volume()
    }

    /// Last applied normalization multiplier, independent of user volume
    pub fn current_gain(&self) -> f64 {
        self.applier.current_gain()
    }

    /// Volume currently written to the outputs
    pub fn effective_volume(&self) -> f64 {
        self.applier.effective_volume()
    }

    /// Result of the last [`apply_gain`](Self::apply_gain)
    pub fn last_result(&self) -> GainResult {
        self.last_result
    }

    /// Register up to two outputs (two for crossfade)
    pub fn register_audio_elements(
        &mut self,
        primary: Option<SharedOutput>,
        secondary: Option<SharedOutput>,
    ) {
        self.applier.register_audio_elements(primary, secondary);
    }
}

impl Default for NormalizationController {
    fn default() -> Self {
        Self::new(NormalizationSettings::default())
    }
}
