//! Gain model for playback normalization
//!
//! Maps stored track loudness plus the user's settings to an attenuation
//! multiplier.
//!
//! # Gain Calculation
//!
//! - Adjusted = stored gain + (target - reference)
//! - No boost: adjusted is capped at 0 dB
//! - Clipping prevention: adjusted + peak_db must stay at or below -1 dBTP
//! - Floor: adjusted never drops below -200 dB, so the multiplier stays positive
//!
//! All conversions use the amplitude convention: `dB = 20 * log10(linear)`.

use crate::{
    NormalizationSettings, TrackLoudnessInfo, HEADROOM_DBTP, MIN_GAIN_DB, REFERENCE_LUFS,
};
use tracing::{debug, trace, warn};

/// Convert a dB value to a linear amplitude multiplier
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude to dB
///
/// Returns negative infinity for zero.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * linear.log10()
}

/// Result of a gain calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainResult {
    /// Final gain in dB after target adjustment and limiting
    pub gain_db: f64,
    /// Linear multiplier, `10^(gain_db / 20)`
    pub gain_linear: f64,
    /// Whether the no-boost or clipping rule altered the gain
    pub was_limited: bool,
}

impl GainResult {
    /// No normalization applied
    pub const IDENTITY: Self = Self {
        gain_db: 0.0,
        gain_linear: 1.0,
        was_limited: false,
    };

    fn from_db(gain_db: f64, was_limited: bool) -> Self {
        Self {
            gain_db,
            gain_linear: db_to_linear(gain_db),
            was_limited,
        }
    }
}

impl Default for GainResult {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Stateless calculator for normalization gain
///
/// Holds the reference loudness that stored gains were computed against and
/// the peak headroom. Settings are passed on every call, so a settings
/// change is reflected by the next calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainModel {
    reference_lufs: f64,
    headroom_dbtp: f64,
}

impl GainModel {
    /// Model with the default reference (-16 LUFS) and headroom (-1 dBTP)
    pub const fn new() -> Self {
        Self {
            reference_lufs: REFERENCE_LUFS,
            headroom_dbtp: HEADROOM_DBTP,
        }
    }

    /// Highest gain that keeps `peak_linear` at or below the headroom
    ///
    /// `None` when the peak is zero, negative or non-finite.
    pub fn max_allowed_gain_db(&self, peak_linear: f64) -> Option<f64> {
        if peak_linear.is_finite() && peak_linear > 0.0 {
            Some(self.headroom_dbtp - linear_to_db(peak_linear))
        } else {
            None
        }
    }

    /// Calculate the normalization gain for a track
    pub fn calculate(
        &self,
        track: Option<&TrackLoudnessInfo>,
        settings: &NormalizationSettings,
    ) -> GainResult {
        if !settings.enabled {
            return GainResult::IDENTITY;
        }

        let Some(track) = track else {
            return GainResult::IDENTITY;
        };

        let (stored_gain_db, peak_linear) = track.select(settings.gain_source);
        let Some(stored_gain_db) = stored_gain_db.filter(|g| g.is_finite()) else {
            trace!("No usable gain data, skipping normalization");
            return GainResult::IDENTITY;
        };

        if !settings.target_lufs.is_finite() {
            warn!(
                "Non-finite target loudness {}, skipping normalization",
                settings.target_lufs
            );
            return GainResult::IDENTITY;
        }

        let mut adjusted = stored_gain_db + (settings.target_lufs - self.reference_lufs);
        let mut was_limited = false;

        // Only ever attenuate
        if adjusted > 0.0 {
            debug!("Gain of {:.2} dB would boost, clamping to 0 dB", adjusted);
            adjusted = 0.0;
            was_limited = true;
        }

        if settings.prevent_clipping {
            if let Some(max_allowed) = peak_linear.and_then(|p| self.max_allowed_gain_db(p)) {
                if adjusted > max_allowed {
                    debug!(
                        "Limiting gain from {:.2} dB to {:.2} dB to preserve peak headroom",
                        adjusted, max_allowed
                    );
                    adjusted = max_allowed;
                    was_limited = true;
                }
            }
        }

        // 10^(dB/20) underflows to zero far below this
        if adjusted < MIN_GAIN_DB {
            debug!(
                "Gain of {:.2} dB below floor, clamping to {} dB",
                adjusted, MIN_GAIN_DB
            );
            adjusted = MIN_GAIN_DB;
            was_limited = true;
        }

        GainResult::from_db(adjusted, was_limited)
    }
}

impl Default for GainModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate the normalization gain with the default [`GainModel`]
pub fn calculate_gain(
    track: Option<&TrackLoudnessInfo>,
    settings: &NormalizationSettings,
) -> GainResult {
    GainModel::new().calculate(track, settings)
}
