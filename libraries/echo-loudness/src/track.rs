//! Per-track loudness metadata as attached by the library scanner

use crate::{GainSource, REFERENCE_LUFS};
use serde::{Deserialize, Serialize};

/// Loudness data for a single track
///
/// Gains are in dB relative to [`REFERENCE_LUFS`]. Peaks are linear
/// fractions of full scale (values above 1.0 are possible for inter-sample
/// peaks). Any field may be absent; absence of the selected gain means
/// no normalization is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackLoudnessInfo {
    /// Track gain in dB
    pub gain_db: Option<f64>,
    /// Track peak (linear)
    pub peak_linear: Option<f64>,
    /// Album gain in dB
    #[serde(default)]
    pub album_gain_db: Option<f64>,
    /// Album peak (linear)
    #[serde(default)]
    pub album_peak_linear: Option<f64>,
}

impl TrackLoudnessInfo {
    /// Track-level loudness data without album values
    pub fn new(gain_db: Option<f64>, peak_linear: Option<f64>) -> Self {
        Self {
            gain_db,
            peak_linear,
            album_gain_db: None,
            album_peak_linear: None,
        }
    }

    /// Attach album-level gain and peak
    pub fn with_album(mut self, album_gain_db: Option<f64>, album_peak_linear: Option<f64>) -> Self {
        self.album_gain_db = album_gain_db;
        self.album_peak_linear = album_peak_linear;
        self
    }

    /// Re-express gains computed against `from_reference_lufs` relative to
    /// [`REFERENCE_LUFS`]
    ///
    /// A track normalized to -18 LUFS is 2 dB quieter than one normalized
    /// to -16 LUFS, so rebasing from -18 adds 2 dB. Peaks are unchanged.
    pub fn rebased(self, from_reference_lufs: f64) -> Self {
        let shift = REFERENCE_LUFS - from_reference_lufs;
        Self {
            gain_db: self.gain_db.map(|g| g + shift),
            album_gain_db: self.album_gain_db.map(|g| g + shift),
            ..self
        }
    }

    /// Gain and peak for the requested source
    ///
    /// Album mode prefers album values and falls back to the track's.
    /// The album peak is only used together with the album gain.
    pub fn select(&self, source: GainSource) -> (Option<f64>, Option<f64>) {
        match source {
            GainSource::Track => (self.gain_db, self.peak_linear),
            GainSource::Album => match self.album_gain_db {
                Some(gain) => (Some(gain), self.album_peak_linear.or(self.peak_linear)),
                None => (self.gain_db, self.peak_linear),
            },
        }
    }

    /// Whether any gain value is present
    pub fn has_gain(&self) -> bool {
        self.gain_db.is_some() || self.album_gain_db.is_some()
    }
}
