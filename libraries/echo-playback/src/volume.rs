//! Volume application
//!
//! Combines the user's volume with the normalization gain and pushes the
//! result to the registered outputs.
//! Effective volume = clamp(user volume × normalization gain, 0, 1).

use crate::error::{PlaybackError, Result};
use crate::output::SharedOutput;
use tracing::{trace, warn};

/// Default user volume (0.0-1.0)
pub const DEFAULT_USER_VOLUME: f64 = 0.7;

/// Applies user volume × normalization gain to up to two outputs
///
/// Two slots support crossfading between a current and a next output.
/// Either slot may be empty.
pub struct VolumeApplier {
    /// User-set volume (0.0-1.0)
    user_volume: f64,

    /// Last normalization multiplier, (0.0, 1.0]
    gain_linear: f64,

    /// Registered outputs
    primary: Option<SharedOutput>,
    secondary: Option<SharedOutput>,
}

impl VolumeApplier {
    /// Create an applier at the given user volume with unity gain
    pub fn new(user_volume: f64) -> Self {
        Self {
            user_volume: sanitize_volume(user_volume).unwrap_or(DEFAULT_USER_VOLUME),
            gain_linear: 1.0,
            primary: None,
            secondary: None,
        }
    }

    /// Register the outputs to drive
    ///
    /// Replaces any previous registration. Does not push a volume; the next
    /// gain or volume change does.
    pub fn register_audio_elements(
        &mut self,
        primary: Option<SharedOutput>,
        secondary: Option<SharedOutput>,
    ) {
        trace!(
            "Registered audio outputs (primary: {}, secondary: {})",
            primary.is_some(),
            secondary.is_some()
        );
        self.primary = primary;
        self.secondary = secondary;
    }

    /// Number of registered outputs
    pub fn output_count(&self) -> usize {
        usize::from(self.primary.is_some()) + usize::from(self.secondary.is_some())
    }

    /// Store a new normalization multiplier and push the effective volume
    ///
    /// Zero or negative multipliers (an underflowed attenuation) become the
    /// smallest positive gain. Non-finite multipliers fall back to unity.
    pub fn apply_gain_linear(&mut self, gain_linear: f64) {
        self.gain_linear = if !gain_linear.is_finite() {
            warn!("Ignoring non-finite normalization gain {}, using unity", gain_linear);
            1.0
        } else if gain_linear < f64::MIN_POSITIVE {
            trace!("Normalization gain {:e} below range, using minimum", gain_linear);
            f64::MIN_POSITIVE
        } else {
            gain_linear.min(1.0)
        };
        self.push();
    }

    /// Set the user volume and re-apply with the last known gain
    ///
    /// Out-of-range values are clamped; non-finite values are ignored.
    pub fn set_user_volume(&mut self, volume: f64) {
        match sanitize_volume(volume) {
            Some(volume) => {
                self.user_volume = volume;
                self.push();
            }
            None => warn!("Ignoring non-finite user volume {}", volume),
        }
    }

    /// Like [`set_user_volume`](Self::set_user_volume) but rejects anything
    /// outside 0.0-1.0
    pub fn try_set_user_volume(&mut self, volume: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        self.user_volume = volume;
        self.push();
        Ok(())
    }

    /// User volume (0.0-1.0)
    pub fn user_volume(&self) -> f64 {
        self.user_volume
    }

    /// Last normalization multiplier, independent of user volume
    pub fn current_gain(&self) -> f64 {
        self.gain_linear
    }

    /// Volume written to the outputs
    pub fn effective_volume(&self) -> f64 {
        (self.user_volume * self.gain_linear).clamp(0.0, 1.0)
    }

    fn push(&self) {
        let volume = self.effective_volume();
        for output in [&self.primary, &self.secondary].into_iter().flatten() {
            output.set_volume(volume);
        }
        trace!(
            "Applied output volume {:.4} (user {:.2} × gain {:.4})",
            volume, self.user_volume, self.gain_linear
        );
    }
}

impl Default for VolumeApplier {
    fn default() -> Self {
        Self::new(DEFAULT_USER_VOLUME)
    }
}

impl std::fmt::Debug for VolumeApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeApplier")
            .field("user_volume", &self.user_volume)
            .field("gain_linear", &self.gain_linear)
            .field("outputs", &self.output_count())
            .finish()
    }
}

fn sanitize_volume(volume: f64) -> Option<f64> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}
