//! Normalization settings
//!
//! Owned by the preferences store and handed to the gain model on every
//! calculation. Loading from a config file or the environment is provided
//! for hosts that keep these outside the preferences store.

use crate::error::{LoudnessError, Result};
use crate::{DEFAULT_TARGET_LUFS, MAX_TARGET_LUFS, MIN_TARGET_LUFS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for settings overrides
const ENV_PREFIX: &str = "ECHO_NORMALIZATION";

/// Which stored gain the model normalizes with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GainSource {
    /// Per-track gain
    #[default]
    Track,
    /// Album gain, falling back to track gain when the album has none
    Album,
}

impl GainSource {
    /// Parse from string (for settings persistence)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "track" | "replaygain_track" | "rg_track" => Some(Self::Track),
            "album" | "replaygain_album" | "rg_album" => Some(Self::Album),
            _ => None,
        }
    }

    /// Convert to string for settings persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
        }
    }
}

/// User-configured loudness normalization settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizationSettings {
    /// Master toggle
    pub enabled: bool,
    /// Desired integrated loudness in LUFS
    pub target_lufs: f64,
    /// Cap gain so the track peak stays below -1 dBTP
    pub prevent_clipping: bool,
    /// Track or album gain
    pub gain_source: GainSource,
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            target_lufs: DEFAULT_TARGET_LUFS,
            prevent_clipping: true,
            gain_source: GainSource::Track,
        }
    }
}

/// Flat, lowercase view of the settings as the `config` crate sees them
///
/// `config` lowercases keys, so camelCase names would not survive the trip.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct SettingsSource {
    enabled: bool,
    target_lufs: f64,
    prevent_clipping: bool,
    gain_source: String,
}

impl Default for SettingsSource {
    fn default() -> Self {
        let defaults = NormalizationSettings::default();
        Self {
            enabled: defaults.enabled,
            target_lufs: defaults.target_lufs,
            prevent_clipping: defaults.prevent_clipping,
            gain_source: defaults.gain_source.as_str().to_string(),
        }
    }
}

impl SettingsSource {
    fn into_settings(self) -> Result<NormalizationSettings> {
        let gain_source = GainSource::from_str(&self.gain_source)
            .ok_or(LoudnessError::UnknownGainSource(self.gain_source))?;

        Ok(NormalizationSettings {
            enabled: self.enabled,
            target_lufs: self.target_lufs,
            prevent_clipping: self.prevent_clipping,
            gain_source,
        })
    }
}

impl NormalizationSettings {
    /// Settings with normalization turned off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Default settings with a different target
    pub fn with_target(target_lufs: f64) -> Self {
        Self {
            target_lufs,
            ..Self::default()
        }
    }

    /// Check that the target loudness is usable
    pub fn validate(&self) -> Result<()> {
        if !self.target_lufs.is_finite()
            || !(MIN_TARGET_LUFS..=MAX_TARGET_LUFS).contains(&self.target_lufs)
        {
            return Err(LoudnessError::InvalidTarget(self.target_lufs));
        }
        Ok(())
    }

    /// Load settings from an optional TOML file and the environment
    ///
    /// Sources are layered: defaults, then the file (if given), then
    /// `ECHO_NORMALIZATION_*` variables (e.g. `ECHO_NORMALIZATION_TARGET_LUFS=-14`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(LoudnessError::FileNotFound(path.display().to_string()));
            }
            builder = builder.add_source(
                config::File::from(path.to_path_buf()).format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let source: SettingsSource = builder.build()?.try_deserialize()?;
        let settings = source.into_settings()?;
        settings.validate()?;

        debug!(
            "Loaded normalization settings: enabled={}, target={} LUFS, prevent_clipping={}, source={}",
            settings.enabled,
            settings.target_lufs,
            settings.prevent_clipping,
            settings.gain_source.as_str()
        );

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = NormalizationSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.target_lufs, -16.0);
        assert!(settings.prevent_clipping);
        assert_eq!(settings.gain_source, GainSource::Track);
    }

    #[test]
    fn test_gain_source_parsing() {
        assert_eq!(GainSource::from_str("track"), Some(GainSource::Track));
        assert_eq!(GainSource::from_str("ALBUM"), Some(GainSource::Album));
        assert_eq!(GainSource::from_str(" rg_album "), Some(GainSource::Album));
        assert_eq!(GainSource::from_str("loudest"), None);

        for source in [GainSource::Track, GainSource::Album] {
            assert_eq!(GainSource::from_str(source.as_str()), Some(source));
        }
    }

    #[test]
    fn test_validate_target_range() {
        assert!(NormalizationSettings::with_target(-14.0).validate().is_ok());
        assert!(NormalizationSettings::with_target(0.0).validate().is_ok());
        assert!(matches!(
            NormalizationSettings::with_target(3.0).validate(),
            Err(LoudnessError::InvalidTarget(_))
        ));
        assert!(NormalizationSettings::with_target(-90.0).validate().is_err());
        assert!(NormalizationSettings::with_target(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_source_conversion_rejects_unknown_gain_source() {
        let source = SettingsSource {
            gain_source: "loudest".to_string(),
            ..SettingsSource::default()
        };
        assert!(matches!(
            source.into_settings(),
            Err(LoudnessError::UnknownGainSource(name)) if name == "loudest"
        ));
    }

    #[test]
    fn test_disabled() {
        let settings = NormalizationSettings::disabled();
        assert!(!settings.enabled);
        assert_eq!(settings.target_lufs, -16.0);
    }
}
