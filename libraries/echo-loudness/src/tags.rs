//! ReplayGain tag reading
//!
//! Bridges tags written by external scanners into [`TrackLoudnessInfo`]:
//! - ID3v2 (MP3): TXXX frames with "REPLAYGAIN_*" descriptions
//! - Vorbis Comments (FLAC, OGG): REPLAYGAIN_* fields
//! - APE tags: REPLAYGAIN_* fields
//!
//! Tag gains are rebased from their reference loudness (ReplayGain 2.0's
//! -18 LUFS unless the file says otherwise) to the -16 LUFS reference the
//! gain model expects.

use crate::error::{LoudnessError, Result};
use crate::{TrackLoudnessInfo, REPLAYGAIN_REFERENCE_LUFS};
use lofty::{ItemKey, Probe, Tag, TaggedFileExt};
use std::path::Path;
use tracing::debug;

const REFERENCE_LOUDNESS_KEY: &str = "REPLAYGAIN_REFERENCE_LOUDNESS";

/// SPL references plausibly written by ReplayGain 1 scanners
const REPLAYGAIN_SPL_RANGE: std::ops::RangeInclusive<f64> = 80.0..=95.0;

/// 89 dB SPL maps to -14 LUFS
const SPL_TO_LUFS_OFFSET: f64 = 103.0;

/// ReplayGain tag values read from a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayGainTags {
    /// Track gain in dB
    pub track_gain: Option<f64>,
    /// Track peak (linear, 0.0-1.0+)
    pub track_peak: Option<f64>,
    /// Album gain in dB
    pub album_gain: Option<f64>,
    /// Album peak (linear, 0.0-1.0+)
    pub album_peak: Option<f64>,
    /// Reference loudness the gains were computed against
    pub reference_loudness: Option<f64>,
}

impl ReplayGainTags {
    /// Check if track-level tags are present
    pub fn has_track_tags(&self) -> bool {
        self.track_gain.is_some()
    }

    /// Check if album-level tags are present
    pub fn has_album_tags(&self) -> bool {
        self.album_gain.is_some()
    }

    /// Loudness info relative to the gain model's reference
    pub fn to_loudness_info(&self) -> TrackLoudnessInfo {
        let from_reference = self
            .reference_loudness
            .filter(|r| r.is_finite())
            .unwrap_or(REPLAYGAIN_REFERENCE_LUFS);

        TrackLoudnessInfo::new(self.track_gain, self.track_peak)
            .with_album(self.album_gain, self.album_peak)
            .rebased(from_reference)
    }

    fn merge_from(&mut self, tag: &Tag) {
        let read = |key: &ItemKey, parse: fn(&str) -> Option<f64>| {
            tag.get_string(key).and_then(parse)
        };

        if self.track_gain.is_none() {
            self.track_gain = read(&ItemKey::ReplayGainTrackGain, parse_gain);
        }
        if self.track_peak.is_none() {
            self.track_peak = read(&ItemKey::ReplayGainTrackPeak, parse_peak);
        }
        if self.album_gain.is_none() {
            self.album_gain = read(&ItemKey::ReplayGainAlbumGain, parse_gain);
        }
        if self.album_peak.is_none() {
            self.album_peak = read(&ItemKey::ReplayGainAlbumPeak, parse_peak);
        }
        if self.reference_loudness.is_none() {
            self.reference_loudness = read(
                &ItemKey::Unknown(REFERENCE_LOUDNESS_KEY.to_string()),
                parse_reference,
            );
        }
    }
}

/// Parse a gain value from a string (e.g., "-5.23 dB" -> -5.23)
pub fn parse_gain(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_suffix(" dB").unwrap_or(s);
    let s = s.strip_suffix("dB").unwrap_or(s);
    s.trim().parse::<f64>().ok().filter(|g| g.is_finite())
}

/// Parse a peak value from a string
fn parse_peak(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Parse a reference loudness ("-18.00 LUFS", "89 dB")
///
/// Old ReplayGain 1 files state the reference as an SPL of 89 dB, which
/// corresponds to roughly -14 LUFS. Other positive values are rejected so
/// the caller falls back to the ReplayGain 2.0 reference.
fn parse_reference(s: &str) -> Option<f64> {
    let s = s.trim();
    let level = match s.strip_suffix("LUFS") {
        Some(lufs) => lufs.trim().parse::<f64>().ok().filter(|l| l.is_finite())?,
        None => parse_gain(s)?,
    };

    if level <= 0.0 {
        Some(level)
    } else if REPLAYGAIN_SPL_RANGE.contains(&level) {
        Some(level - SPL_TO_LUFS_OFFSET)
    } else {
        None
    }
}

/// Read ReplayGain tags from an audio file
///
/// # Arguments
/// * `path` - Path to the audio file
///
/// # Returns
/// ReplayGain tag values, or empty struct if no tags found
pub fn read_replaygain_tags<P: AsRef<Path>>(path: P) -> Result<ReplayGainTags> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoudnessError::FileNotFound(path.display().to_string()));
    }

    let tagged_file = Probe::open(path)?.read()?;
    let mut tags = ReplayGainTags::default();

    // Primary tag first, remaining tags only fill gaps
    if let Some(tag) = tagged_file.primary_tag() {
        tags.merge_from(tag);
    }
    for tag in tagged_file.tags() {
        tags.merge_from(tag);
    }

    debug!(
        "Read ReplayGain tags from {:?}: track {:?} dB (peak {:?}), album {:?} dB",
        path, tags.track_gain, tags.track_peak, tags.album_gain
    );

    Ok(tags)
}
