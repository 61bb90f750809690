//! End-to-end tests for the normalization controller
//!
//! Drives the controller the way a player does: register outputs, change
//! tracks, move the volume slider, flip settings.

use echo_loudness::{GainSource, NormalizationSettings, TrackLoudnessInfo};
use echo_playback::{NormalizationController, OutputHandle, SharedOutput, SharedVolume};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Output that records every volume write
#[derive(Default)]
struct RecordingOutput {
    writes: Mutex<Vec<f64>>,
}

impl RecordingOutput {
    fn writes(&self) -> Vec<f64> {
        self.writes.lock().unwrap().clone()
    }
}

impl OutputHandle for RecordingOutput {
    fn set_volume(&self, volume: f64) {
        self.writes.lock().unwrap().push(volume);
    }

    fn volume(&self) -> f64 {
        self.writes.lock().unwrap().last().copied().unwrap_or(1.0)
    }
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn user_volume_after_unity_gain() {
    init_logging();
    let output = SharedVolume::default();
    let mut controller = NormalizationController::default();
    controller.register_audio_elements(Some(output.handle()), None);

    let result = controller.apply_gain(Some(&TrackLoudnessInfo::new(Some(0.0), None)));
    assert_eq!(result.gain_linear, 1.0);

    controller.set_user_volume(0.5);
    assert_eq!(output.volume(), 0.5);
}

#[test]
fn track_changes_update_both_outputs() {
    init_logging();
    let current = SharedVolume::default();
    let next = SharedVolume::default();
    let mut controller = NormalizationController::default();
    controller.register_audio_elements(Some(current.handle()), Some(next.handle()));

    // -2 dB, peak well under the ceiling
    let quiet = TrackLoudnessInfo::new(Some(-2.0), Some(0.7));
    let result = controller.apply_gain(Some(&quiet));
    assert_close(result.gain_linear, 0.794, 0.001);
    assert_close(current.volume(), 0.7 * result.gain_linear, 1e-12);
    assert_close(next.volume(), 0.7 * result.gain_linear, 1e-12);

    // Hot master, limited by its peak
    let hot = TrackLoudnessInfo::new(Some(0.0), Some(1.0));
    let result = controller.apply_gain(Some(&hot));
    assert!(result.was_limited);
    assert_close(result.gain_db, -1.0, 1e-9);
    assert_close(current.volume(), 0.7 * result.gain_linear, 1e-12);

    // No loudness data
    let result = controller.apply_gain(Some(&TrackLoudnessInfo::default()));
    assert!(!result.was_limited);
    assert_close(current.volume(), 0.7, 1e-12);
}

#[test]
fn volume_slider_keeps_gain() {
    init_logging();
    let output = SharedVolume::default();
    let mut controller = NormalizationController::default();
    controller.register_audio_elements(Some(output.handle()), None);

    let result = controller.apply_gain(Some(&TrackLoudnessInfo::new(Some(-6.0), None)));

    for volume in [0.0, 0.25, 0.9, 1.0] {
        controller.set_user_volume(volume);
        assert_close(output.volume(), volume * result.gain_linear, 1e-12);
        // Gain is reported without the user volume
        assert_eq!(controller.current_gain(), result.gain_linear);
    }
}

#[test]
fn registration_alone_writes_nothing() {
    init_logging();
    let recorder = Arc::new(RecordingOutput::default());
    let mut controller = NormalizationController::default();
    controller.register_audio_elements(Some(recorder.clone() as SharedOutput), None);

    assert!(recorder.writes().is_empty());

    controller.set_user_volume(0.4);
    controller.apply_gain(None);
    assert_eq!(recorder.writes(), vec![0.4, 0.4]);
}

#[test]
fn settings_flip_between_tracks() {
    init_logging();
    let output = SharedVolume::default();
    let mut controller = NormalizationController::default();
    controller.register_audio_elements(Some(output.handle()), None);
    let track = TrackLoudnessInfo::new(Some(-8.0), Some(0.3));

    let default_result = controller.apply_gain(Some(&track));
    assert_close(default_result.gain_db, -8.0, 1e-9);

    controller.set_settings(NormalizationSettings::with_target(-14.0));
    let streaming = controller.apply_gain(Some(&track));
    assert_close(streaming.gain_db, -6.0, 1e-9);

    controller.set_settings(NormalizationSettings::disabled());
    let disabled = controller.apply_gain(Some(&track));
    assert_eq!(disabled.gain_linear, 1.0);
    assert_close(output.volume(), 0.7, 1e-12);
}

#[test]
fn album_mode_keeps_album_relative_levels() {
    init_logging();
    let mut controller = NormalizationController::new(NormalizationSettings {
        gain_source: GainSource::Album,
        prevent_clipping: false,
        ..NormalizationSettings::default()
    });

    let quiet_song = TrackLoudnessInfo::new(Some(-2.0), None).with_album(Some(-5.0), None);
    let loud_song = TrackLoudnessInfo::new(Some(-9.0), None).with_album(Some(-5.0), None);

    let a = controller.apply_gain(Some(&quiet_song));
    let b = controller.apply_gain(Some(&loud_song));
    assert_eq!(a.gain_db, b.gain_db);
    assert_close(a.gain_db, -5.0, 1e-9);
}

#[test]
fn no_outputs_registered_is_harmless() {
    init_logging();
    let mut controller = NormalizationController::default();
    let result = controller.apply_gain(Some(&TrackLoudnessInfo::new(Some(-3.0), None)));
    controller.set_user_volume(0.9);

    assert_close(controller.effective_volume(), 0.9 * result.gain_linear, 1e-12);
}

#[test]
fn tagged_track_rebased_before_gain() {
    init_logging();
    let tags = echo_loudness::ReplayGainTags {
        track_gain: Some(-7.0),
        track_peak: Some(0.5),
        ..Default::default()
    };
    let controller = NormalizationController::default();

    // ReplayGain 2.0 gain against -18 LUFS is 2 dB hotter against -16 LUFS
    let result = controller.calculate_gain(Some(&tags.to_loudness_info()));
    assert_close(result.gain_db, -5.0, 1e-9);
}
