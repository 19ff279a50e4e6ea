// Unit tests for the RMS level meter.
//
// These verify the metering laws the visualization relies on: silence maps
// to exactly zero, constant amplitude maps to that amplitude, and gained
// readings are clamped to [0, 1].

use vox_capture::audio::{rms, LevelMeter};

#[test]
fn test_rms_of_silence_is_exactly_zero() {
    let samples = vec![0.0f32; 1024];
    assert_eq!(rms(&samples), 0.0);
}

#[test]
fn test_rms_of_empty_frame_is_zero() {
    assert_eq!(rms(&[]), 0.0);
}

#[test]
fn test_rms_of_constant_amplitude_equals_amplitude() {
    let samples = vec![0.5f32; 2048];
    assert!((rms(&samples) - 0.5).abs() < 1e-6);

    let negative = vec![-0.25f32; 2048];
    assert!((rms(&negative) - 0.25).abs() < 1e-6);
}

#[test]
fn test_rms_of_full_scale_is_one() {
    let samples = vec![1.0f32; 512];
    assert!((rms(&samples) - 1.0).abs() < 1e-6);
}

#[test]
fn test_meter_reading_applies_gain() {
    let meter = LevelMeter::new(2.0);
    let samples = vec![0.2f32; 1000];
    assert!((meter.reading(&samples) - 0.4).abs() < 1e-6);
}

#[test]
fn test_meter_reading_clamps_to_unit_range() {
    let meter = LevelMeter::new(3.0);
    let samples = vec![1.0f32; 1000];
    assert_eq!(meter.reading(&samples), 1.0);
}

#[test]
fn test_default_meter_has_unit_gain() {
    let meter = LevelMeter::default();
    let samples = vec![0.5f32; 1000];
    assert!((meter.reading(&samples) - 0.5).abs() < 1e-6);
}

#[test]
fn test_meter_reading_of_empty_frame_is_zero() {
    let meter = LevelMeter::new(10.0);
    assert_eq!(meter.reading(&[]), 0.0);
}
