// Tests for the waveform ring buffer and its timer-driven sampler.
//
// The buffer must never exceed capacity and must evict oldest-first; the
// sampler must fill the buffer with the session's latest level reading at
// its own cadence.

mod common;

use common::{frame, ScriptedEngine, ScriptedProvider};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use vox_capture::audio::{WaveformRingBuffer, WaveformSampler};
use vox_capture::session::{AudioCaptureSession, CaptureConfig, StaticAuthorization};

#[test]
fn test_ring_buffer_bounded_by_capacity() {
    let mut buffer = WaveformRingBuffer::new(8);

    for i in 0..100 {
        buffer.push(i as f32 / 100.0);
        assert!(buffer.len() <= 8, "buffer exceeded capacity at push {}", i);
    }

    assert_eq!(buffer.len(), 8);
}

#[test]
fn test_ring_buffer_evicts_oldest_first() {
    let mut buffer = WaveformRingBuffer::new(3);

    for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
        buffer.push(value);
    }

    // Exactly the most recent `capacity` readings, in arrival order
    assert_eq!(buffer.snapshot(), vec![3.0, 4.0, 5.0]);
}

#[test]
fn test_ring_buffer_snapshot_preserves_arrival_order() {
    let mut buffer = WaveformRingBuffer::new(10);

    buffer.push(0.1);
    buffer.push(0.2);
    buffer.push(0.3);

    assert_eq!(buffer.snapshot(), vec![0.1, 0.2, 0.3]);
}

#[test]
fn test_ring_buffer_zero_capacity_clamped_to_one() {
    let mut buffer = WaveformRingBuffer::new(0);
    buffer.push(0.5);
    buffer.push(0.7);

    assert_eq!(buffer.capacity(), 1);
    assert_eq!(buffer.snapshot(), vec![0.7]);
}

#[test]
fn test_capacity_for_width() {
    // One reading per drawn bar
    assert_eq!(WaveformRingBuffer::capacity_for_width(320, 4), 80);
    // Narrow surfaces still hold at least one reading
    assert_eq!(WaveformRingBuffer::capacity_for_width(3, 4), 1);
    // Degenerate bar width is guarded
    assert_eq!(WaveformRingBuffer::capacity_for_width(320, 0), 320);
}

#[test]
fn test_ring_buffer_clear() {
    let mut buffer = WaveformRingBuffer::new(4);
    buffer.push(0.9);
    buffer.clear();

    assert!(buffer.is_empty());
    assert!(buffer.snapshot().is_empty());
}

#[tokio::test]
async fn test_sampler_tracks_session_level() {
    let temp_dir = TempDir::new().expect("temp dir");

    // Ten constant half-amplitude frames: RMS settles at 0.5
    let engine = ScriptedEngine::new(vec![frame(1600, 0.5); 10]);
    let provider = ScriptedProvider::silent();

    let session = AudioCaptureSession::new(
        Box::new(engine),
        Box::new(provider),
        Box::new(StaticAuthorization::granted()),
        CaptureConfig {
            recording_dir: PathBuf::from(temp_dir.path()),
            meter_gain: 1.0,
        },
    );

    let sampler = WaveformSampler::spawn(session.clone(), 40, Duration::from_millis(10));

    session.start().await.expect("start");
    tokio::time::sleep(Duration::from_millis(200)).await;

    let snapshot = sampler.snapshot();
    assert!(!snapshot.is_empty(), "sampler should have collected readings");
    assert!(snapshot.len() <= 40);
    assert!(
        snapshot.iter().any(|&level| (level - 0.5).abs() < 1e-3),
        "expected a reading near 0.5, got {:?}",
        snapshot
    );

    sampler.stop();
    session.stop().await;
}
