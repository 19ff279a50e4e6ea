// Tests for the WAV recording sink.
//
// These verify that frames land on disk in arrival order in the declared
// format, that close is idempotent, and that a closed sink rejects writes.

use tempfile::TempDir;
use vox_capture::audio::{AudioFormat, AudioFrame};
use vox_capture::error::CaptureError;
use vox_capture::recording::{sample_to_i16, RecordingSink};

const FORMAT: AudioFormat = AudioFormat {
    sample_rate: 16000,
    channels: 1,
};

fn frame(samples: Vec<f32>) -> AudioFrame {
    AudioFrame {
        samples,
        sample_rate: FORMAT.sample_rate,
        channels: FORMAT.channels,
    }
}

#[test]
fn test_sample_to_i16() {
    assert_eq!(sample_to_i16(0.0), 0);
    assert_eq!(sample_to_i16(1.0), i16::MAX);
    assert_eq!(sample_to_i16(-1.0), -i16::MAX);

    // Out-of-range input is clamped
    assert_eq!(sample_to_i16(2.0), i16::MAX);
    assert_eq!(sample_to_i16(-2.0), -i16::MAX);
}

#[test]
fn test_sink_creates_fresh_wav_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let sink = RecordingSink::create(temp_dir.path(), FORMAT).expect("create sink");

    let name = sink
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name");
    assert!(name.starts_with("recording-"));
    assert!(name.ends_with(".wav"));
    assert!(sink.path().exists());
}

#[test]
fn test_sink_persists_frames_in_order() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut sink = RecordingSink::create(temp_dir.path(), FORMAT).expect("create sink");

    sink.append(&frame(vec![0.0, 0.5])).expect("append");
    sink.append(&frame(vec![-0.5, 1.0])).expect("append");
    assert_eq!(sink.samples_written(), 4);

    let path = sink.path().to_path_buf();
    sink.close().expect("close");

    let reader = hound::WavReader::open(&path).expect("reopen");
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("read samples");
    assert_eq!(
        samples,
        vec![
            sample_to_i16(0.0),
            sample_to_i16(0.5),
            sample_to_i16(-0.5),
            sample_to_i16(1.0),
        ]
    );
}

#[test]
fn test_sink_close_is_idempotent() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut sink = RecordingSink::create(temp_dir.path(), FORMAT).expect("create sink");

    sink.append(&frame(vec![0.1; 100])).expect("append");
    sink.close().expect("first close");
    sink.close().expect("second close is a no-op");
}

#[test]
fn test_append_after_close_fails_with_write_failed() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut sink = RecordingSink::create(temp_dir.path(), FORMAT).expect("create sink");

    sink.close().expect("close");

    let err = sink.append(&frame(vec![0.1])).expect_err("closed sink");
    assert!(matches!(err, CaptureError::WriteFailed(_)));
}

#[test]
fn test_discard_removes_destination() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut sink = RecordingSink::create(temp_dir.path(), FORMAT).expect("create sink");
    let path = sink.path().to_path_buf();

    assert!(path.exists());
    sink.discard();
    assert!(!path.exists());
}

#[test]
fn test_each_sink_gets_its_own_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let first = RecordingSink::create(temp_dir.path(), FORMAT).expect("first sink");
    let second = RecordingSink::create(temp_dir.path(), FORMAT).expect("second sink");

    assert_ne!(first.path(), second.path());
}
