use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::audio::{AudioFormat, AudioFrame};
use crate::error::CaptureError;

/// Convert a float sample to i16 for WAV writing.
pub fn sample_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * i16::MAX as f32) as i16
}

/// Appends captured frames to a single destination WAV file in arrival order.
///
/// Each sink owns exactly one fresh file per recording session; nothing else
/// writes to it. Write failures are non-fatal upstream: the session logs them
/// and capture continues.
pub struct RecordingSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    path: PathBuf,
    samples_written: usize,
}

impl RecordingSink {
    /// Create a fresh, uuid-named destination in `dir`, never overwriting an
    /// existing recording. The file is 16-bit PCM at the engine's format.
    pub fn create(dir: &Path, format: AudioFormat) -> Result<Self, CaptureError> {
        fs::create_dir_all(dir).map_err(|e| {
            CaptureError::ResourceUnavailable(format!(
                "failed to create recording directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(format!("recording-{}.wav", Uuid::new_v4()));

        let spec = hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&path, spec).map_err(|e| {
            CaptureError::ResourceUnavailable(format!(
                "failed to create WAV file {}: {}",
                path.display(),
                e
            ))
        })?;

        info!(
            "Recording destination opened: {} ({}Hz, {} channels)",
            path.display(),
            format.sample_rate,
            format.channels
        );

        Ok(Self {
            writer: Some(writer),
            path,
            samples_written: 0,
        })
    }

    /// Append one frame. Fails with `WriteFailed` on I/O error or after the
    /// sink was closed.
    pub fn append(&mut self, frame: &AudioFrame) -> Result<(), CaptureError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CaptureError::WriteFailed("recording sink is closed".to_string()))?;

        for &sample in &frame.samples {
            writer
                .write_sample(sample_to_i16(sample))
                .map_err(|e| CaptureError::WriteFailed(e.to_string()))?;
        }

        self.samples_written += frame.samples.len();

        Ok(())
    }

    /// Flush and finalize the destination. Idempotent; a second call is a
    /// no-op.
    pub fn close(&mut self) -> Result<(), CaptureError> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .map_err(|e| CaptureError::WriteFailed(e.to_string()))?;
            info!(
                "Recording finalized: {} ({} samples)",
                self.path.display(),
                self.samples_written
            );
        }

        Ok(())
    }

    /// Close the destination and delete it, for start-time rollback. Deletion
    /// is best-effort.
    pub fn discard(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to finalize recording during rollback: {}", e);
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(
                "Failed to remove rolled-back recording {}: {}",
                self.path.display(),
                e
            );
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn samples_written(&self) -> usize {
        self.samples_written
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}

/// Frame destination as the capture session sees it.
///
/// One instance per recording; the frame pump owns it while frames flow and
/// teardown closes it after the pump drains.
pub trait AudioSink: Send {
    fn append(&mut self, frame: &AudioFrame) -> Result<(), CaptureError>;
    fn close(&mut self) -> Result<(), CaptureError>;
    fn discard(&mut self);
    fn path(&self) -> &Path;
}

impl AudioSink for RecordingSink {
    fn append(&mut self, frame: &AudioFrame) -> Result<(), CaptureError> {
        RecordingSink::append(self, frame)
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        RecordingSink::close(self)
    }

    fn discard(&mut self) {
        RecordingSink::discard(self)
    }

    fn path(&self) -> &Path {
        RecordingSink::path(self)
    }
}

/// Opens one fresh destination per recording.
pub trait RecordingProvider: Send + Sync {
    fn open(&self, dir: &Path, format: AudioFormat) -> Result<Box<dyn AudioSink>, CaptureError>;
}

/// Default destination provider: a uuid-named 16-bit WAV per recording.
pub struct WavRecordingProvider;

impl RecordingProvider for WavRecordingProvider {
    fn open(&self, dir: &Path, format: AudioFormat) -> Result<Box<dyn AudioSink>, CaptureError> {
        Ok(Box::new(RecordingSink::create(dir, format)?))
    }
}
