use anyhow::Result;
use tokio::sync::mpsc;

/// Audio sample data (32-bit float, mono)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (always 1 for captured frames)
    pub channels: u16,
}

impl AudioFrame {
    /// Number of sample frames in this chunk (equals sample count for mono).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration of this chunk in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// PCM format descriptor shared between the engine, the recording sink and
/// the recognition stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Hardware audio engine abstraction
///
/// Implementations deliver captured frames on their own timing through the
/// channel returned by `start`. Stopping the engine removes the frame
/// callback: the channel closes and no further frames are delivered once
/// `stop` returns.
#[async_trait::async_trait]
pub trait AudioEngine: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if the engine is currently capturing
    fn is_running(&self) -> bool;

    /// Format of the frames this engine delivers
    fn output_format(&self) -> AudioFormat;

    /// Get engine name for logging
    fn name(&self) -> &str;
}
