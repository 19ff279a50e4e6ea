use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::engine::{AudioEngine, AudioFormat, AudioFrame};

/// File-backed audio engine
///
/// Streams a WAV file from disk as mono f32 frames, optionally paced at the
/// file's real-time rate. Stands in for hardware capture in the demo binary
/// and in batch/test runs.
pub struct FileEngine {
    path: PathBuf,
    format: AudioFormat,
    frame_len: usize,
    realtime: bool,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FileEngine {
    /// Open a WAV file and prepare to stream it in buffers of
    /// `buffer_duration_ms`. Stereo input is mixed down to mono; the output
    /// format always has one channel at the file's sample rate.
    pub fn new(path: impl AsRef<Path>, buffer_duration_ms: u64, realtime: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = WavReader::open(&path)
            .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
        let spec = reader.spec();

        if spec.channels == 0 || spec.channels > 2 {
            bail!("Unsupported channel count: {}", spec.channels);
        }

        let sample_rate = spec.sample_rate;
        let frame_len = ((sample_rate as u64 * buffer_duration_ms) / 1000).max(1) as usize;

        info!(
            "File engine initialized: {} ({}Hz, {} channels, {}ms buffers)",
            path.display(),
            sample_rate,
            spec.channels,
            buffer_duration_ms
        );

        Ok(Self {
            path,
            format: AudioFormat {
                sample_rate,
                channels: 1,
            },
            frame_len,
            realtime,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        })
    }

    fn read_mono_samples(&self) -> Result<Vec<f32>> {
        let reader = WavReader::open(&self.path)
            .with_context(|| format!("Failed to open WAV file: {}", self.path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read float samples")?,
            SampleFormat::Int => reader
                .into_samples::<i16>()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read integer samples")?
                .into_iter()
                .map(|s| s as f32 / i16::MAX as f32)
                .collect(),
        };

        if spec.channels == 2 {
            // Average interleaved pairs down to mono
            Ok(samples
                .chunks_exact(2)
                .map(|pair| (pair[0] + pair[1]) / 2.0)
                .collect())
        } else {
            Ok(samples)
        }
    }
}

#[async_trait::async_trait]
impl AudioEngine for FileEngine {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.running.load(Ordering::SeqCst) {
            bail!("Already capturing");
        }

        let samples = self.read_mono_samples()?;
        let (tx, rx) = mpsc::channel(32);

        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        let format = self.format;
        let frame_len = self.frame_len;
        let realtime = self.realtime;
        let pace = Duration::from_secs_f64(frame_len as f64 / format.sample_rate as f64);

        self.task = Some(tokio::spawn(async move {
            for chunk in samples.chunks(frame_len) {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: format.sample_rate,
                    channels: format.channels,
                };

                if tx.send(frame).await.is_err() {
                    break;
                }

                if realtime {
                    tokio::time::sleep(pace).await;
                }
            }

            running.store(false, Ordering::SeqCst);
        }));

        info!("File engine capture started");

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) && self.task.is_none() {
            return Ok(());
        }

        self.running.store(false, Ordering::SeqCst);

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        info!("File engine capture stopped");

        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn output_format(&self) -> AudioFormat {
        self.format
    }

    fn name(&self) -> &str {
        "WAV file"
    }
}
