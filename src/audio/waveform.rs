use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use crate::session::AudioCaptureSession;

/// Bounded, time-sampled history of loudness readings for rendering.
///
/// Decouples the variable-rate arrival of level readings (tied to the
/// hardware buffer size) from a fixed visual sampling cadence: the sampler
/// reads the session's latest reading on a timer and pushes it here, so the
/// displayed history has uniform time spacing regardless of hardware jitter.
#[derive(Debug, Clone)]
pub struct WaveformRingBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl WaveformRingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Capacity for a render surface: one reading per drawn bar. Fixed for
    /// the buffer's lifetime once computed.
    pub fn capacity_for_width(render_width_px: u32, bar_width_px: u32) -> usize {
        (render_width_px / bar_width_px.max(1)).max(1) as usize
    }

    /// Append a reading, evicting the oldest first once capacity is reached.
    pub fn push(&mut self, reading: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(reading);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Readings in arrival order, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Timer-driven sampler feeding a `WaveformRingBuffer` from a session's
/// latest level reading.
///
/// Runs on its own periodic timer and only ever reads the current value; it
/// never blocks the audio path.
pub struct WaveformSampler {
    buffer: Arc<Mutex<WaveformRingBuffer>>,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
    task: JoinHandle<()>,
}

impl WaveformSampler {
    /// Spawn the sampling task with a fixed period.
    pub fn spawn(session: AudioCaptureSession, capacity: usize, period: Duration) -> Self {
        let buffer = Arc::new(Mutex::new(WaveformRingBuffer::new(capacity)));
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task_buffer = Arc::clone(&buffer);
        let task = tokio::spawn(async move {
            let mut tick = interval(period);
            debug!("waveform sampler started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!("waveform sampler received stop signal");
                        break;
                    }
                    _ = tick.tick() => {
                        let reading = session.audio_level();
                        task_buffer
                            .lock()
                            .expect("waveform buffer lock poisoned")
                            .push(reading);
                    }
                }
            }

            debug!("waveform sampler stopped");
        });

        Self {
            buffer,
            stop_tx: Mutex::new(Some(stop_tx)),
            task,
        }
    }

    /// Current history, oldest reading first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .expect("waveform buffer lock poisoned")
            .snapshot()
    }

    /// Stop the sampling task. Idempotent.
    pub fn stop(&self) {
        if let Some(tx) = self
            .stop_tx
            .lock()
            .expect("waveform stop lock poisoned")
            .take()
        {
            let _ = tx.send(());
        }
    }
}

impl Drop for WaveformSampler {
    fn drop(&mut self) {
        self.stop();
        self.task.abort();
    }
}
