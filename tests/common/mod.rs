// Shared scripted collaborators for session-level tests: an audio engine
// that replays a fixed set of frames and a transcription provider that
// emits scripted events after a given number of received frames.

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use vox_capture::audio::{AudioEngine, AudioFormat, AudioFrame};
use vox_capture::error::RecognitionErrorKind;
use vox_capture::transcription::{RecognitionStream, TranscriptEvent, TranscriptionProvider};

pub const SAMPLE_RATE: u32 = 16000;

pub fn frame(samples: usize, value: f32) -> AudioFrame {
    AudioFrame {
        samples: vec![value; samples],
        sample_rate: SAMPLE_RATE,
        channels: 1,
    }
}

/// Engine that delivers its scripted frames with a small delay between them,
/// then holds the channel open until stopped, like live hardware idling
/// between buffers.
pub struct ScriptedEngine {
    frames: Vec<AudioFrame>,
    running: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedEngine {
    pub fn new(frames: Vec<AudioFrame>) -> Self {
        Self {
            frames,
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioEngine for ScriptedEngine {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.running.load(Ordering::SeqCst) {
            bail!("Already capturing");
        }

        let (tx, rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = oneshot::channel();
        let frames = self.frames.clone();

        self.running.store(true, Ordering::SeqCst);
        self.task = Some(tokio::spawn(async move {
            for frame in frames {
                if tx.send(frame).await.is_err() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }

            // Keep the tap installed until stop removes it.
            let _ = stop_rx.await;
        }));
        self.stop_tx = Some(stop_tx);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn output_format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: SAMPLE_RATE,
            channels: 1,
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Provider that emits each scripted event once the given number of frames
/// has been received. Events past a terminal one are still sent, so tests
/// can exercise duplicate terminal delivery.
pub struct ScriptedProvider {
    script: Vec<(usize, TranscriptEvent)>,
    pub cancelled: Arc<AtomicBool>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<(usize, TranscriptEvent)>) -> Self {
        Self {
            script,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Provider that consumes frames but never emits any event.
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl TranscriptionProvider for ScriptedProvider {
    async fn begin(&self, _format: AudioFormat) -> Result<RecognitionStream> {
        let (frames_tx, mut frames_rx) = mpsc::channel::<AudioFrame>(64);
        let (events_tx, events_rx) = mpsc::channel::<TranscriptEvent>(64);
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let cancelled = Arc::clone(&self.cancelled);
        tokio::spawn(async move {
            if cancel_rx.await.is_ok() {
                cancelled.store(true, Ordering::SeqCst);
            }
        });

        let script = self.script.clone();
        tokio::spawn(async move {
            let mut seen = 0usize;
            let mut pending = script.into_iter().peekable();

            loop {
                match frames_rx.recv().await {
                    Some(_) => {
                        seen += 1;
                        while let Some((threshold, _)) = pending.peek() {
                            if *threshold > seen {
                                break;
                            }
                            let (_, event) = pending.next().expect("peeked event");
                            if events_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    None => {
                        // End of input: flush whatever the script still holds.
                        for (_, event) in pending {
                            if events_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        return;
                    }
                }
            }
        });

        Ok(RecognitionStream {
            frames: frames_tx,
            events: events_rx,
            cancel: cancel_tx,
        })
    }
}

/// Provider whose stream fails terminally before any audio is sent, like a
/// recognizer losing its connection the moment the exchange opens.
pub struct FailFastProvider;

#[async_trait::async_trait]
impl TranscriptionProvider for FailFastProvider {
    async fn begin(&self, _format: AudioFormat) -> Result<RecognitionStream> {
        let (frames_tx, _frames_rx) = mpsc::channel::<AudioFrame>(64);
        let (events_tx, events_rx) = mpsc::channel::<TranscriptEvent>(64);
        let (cancel_tx, _cancel_rx) = oneshot::channel::<()>();

        events_tx
            .send(TranscriptEvent::Error(RecognitionErrorKind::NetworkLost))
            .await
            .expect("buffered event channel");

        Ok(RecognitionStream {
            frames: frames_tx,
            events: events_rx,
            cancel: cancel_tx,
        })
    }
}

/// Provider whose begin() always fails.
pub struct UnavailableProvider;

#[async_trait::async_trait]
impl TranscriptionProvider for UnavailableProvider {
    async fn begin(&self, _format: AudioFormat) -> Result<RecognitionStream> {
        bail!("recognizer offline")
    }
}
