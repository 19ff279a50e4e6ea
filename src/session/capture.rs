use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::audio::{AudioEngine, AudioFrame, LevelMeter};
use crate::error::CaptureError;
use crate::recording::{AudioSink, RecordingProvider, WavRecordingProvider};
use crate::transcription::{
    TranscriptEvent, TranscriptionProvider, TranscriptionSink, TranscriptionState,
};

use super::auth::{AuthorizationProvider, AuthorizationStatus};
use super::stats::SessionStats;

/// Capture lifecycle states.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle = 0,
    Starting = 1,
    Recording = 2,
    Stopping = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SessionState::Starting,
            2 => SessionState::Recording,
            3 => SessionState::Stopping,
            _ => SessionState::Idle,
        }
    }
}

// Lifecycle word layout: recording generation in the high bits, state in the
// low two. Keeping both in one atomic lets a stop request verify "still this
// recording, still recording" in a single compare-and-swap.
const LIFECYCLE_STATE_MASK: u64 = 0b11;

fn pack(generation: u64, state: SessionState) -> u64 {
    (generation << 2) | state as u64
}

fn state_of(word: u64) -> SessionState {
    SessionState::from_u8((word & LIFECYCLE_STATE_MASK) as u8)
}

fn generation_of(word: u64) -> u64 {
    word >> 2
}

/// Session-level capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Directory where recording files are created
    pub recording_dir: PathBuf,
    /// Gain applied to RMS readings before clamping to [0, 1]
    pub meter_gain: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            recording_dir: PathBuf::from("recordings"),
            meter_gain: 1.0,
        }
    }
}

struct Inner {
    config: CaptureConfig,
    auth: Box<dyn AuthorizationProvider>,
    provider: Box<dyn TranscriptionProvider>,
    recording: Box<dyn RecordingProvider>,

    /// The hardware engine. Exactly one owner; nothing outside the session
    /// reconfigures it while recording.
    engine: tokio::sync::Mutex<Box<dyn AudioEngine>>,

    /// Packed lifecycle word (see `pack`). The generation is stamped each
    /// time start() wins the idle-to-starting transition; stop requests and
    /// recognizer events carry the generation they belong to, so a late event
    /// from an earlier recording can never tear down a later one, and
    /// concurrent stop() callers observe exactly one teardown.
    lifecycle: AtomicU64,

    /// Latest loudness reading as f32 bits. Single writer (the frame pump),
    /// overwrite-only; readers never block the audio path.
    level_bits: AtomicU32,

    frames_captured: AtomicUsize,
    persistence_degraded: AtomicBool,

    transcript: Arc<Mutex<TranscriptionState>>,
    transcription: Mutex<Option<TranscriptionSink>>,

    /// Frame pump handle; the pump owns the recording sink and hands it back
    /// when the frame channel closes.
    frame_task: tokio::sync::Mutex<Option<JoinHandle<Box<dyn AudioSink>>>>,

    started_at: Mutex<Option<DateTime<Utc>>>,
    stopped_at: Mutex<Option<DateTime<Utc>>>,
    recording_path: Mutex<Option<PathBuf>>,
}

/// Single authority over microphone capture, authorization and the
/// start/stop state machine.
///
/// Fans each captured frame out to the recording sink, the transcription
/// sink and the level meter. Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct AudioCaptureSession {
    inner: Arc<Inner>,
}

impl AudioCaptureSession {
    pub fn new(
        engine: Box<dyn AudioEngine>,
        provider: Box<dyn TranscriptionProvider>,
        auth: Box<dyn AuthorizationProvider>,
        config: CaptureConfig,
    ) -> Self {
        Self::with_recording(
            engine,
            provider,
            auth,
            Box::new(WavRecordingProvider),
            config,
        )
    }

    /// Construct with a custom recording destination provider.
    pub fn with_recording(
        engine: Box<dyn AudioEngine>,
        provider: Box<dyn TranscriptionProvider>,
        auth: Box<dyn AuthorizationProvider>,
        recording: Box<dyn RecordingProvider>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                auth,
                provider,
                recording,
                engine: tokio::sync::Mutex::new(engine),
                lifecycle: AtomicU64::new(pack(0, SessionState::Idle)),
                level_bits: AtomicU32::new(0f32.to_bits()),
                frames_captured: AtomicUsize::new(0),
                persistence_degraded: AtomicBool::new(false),
                transcript: Arc::new(Mutex::new(TranscriptionState::default())),
                transcription: Mutex::new(None),
                frame_task: tokio::sync::Mutex::new(None),
                started_at: Mutex::new(None),
                stopped_at: Mutex::new(None),
                recording_path: Mutex::new(None),
            }),
        }
    }

    /// Start capturing. No-op when already starting or recording.
    ///
    /// Verifies authorization, opens a fresh destination, installs the
    /// hardware tap, then begins the recognition stream; any failure rolls
    /// back everything already opened and leaves the session idle.
    pub async fn start(&self) -> Result<(), CaptureError> {
        let inner = &self.inner;

        let current = inner.lifecycle.load(Ordering::SeqCst);
        let generation = generation_of(current) + 1;
        if state_of(current) != SessionState::Idle
            || inner
                .lifecycle
                .compare_exchange(
                    current,
                    pack(generation, SessionState::Starting),
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_err()
        {
            debug!("start ignored; session already active");
            return Ok(());
        }

        match self.try_start(generation).await {
            Ok(()) => {
                inner
                    .lifecycle
                    .store(pack(generation, SessionState::Recording), Ordering::SeqCst);
                info!("capture session recording");

                // A terminal recognizer event can land while the state is
                // still Starting; its stop attempt finds nothing to contend
                // with, so run the teardown it missed.
                let (terminal, kind) = {
                    let transcript =
                        inner.transcript.lock().expect("transcript lock poisoned");
                    (
                        transcript.is_final || transcript.last_error.is_some(),
                        transcript.last_error.clone(),
                    )
                };
                if terminal {
                    self.stop_for(generation).await;
                    if let Some(kind) = kind {
                        return Err(CaptureError::RecognitionError(kind));
                    }
                }

                Ok(())
            }
            Err(e) => {
                inner
                    .lifecycle
                    .store(pack(generation, SessionState::Idle), Ordering::SeqCst);
                warn!("capture session failed to start: {}", e);
                Err(e)
            }
        }
    }

    async fn try_start(&self, generation: u64) -> Result<(), CaptureError> {
        let inner = &self.inner;

        // 1. Authorization: both microphone and speech recognition must be
        // granted before any resource is touched.
        if inner.auth.microphone().await != AuthorizationStatus::Granted {
            return Err(CaptureError::PermissionDenied(
                "microphone access not granted".to_string(),
            ));
        }
        if inner.auth.speech_recognition().await != AuthorizationStatus::Granted {
            return Err(CaptureError::PermissionDenied(
                "speech recognition not granted".to_string(),
            ));
        }

        let mut engine = inner.engine.lock().await;
        let format = engine.output_format();

        // 2. Destination before tap: the tap is never installed without a
        // valid destination.
        let mut sink = inner.recording.open(&inner.config.recording_dir, format)?;

        // 3. Hardware tap.
        let frames_rx = match engine.start().await {
            Ok(rx) => rx,
            Err(e) => {
                sink.discard();
                return Err(CaptureError::ResourceUnavailable(e.to_string()));
            }
        };

        // 4. Recognition stream; failure tears down the tap and destination.
        let stream = match inner.provider.begin(format).await {
            Ok(stream) => stream,
            Err(e) => {
                if let Err(stop_err) = engine.stop().await {
                    warn!("engine teardown after recognition failure: {}", stop_err);
                }
                sink.discard();
                return Err(CaptureError::RecognitionUnavailable(e.to_string()));
            }
        };

        info!(
            engine = engine.name(),
            path = %sink.path().display(),
            sample_rate = format.sample_rate,
            "capture session starting"
        );
        drop(engine);

        // Reset per-recording state.
        inner.level_bits.store(0f32.to_bits(), Ordering::SeqCst);
        inner.frames_captured.store(0, Ordering::SeqCst);
        inner.persistence_degraded.store(false, Ordering::SeqCst);
        *inner.transcript.lock().expect("transcript lock poisoned") =
            TranscriptionState::default();
        *inner.started_at.lock().expect("started_at lock poisoned") = Some(Utc::now());
        *inner.stopped_at.lock().expect("stopped_at lock poisoned") = None;
        *inner
            .recording_path
            .lock()
            .expect("recording_path lock poisoned") = Some(sink.path().to_path_buf());

        *inner
            .transcription
            .lock()
            .expect("transcription lock poisoned") = Some(TranscriptionSink::new(
            stream.frames,
            stream.cancel,
            Arc::clone(&inner.transcript),
        ));

        let pump_handle = tokio::spawn(frame_pump(Arc::clone(inner), frames_rx, sink));
        *inner.frame_task.lock().await = Some(pump_handle);

        tokio::spawn(event_pump(self.clone(), stream.events, generation));

        Ok(())
    }

    /// Stop capturing and tear down in strict order: remove the tap, halt
    /// the engine, signal end-of-input, request cancellation, close the
    /// destination, return to idle.
    ///
    /// Idempotent and safe to call concurrently: exactly one caller performs
    /// the teardown; the rest observe a no-op. Completes in bounded time even
    /// if the recognizer never calls back.
    pub async fn stop(&self) -> SessionStats {
        let current = self.inner.lifecycle.load(Ordering::SeqCst);
        self.stop_for(generation_of(current)).await
    }

    /// Teardown scoped to one recording. A caller holding a stale generation
    /// (a recognizer event pump that outlived its recording) observes a no-op
    /// instead of stopping a later recording; the single compare-and-swap on
    /// the packed word rules out any window between the two checks.
    async fn stop_for(&self, generation: u64) -> SessionStats {
        let inner = &self.inner;

        if inner
            .lifecycle
            .compare_exchange(
                pack(generation, SessionState::Recording),
                pack(generation, SessionState::Stopping),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            debug!("stop ignored; not recording this generation");
            return self.stats();
        }

        info!("capture session stopping");

        // 1 + 2. Remove the frame callback and halt the engine. The frame
        // channel closes; no further frames are delivered after this returns.
        {
            let mut engine = inner.engine.lock().await;
            if let Err(e) = engine.stop().await {
                warn!("engine stop reported an error: {}", e);
            }
        }

        // Drain the pump and recover the sink with every captured frame
        // appended.
        let pump_handle = inner.frame_task.lock().await.take();
        let mut sink = match pump_handle {
            Some(handle) => match handle.await {
                Ok(sink) => Some(sink),
                Err(e) => {
                    error!("frame pump panicked: {}", e);
                    None
                }
            },
            None => None,
        };

        // 3 + 4. End-of-input, then best-effort cancellation. Neither blocks
        // on recognizer acknowledgment; a finalized exchange is left alone.
        if let Some(mut transcription) = inner
            .transcription
            .lock()
            .expect("transcription lock poisoned")
            .take()
        {
            transcription.end_input();
            transcription.cancel();
        }

        // 5. Close and flush the destination.
        if let Some(sink) = &mut sink {
            if let Err(e) = sink.close() {
                error!("failed to finalize recording: {}", e);
            }
        }

        // 6. Idle.
        *inner.stopped_at.lock().expect("stopped_at lock poisoned") = Some(Utc::now());
        inner
            .lifecycle
            .store(pack(generation, SessionState::Idle), Ordering::SeqCst);
        info!("capture session stopped");

        self.stats()
    }

    pub fn state(&self) -> SessionState {
        state_of(self.inner.lifecycle.load(Ordering::SeqCst))
    }

    pub fn is_recording(&self) -> bool {
        self.state() == SessionState::Recording
    }

    /// Latest loudness reading in [0, 1]. Lock-free; safe from any context.
    pub fn audio_level(&self) -> f32 {
        f32::from_bits(self.inner.level_bits.load(Ordering::SeqCst))
    }

    /// Latest partial or final transcription.
    pub fn recognized_text(&self) -> String {
        self.inner
            .transcript
            .lock()
            .expect("transcript lock poisoned")
            .accumulated_text
            .clone()
    }

    /// Full transcription status snapshot.
    pub fn transcription_state(&self) -> TranscriptionState {
        self.inner
            .transcript
            .lock()
            .expect("transcript lock poisoned")
            .clone()
    }

    /// Destination of the current/most recent recording.
    pub fn recording_path(&self) -> Option<PathBuf> {
        self.inner
            .recording_path
            .lock()
            .expect("recording_path lock poisoned")
            .clone()
    }

    pub fn stats(&self) -> SessionStats {
        let inner = &self.inner;
        let started_at = *inner.started_at.lock().expect("started_at lock poisoned");
        let stopped_at = *inner.stopped_at.lock().expect("stopped_at lock poisoned");
        let transcript = self.transcription_state();

        SessionStats {
            is_recording: self.is_recording(),
            started_at,
            duration_secs: match (started_at, stopped_at) {
                (Some(started), Some(stopped)) => {
                    stopped.signed_duration_since(started).num_milliseconds() as f64 / 1000.0
                }
                (Some(started), None) => {
                    Utc::now().signed_duration_since(started).num_milliseconds() as f64 / 1000.0
                }
                _ => 0.0,
            },
            frames_captured: inner.frames_captured.load(Ordering::SeqCst),
            persistence_degraded: inner.persistence_degraded.load(Ordering::SeqCst),
            recognized_text: transcript.accumulated_text,
            transcript_final: transcript.is_final,
            last_error: transcript.last_error,
            recording_path: self.recording_path(),
        }
    }
}

/// Per-frame fan-out, running on its own task so the engine's delivery
/// context is never blocked on file or recognition I/O.
///
/// Owns the recording sink for the duration of the recording and returns it
/// once the frame channel closes, so teardown can flush and finalize after
/// every captured frame has been appended.
async fn frame_pump(
    inner: Arc<Inner>,
    mut frames_rx: mpsc::Receiver<AudioFrame>,
    mut sink: Box<dyn AudioSink>,
) -> Box<dyn AudioSink> {
    let meter = LevelMeter::new(inner.config.meter_gain);

    while let Some(frame) = frames_rx.recv().await {
        // (a) Persist. A failing write degrades persistence but never stops
        // capture.
        if let Err(e) = sink.append(&frame) {
            if !inner.persistence_degraded.swap(true, Ordering::SeqCst) {
                warn!("recording write failed; capture continues degraded: {}", e);
            }
        }

        // (b) Forward to recognition, non-blocking.
        {
            let mut transcription = inner
                .transcription
                .lock()
                .expect("transcription lock poisoned");
            if let Some(transcription) = transcription.as_mut() {
                transcription.append(frame.clone());
            }
        }

        // (c) Meter: overwrite the current reading, latest value wins.
        let reading = meter.reading(&frame.samples);
        inner.level_bits.store(reading.to_bits(), Ordering::SeqCst);
        inner.frames_captured.fetch_add(1, Ordering::SeqCst);
    }

    debug!("frame pump drained");
    sink
}

/// Consumes recognizer events until the first terminal one, then triggers
/// auto-stop for the recording it belongs to. Duplicate terminal deliveries
/// are discarded with the receiver; events from a superseded recording are
/// dropped outright.
async fn event_pump(
    session: AudioCaptureSession,
    mut events_rx: mpsc::Receiver<TranscriptEvent>,
    generation: u64,
) {
    let mut terminal = false;

    while let Some(event) = events_rx.recv().await {
        if generation_of(session.inner.lifecycle.load(Ordering::SeqCst)) != generation {
            debug!("dropping recognizer event from a superseded recording");
            break;
        }

        match event {
            TranscriptEvent::Partial(text) => {
                session
                    .inner
                    .transcript
                    .lock()
                    .expect("transcript lock poisoned")
                    .accumulated_text = text;
            }
            TranscriptEvent::Final(text) => {
                let mut transcript = session
                    .inner
                    .transcript
                    .lock()
                    .expect("transcript lock poisoned");
                transcript.accumulated_text = text;
                transcript.is_final = true;
                drop(transcript);
                terminal = true;
                break;
            }
            TranscriptEvent::Error(kind) => {
                warn!("recognition ended with error: {}", kind);
                session
                    .inner
                    .transcript
                    .lock()
                    .expect("transcript lock poisoned")
                    .last_error = Some(kind);
                terminal = true;
                break;
            }
        }
    }

    if terminal {
        session.stop_for(generation).await;
    }
}
