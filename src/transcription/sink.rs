use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::audio::AudioFrame;

use super::events::TranscriptionState;

/// Frame-side handle to one streaming recognition exchange.
///
/// Owned by the capture session for the duration of a recording. Forwarding
/// is strictly non-blocking: a slow recognizer loses frames rather than
/// stalling the capture path.
pub struct TranscriptionSink {
    frames: Option<mpsc::Sender<AudioFrame>>,
    cancel: Option<oneshot::Sender<()>>,
    state: Arc<Mutex<TranscriptionState>>,
    dropped_frames: u64,
}

impl TranscriptionSink {
    pub fn new(
        frames: mpsc::Sender<AudioFrame>,
        cancel: oneshot::Sender<()>,
        state: Arc<Mutex<TranscriptionState>>,
    ) -> Self {
        Self {
            frames: Some(frames),
            cancel: Some(cancel),
            state,
            dropped_frames: 0,
        }
    }

    /// Forward one frame to the active recognition stream. No-op after
    /// `end_input`. Never blocks.
    pub fn append(&mut self, frame: AudioFrame) {
        let Some(tx) = &self.frames else {
            return;
        };

        match tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped_frames += 1;
                if self.dropped_frames == 1 || self.dropped_frames % 100 == 0 {
                    warn!(
                        dropped = self.dropped_frames,
                        "recognition stream is falling behind; dropping frames"
                    );
                }
            }
            Err(TrySendError::Closed(_)) => {
                // The recognizer went away; its terminal event handles the rest.
                debug!("recognition stream closed; frame not forwarded");
            }
        }
    }

    /// Signal that no more audio is coming. Idempotent; the partial transcript
    /// accumulated so far is preserved.
    pub fn end_input(&mut self) {
        if self.frames.take().is_some() {
            debug!("recognition end-of-input signalled");
        }
    }

    /// Best-effort abort of the in-flight exchange. Idempotent; has no effect
    /// once the exchange has already finalized.
    pub fn cancel(&mut self) {
        let finalized = self
            .state
            .lock()
            .expect("transcription state lock poisoned")
            .is_final;
        if finalized {
            // Let a completed exchange finish normally.
            self.cancel = None;
            return;
        }

        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
            debug!("recognition cancellation requested");
        }
    }

    /// Number of frames dropped because the recognizer could not keep up.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}
