use serde::{Deserialize, Serialize};

use crate::error::RecognitionErrorKind;

/// Event emitted by the streaming recognizer.
///
/// A recognition exchange delivers zero or more `Partial` updates, each
/// replacing the accumulated text (never concatenated), followed by exactly
/// one terminal event: `Final` or `Error`. Consumers must tolerate duplicate
/// terminal deliveries and honor only the first.
#[derive(Debug, Clone)]
pub enum TranscriptEvent {
    /// Latest best transcription so far; replaces any previous text.
    Partial(String),
    /// The definitive transcription; the exchange is complete.
    Final(String),
    /// Terminal recognizer failure.
    Error(RecognitionErrorKind),
}

impl TranscriptEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TranscriptEvent::Final(_) | TranscriptEvent::Error(_)
        )
    }
}

/// Accumulated transcription status, mutated only by the recognizer event
/// pump and read by the session as snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptionState {
    /// Latest partial or final text.
    pub accumulated_text: String,
    /// Whether the terminal `Final` event has been observed.
    pub is_final: bool,
    /// Terminal failure, if the exchange ended in error.
    pub last_error: Option<RecognitionErrorKind>,
}
