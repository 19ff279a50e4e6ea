use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RecognitionErrorKind;

/// Snapshot of a capture session's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether recording is currently active
    pub is_recording: bool,

    /// When the most recent recording started
    pub started_at: Option<DateTime<Utc>>,

    /// Duration of the current/most recent recording in seconds
    pub duration_secs: f64,

    /// Number of frames captured so far
    pub frames_captured: usize,

    /// Whether any recording write has failed (capture continued degraded)
    pub persistence_degraded: bool,

    /// Latest partial or final transcription
    pub recognized_text: String,

    /// Whether the transcription has finalized
    pub transcript_final: bool,

    /// Terminal recognizer failure, if any
    pub last_error: Option<RecognitionErrorKind>,

    /// Destination of the current/most recent recording, as an opaque
    /// identifier for the caller
    pub recording_path: Option<PathBuf>,
}
