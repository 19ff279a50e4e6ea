use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal recognizer failure reasons surfaced through the event channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionErrorKind {
    NetworkLost,
    ServiceUnavailable,
    NotAuthorized,
    Aborted,
    Other(String),
}

impl RecognitionErrorKind {
    /// Map a wire-level error tag to a kind. Unknown tags are preserved verbatim.
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "network-lost" => RecognitionErrorKind::NetworkLost,
            "service-unavailable" => RecognitionErrorKind::ServiceUnavailable,
            "not-authorized" => RecognitionErrorKind::NotAuthorized,
            "aborted" => RecognitionErrorKind::Aborted,
            other => RecognitionErrorKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionErrorKind::NetworkLost => write!(f, "network connection lost"),
            RecognitionErrorKind::ServiceUnavailable => write!(f, "recognition service unavailable"),
            RecognitionErrorKind::NotAuthorized => write!(f, "recognition not authorized"),
            RecognitionErrorKind::Aborted => write!(f, "recognition aborted"),
            RecognitionErrorKind::Other(tag) => write!(f, "recognition error: {}", tag),
        }
    }
}

/// Errors that can occur while starting or running a capture session.
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Microphone or speech-recognition permission missing. Fatal to start();
    /// the session stays idle and the caller must re-prompt.
    PermissionDenied(String),
    /// Destination file or hardware engine failed to initialize. Fatal to
    /// start(); everything already opened is rolled back.
    ResourceUnavailable(String),
    /// The recognizer failed to begin streaming. Fatal to start(); the opened
    /// destination is closed.
    RecognitionUnavailable(String),
    /// A recording write failed. Non-fatal; capture continues degraded.
    WriteFailed(String),
    /// The recognizer reported a terminal failure mid-stream. Returned from
    /// start() when the failure lands before recording is established; later
    /// failures travel as a `RecognitionErrorKind` on the transcription state.
    RecognitionError(RecognitionErrorKind),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::PermissionDenied(e) => write!(f, "permission denied: {}", e),
            CaptureError::ResourceUnavailable(e) => write!(f, "resource unavailable: {}", e),
            CaptureError::RecognitionUnavailable(e) => {
                write!(f, "recognition unavailable: {}", e)
            }
            CaptureError::WriteFailed(e) => write!(f, "write failed: {}", e),
            CaptureError::RecognitionError(kind) => write!(f, "{}", kind),
        }
    }
}

impl std::error::Error for CaptureError {}
