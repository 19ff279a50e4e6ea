pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod recording;
pub mod session;
pub mod transcription;

pub use audio::{
    AudioEngine, AudioFormat, AudioFrame, FileEngine, LevelMeter, WaveformRingBuffer,
    WaveformSampler,
};
pub use config::Config;
pub use error::{CaptureError, RecognitionErrorKind};
pub use http::{create_router, AppState};
pub use recording::{AudioSink, RecordingProvider, RecordingSink, WavRecordingProvider};
pub use session::{
    AudioCaptureSession, AuthorizationProvider, AuthorizationStatus, CaptureConfig, SessionState,
    SessionStats, StaticAuthorization,
};
pub use transcription::{
    NatsTranscriptionProvider, RecognitionStream, TranscriptEvent, TranscriptionProvider,
    TranscriptionSink, TranscriptionState,
};
