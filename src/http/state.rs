use std::sync::Arc;

use crate::audio::WaveformSampler;
use crate::session::AudioCaptureSession;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single capture session this service controls
    pub session: AudioCaptureSession,
    /// Waveform history sampler for the visualization endpoint
    pub waveform: Arc<WaveformSampler>,
}

impl AppState {
    pub fn new(session: AudioCaptureSession, waveform: Arc<WaveformSampler>) -> Self {
        Self { session, waveform }
    }
}
