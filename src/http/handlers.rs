use super::state::AppState;
use crate::error::CaptureError;
use crate::session::SessionStats;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartCaptureResponse {
    pub status: String,
    pub recording_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StopCaptureResponse {
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub text: String,
    #[serde(rename = "final")]
    pub is_final: bool,
}

#[derive(Debug, Serialize)]
pub struct WaveformResponse {
    pub levels: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /capture/start
/// Start the capture session
pub async fn start_capture(State(state): State<AppState>) -> impl IntoResponse {
    info!("Starting capture");

    match state.session.start().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StartCaptureResponse {
                status: "recording".to_string(),
                recording_path: state
                    .session
                    .recording_path()
                    .map(|p| p.display().to_string()),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start capture: {}", e);
            let status = match &e {
                CaptureError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                CaptureError::ResourceUnavailable(_)
                | CaptureError::RecognitionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /capture/stop
/// Stop the capture session (no-op when idle)
pub async fn stop_capture(State(state): State<AppState>) -> impl IntoResponse {
    info!("Stopping capture");

    let stats = state.session.stop().await;

    (
        StatusCode::OK,
        Json(StopCaptureResponse {
            status: "stopped".to_string(),
            stats,
        }),
    )
}

/// GET /capture/status
/// Current session snapshot
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.session.stats()))
}

/// GET /capture/transcript
/// Latest partial or final transcription
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let transcript = state.session.transcription_state();

    (
        StatusCode::OK,
        Json(TranscriptResponse {
            text: transcript.accumulated_text,
            is_final: transcript.is_final,
        }),
    )
}

/// GET /capture/waveform
/// Time-sampled loudness history for rendering, oldest first
pub async fn get_waveform(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(WaveformResponse {
            levels: state.waveform.snapshot(),
        }),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
