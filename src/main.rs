use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use vox_capture::audio::{FileEngine, WaveformRingBuffer, WaveformSampler};
use vox_capture::session::{AudioCaptureSession, CaptureConfig, StaticAuthorization};
use vox_capture::transcription::NatsTranscriptionProvider;
use vox_capture::{create_router, AppState, Config};

#[derive(Debug, Parser)]
#[command(name = "vox-capture", about = "Real-time audio capture pipeline")]
struct Args {
    /// Config file (without extension)
    #[arg(long, default_value = "config/vox-capture")]
    config: String,

    /// WAV file to replay as the capture source
    #[arg(long)]
    input: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let engine = FileEngine::new(&args.input, cfg.audio.buffer_duration_ms, true)?;
    let provider = NatsTranscriptionProvider::new(&cfg.transcription.nats_url);
    let auth = StaticAuthorization::granted();

    let session = AudioCaptureSession::new(
        Box::new(engine),
        Box::new(provider),
        Box::new(auth),
        CaptureConfig {
            recording_dir: PathBuf::from(&cfg.audio.recordings_path),
            meter_gain: cfg.audio.meter_gain,
        },
    );

    let capacity = WaveformRingBuffer::capacity_for_width(
        cfg.waveform.render_width_px,
        cfg.waveform.bar_width_px,
    );
    let waveform = Arc::new(WaveformSampler::spawn(
        session.clone(),
        capacity,
        Duration::from_millis(cfg.waveform.sample_period_ms),
    ));

    let state = AppState::new(session, waveform);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
