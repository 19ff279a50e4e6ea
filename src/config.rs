use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
    pub waveform: WaveformConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub recordings_path: String,
    pub buffer_duration_ms: u64,
    pub meter_gain: f32,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    pub nats_url: String,
}

#[derive(Debug, Deserialize)]
pub struct WaveformConfig {
    pub render_width_px: u32,
    pub bar_width_px: u32,
    pub sample_period_ms: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
