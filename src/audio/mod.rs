pub mod engine;
pub mod file;
pub mod meter;
pub mod waveform;

pub use engine::{AudioEngine, AudioFormat, AudioFrame};
pub use file::FileEngine;
pub use meter::{rms, LevelMeter};
pub use waveform::{WaveformRingBuffer, WaveformSampler};
