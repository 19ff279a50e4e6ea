/// Root-mean-square amplitude of a block of samples.
///
/// Full-scale input (constant ±1.0) yields 1.0. A zero-length block yields
/// 0.0 rather than an error.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Loudness meter producing one scalar reading per frame.
///
/// Stateless apart from the configured gain; readings are clamped to
/// [0.0, 1.0] after gain is applied.
#[derive(Debug, Clone, Copy)]
pub struct LevelMeter {
    gain: f32,
}

impl LevelMeter {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    /// Compute the gained, clamped loudness reading for a block of samples.
    pub fn reading(&self, samples: &[f32]) -> f32 {
        (rms(samples) * self.gain).clamp(0.0, 1.0)
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}
