//! Core waveform type shared by the decode, capture, and feature paths.

/// Decoded mono audio (f32 samples, normalized to [-1.0, 1.0]).
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 22050)
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f64 / self.sample_rate as f64
        }
    }
}
