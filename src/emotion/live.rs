use anyhow::{Context, Result};
use tracing::info;

use crate::audio::capture::{self, CaptureConfig};
use crate::config::PipelineConfig;

use super::features;
use super::label::Emotion;
use super::model::EmotionModel;

/// Capture one clip from the default input device and classify it.
///
/// Blocks until the configured duration of audio has been buffered. Runs
/// the same feature pipeline as the corpus loader before querying the model.
pub fn record_and_predict(model: &EmotionModel, config: &PipelineConfig) -> Result<Emotion> {
    let capture = CaptureConfig::new(features::TARGET_SAMPLE_RATE, config.capture_duration);
    info!(
        duration_secs = config.capture_duration.as_secs_f64(),
        sample_rate = capture.sample_rate,
        "recording from default input device"
    );
    let clip = capture::record_clip(&capture).context("microphone capture failed")?;
    info!(
        samples = clip.samples.len(),
        captured_secs = clip.duration_secs(),
        "capture complete"
    );
    let feature = features::waveform_features(&clip)
        .context("failed to extract features from captured audio")?;
    model.predict(&feature)
}
