use std::path::Path;

use anyhow::{ensure, Context, Result};
use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;
use ndarray::{s, Array1, Array2, Axis};

use crate::audio::{decoder, resample};
use crate::types::AudioData;

pub const TARGET_SAMPLE_RATE: u32 = 22_050;
pub const MFCC_COUNT: usize = 40;
/// Every clip is normalized to this many analysis frames before averaging.
pub const FRAME_TARGET: usize = 130;

const FFT_SIZE: usize = 2048;
const HOP_SIZE: usize = 512;
const MEL_BANDS: usize = 128;
const MIN_FREQ: f64 = 20.0;

/// Extract the fixed-length feature vector from an audio file.
pub fn file_features<P: AsRef<Path>>(path: P) -> Result<Array1<f32>> {
    let path = path.as_ref();
    let audio = decoder::decode_file(path)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    waveform_features(&audio)
}

/// Extract the fixed-length feature vector from a decoded waveform.
///
/// Both the corpus loader and the live predictor go through here, so the
/// trained model and live queries always see the same input distribution:
/// resample to 22050 Hz, 40 cepstral coefficient bands over time, frame
/// count normalized to exactly 130, then the per-band mean.
pub fn waveform_features(audio: &AudioData) -> Result<Array1<f32>> {
    let mono = ensure_sample_rate(audio)?;
    ensure!(!mono.is_empty(), "waveform is empty");
    let samples: Vec<f64> = mono.iter().map(|&s| s as f64).collect();

    let stft = spectrum::rstft(&samples, FFT_SIZE, HOP_SIZE, WindowType::Hanning);
    let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
    let power = analysis::make_power_spectrogram(&magnitude);

    let freqs = spectrum::rfftfreq(FFT_SIZE, TARGET_SAMPLE_RATE);
    let filterbank = MelFilterbank::new(
        MIN_FREQ,
        (TARGET_SAMPLE_RATE as f64) / 2.0,
        MEL_BANDS,
        &freqs,
        true,
    );
    let mel = analysis::mel::make_mel_spectrogram(&power, &filterbank);
    let mfcc = analysis::mel::mfcc_spectrogram(&mel, MFCC_COUNT, None);

    let frames = coefficient_frames(&mfcc)?;
    // Zero pad frames stay in the mean: short and long clips are averaged
    // over the same 130-frame horizon.
    let fixed = fix_frame_count(frames, FRAME_TARGET);
    fixed
        .mean_axis(Axis(0))
        .context("coefficient matrix has no frames")
}

fn ensure_sample_rate(audio: &AudioData) -> Result<Vec<f32>> {
    if audio.sample_rate == TARGET_SAMPLE_RATE {
        Ok(audio.samples.clone())
    } else {
        resample::linear_resample(&audio.samples, audio.sample_rate, TARGET_SAMPLE_RATE)
            .with_context(|| {
                format!(
                    "failed to resample audio from {} Hz to {} Hz",
                    audio.sample_rate, TARGET_SAMPLE_RATE
                )
            })
    }
}

/// Densify the frames-by-coefficients rows into one matrix.
fn coefficient_frames(mfcc: &[Vec<f64>]) -> Result<Array2<f32>> {
    ensure!(
        !mfcc.is_empty(),
        "audio too short to produce an analysis frame"
    );
    let coeffs = mfcc[0].len();
    ensure!(
        coeffs == MFCC_COUNT,
        "expected {} coefficients per frame, got {}",
        MFCC_COUNT,
        coeffs
    );
    let mut flat = Vec::with_capacity(mfcc.len() * coeffs);
    for frame in mfcc {
        ensure!(frame.len() == coeffs, "ragged coefficient frame");
        flat.extend(frame.iter().map(|&v| v as f32));
    }
    Array2::from_shape_vec((mfcc.len(), coeffs), flat)
        .context("coefficient matrix shape mismatch")
}

/// Normalize the time axis to exactly `target` frames: right-pad with
/// zero-valued frames, or keep only the first `target`.
pub fn fix_frame_count(frames: Array2<f32>, target: usize) -> Array2<f32> {
    let current = frames.len_of(Axis(0));
    if current == target {
        return frames;
    }
    let coeffs = frames.len_of(Axis(1));
    let keep = current.min(target);
    let mut fixed = Array2::zeros((target, coeffs));
    fixed
        .slice_mut(s![..keep, ..])
        .assign(&frames.slice(s![..keep, ..]));
    fixed
}
