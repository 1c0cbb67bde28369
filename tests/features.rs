use emosense::emotion::features::{self, MFCC_COUNT, TARGET_SAMPLE_RATE};
use emosense::types::AudioData;

fn sine_clip(freq: f32, seconds: f32, sample_rate: u32) -> AudioData {
    let count = (seconds * sample_rate as f32) as usize;
    let samples = (0..count)
        .map(|i| {
            (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5
        })
        .collect();
    AudioData {
        samples,
        sample_rate,
    }
}

#[test]
fn feature_vector_length_is_fixed_for_any_duration() {
    for seconds in [0.1_f32, 0.5, 1.0, 4.0] {
        let clip = sine_clip(440.0, seconds, TARGET_SAMPLE_RATE);
        let features = features::waveform_features(&clip).expect("extraction succeeds");
        assert_eq!(features.len(), MFCC_COUNT, "duration {} s", seconds);
    }
}

#[test]
fn extraction_is_deterministic() {
    let clip = sine_clip(330.0, 1.0, TARGET_SAMPLE_RATE);
    let first = features::waveform_features(&clip).expect("first pass");
    let second = features::waveform_features(&clip).expect("second pass");
    assert_eq!(first, second);
}

#[test]
fn frames_beyond_the_truncation_horizon_are_ignored() {
    // 130 frames at hop 512 end well inside 4 s of audio, so a longer clip
    // with the identical leading samples must produce the identical vector.
    let base = sine_clip(220.0, 4.0, TARGET_SAMPLE_RATE);
    let longer = sine_clip(220.0, 5.0, TARGET_SAMPLE_RATE);
    let from_base = features::waveform_features(&base).expect("base clip");
    let from_longer = features::waveform_features(&longer).expect("longer clip");
    assert_eq!(from_base, from_longer);
}

#[test]
fn non_native_sample_rates_are_resampled_first() {
    let clip = sine_clip(440.0, 1.0, 44_100);
    let features = features::waveform_features(&clip).expect("extraction succeeds");
    assert_eq!(features.len(), MFCC_COUNT);
    assert!(features.iter().all(|v| v.is_finite()));
}

#[test]
fn empty_waveform_is_rejected() {
    let clip = AudioData {
        samples: Vec::new(),
        sample_rate: TARGET_SAMPLE_RATE,
    };
    assert!(features::waveform_features(&clip).is_err());
}
