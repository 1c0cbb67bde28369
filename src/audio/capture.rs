use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, ensure, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use tracing::warn;

use crate::audio::resample;
use crate::types::AudioData;

/// How many mono chunks may queue between the audio callback and the collector.
const CHANNEL_CAPACITY: usize = 64;
const RECV_TIMEOUT_MS: u64 = 50;

#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub device_name: Option<String>,
    pub sample_rate: u32,
    pub duration: Duration,
}

impl CaptureConfig {
    pub fn new(sample_rate: u32, duration: Duration) -> Self {
        Self {
            device_name: None,
            sample_rate,
            duration,
        }
    }
}

/// Record a fixed-duration mono clip, blocking until enough frames arrived.
///
/// The stream runs at the device's native configuration; the collected
/// waveform is resampled to `config.sample_rate` before returning.
pub fn record_clip(config: &CaptureConfig) -> Result<AudioData> {
    let device = select_device(config.device_name.as_deref())?;
    let supported = device
        .default_input_config()
        .context("failed to query default input config")?;
    let stream_config = StreamConfig {
        channels: supported.channels(),
        sample_rate: supported.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };
    let device_rate = stream_config.sample_rate.0;

    let (sender, receiver) = mpsc::sync_channel::<Vec<f32>>(CHANNEL_CAPACITY);
    let done = Arc::new(AtomicBool::new(false));
    let stream = build_stream(
        &device,
        &stream_config,
        supported.sample_format(),
        sender,
        done.clone(),
    )?;

    let frames_needed = frames_for(config.duration, device_rate);
    let raw = collect(stream, receiver, &done, frames_needed)?;

    let samples = if device_rate == config.sample_rate {
        raw
    } else {
        resample::linear_resample(&raw, device_rate, config.sample_rate)?
    };
    Ok(AudioData {
        samples,
        sample_rate: config.sample_rate,
    })
}

fn select_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    match name {
        Some(wanted) => host
            .input_devices()
            .context("listing input devices failed")?
            .find(|device| device.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| anyhow!("input device '{}' not found", wanted)),
        None => host
            .default_input_device()
            .context("no default input device available"),
    }
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    format: SampleFormat,
    sender: SyncSender<Vec<f32>>,
    done: Arc<AtomicBool>,
) -> Result<Stream> {
    match format {
        SampleFormat::F32 => typed_stream(device, config, sender, done, |s: f32| s),
        SampleFormat::I16 => typed_stream(device, config, sender, done, i16_to_f32),
        SampleFormat::U16 => typed_stream(device, config, sender, done, u16_to_f32),
        other => Err(anyhow!("unsupported input sample format {:?}", other)),
    }
}

fn typed_stream<T, F>(
    device: &Device,
    config: &StreamConfig,
    sender: SyncSender<Vec<f32>>,
    done: Arc<AtomicBool>,
    convert: F,
) -> Result<Stream>
where
    T: cpal::SizedSample,
    F: Fn(T) -> f32 + Send + 'static,
{
    let channels = (config.channels as usize).max(1);
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if done.load(Ordering::Relaxed) {
                    return;
                }
                let mut mono = Vec::with_capacity(data.len() / channels);
                for frame in data.chunks(channels) {
                    let sum: f32 = frame.iter().map(|&s| convert(s)).sum();
                    mono.push(sum / frame.len() as f32);
                }
                let _ = sender.try_send(mono);
            },
            |err| warn!(error = %err, "audio input stream error"),
            None,
        )
        .context("failed to build input stream")
}

fn collect(
    stream: Stream,
    receiver: Receiver<Vec<f32>>,
    done: &Arc<AtomicBool>,
    frames_needed: usize,
) -> Result<Vec<f32>> {
    stream.play().context("failed to start capture stream")?;
    let mut collected = Vec::with_capacity(frames_needed);
    while collected.len() < frames_needed {
        match receiver.recv_timeout(Duration::from_millis(RECV_TIMEOUT_MS)) {
            Ok(chunk) => {
                let remaining = frames_needed - collected.len();
                collected.extend(chunk.into_iter().take(remaining));
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    done.store(true, Ordering::SeqCst);
    stream.pause().ok();
    ensure!(
        collected.len() >= frames_needed,
        "capture stream ended after {} of {} frames",
        collected.len(),
        frames_needed
    );
    Ok(collected)
}

fn frames_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * sample_rate as f64).ceil() as usize
}

fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / i16::MAX as f32
}

fn u16_to_f32(sample: u16) -> f32 {
    sample as f32 / u16::MAX as f32 * 2.0 - 1.0
}
