//! # Audio Output Module
//!
//! This module plays keyboard tones through the default output device using
//! CPAL (Cross-Platform Audio Library). Tones are controlled by sending
//! [`ToneCommand`]s over a channel; the audio callback drains the channel
//! without blocking and renders a [`ToneBank`].
//!
//! ## Features
//! - Automatic output device selection
//! - f32 stream configuration closest to 44.1 kHz
//! - Lock-free control from the UI thread via a channel

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;
use log::{error, info};

use crate::synth::{ToneBank, ToneCommand};

/// Preferred output sample rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Starts tone playback on the default output device.
///
/// This function:
/// 1. Selects the default audio output device
/// 2. Picks an f32 stream configuration near [`TARGET_SAMPLE_RATE`]
/// 3. Starts a stream whose callback applies pending commands and renders tones
///
/// # Arguments
/// * `commands` - Channel the tone commands arrive on
/// * `volume` - Initial master volume, 0.0 to 1.0
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Playing stream handle and its sample rate
/// * `Err(e)` - No usable output device or configuration
///
/// The stream stops when the returned handle is dropped.
pub fn start_audio_output(
    commands: Receiver<ToneCommand>,
    volume: f32,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;

    info!("[AUDIO] Using audio output device: {}", device.name()?);

    let configs = device.supported_output_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 output format found"))?;

    let sample_rate = cpal::SampleRate(TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    ));
    let config = supported_config.with_sample_rate(sample_rate);

    let sample_rate_val = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();
    let channels = config.channels as usize;

    info!(
        "[AUDIO] Selected sample rate: {} Hz, {} channel(s)",
        sample_rate_val, channels
    );

    let err_fn = |err| error!("[AUDIO] An error occurred on the output stream: {}", err);

    let mut bank = ToneBank::new(sample_rate_val, volume);

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for command in commands.try_iter() {
                bank.apply(command);
            }
            bank.render(data, channels);
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate_val))
}

/// Finds the best supported output configuration for the target sample rate.
///
/// Only 32-bit float configurations qualify. Among those, the one whose rate
/// range lies closest to `target_rate` wins, stereo before other layouts.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let rate_distance = if (c.min_sample_rate().0..=c.max_sample_rate().0)
                .contains(&target_rate)
            {
                0
            } else {
                let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
                let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
                min_diff.min(max_diff)
            };
            (rate_distance, c.channels() != 2)
        })
}
