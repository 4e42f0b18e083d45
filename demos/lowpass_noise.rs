//! Plays white noise through a low-pass filter, then drops the cutoff.
//!
//! Usage: cargo run --example lowpass_noise [cutoff_hz]

use anyhow::Result;
use biquad_lpf::{LowPassConfig, LowPassFilter, SampleFormat};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample, StreamConfig};
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn main() -> Result<()> {
    let cutoff: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u32>())
        .transpose()?
        .unwrap_or(1000);

    // Setup audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;

    let config = device.default_output_config()?;
    let lpf_config = LowPassConfig::new(
        SampleFormat::F32,
        config.channels() as u32,
        config.sample_rate().0,
        cutoff,
    );
    let lpf = Arc::new(Mutex::new(LowPassFilter::new(&lpf_config)?));

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => create_noise_stream::<f32>(&device, &config.into(), lpf.clone())?,
        cpal::SampleFormat::I16 => create_noise_stream::<i16>(&device, &config.into(), lpf.clone())?,
        cpal::SampleFormat::U16 => create_noise_stream::<u16>(&device, &config.into(), lpf.clone())?,
        sample_format => {
            return Err(anyhow::anyhow!(
                "Unsupported sample format: {}",
                sample_format
            ));
        }
    };
    stream.play()?;

    println!("White noise through a {} Hz low-pass", cutoff);
    std::thread::sleep(Duration::from_secs(3));

    // History carries over, so the switch is not click-free
    let darker = LowPassConfig {
        cutoff_frequency: (cutoff / 4).max(1),
        ..lpf_config
    };
    lpf.lock().unwrap().reinit(&darker)?;
    println!("Cutoff lowered to {} Hz", darker.cutoff_frequency);
    std::thread::sleep(Duration::from_secs(3));

    Ok(())
}

/// Creates a stream that fills each callback with filtered noise.
fn create_noise_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    lpf: Arc<Mutex<LowPassFilter>>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut rng = rand::rngs::StdRng::from_entropy();
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0);
            for sample in scratch.iter_mut() {
                *sample = rng.gen_range(-0.25..=0.25);
            }

            let frame_count = data.len() / channels;
            if let Err(err) = lpf.lock().unwrap().process_in_place(&mut scratch, frame_count) {
                eprintln!("Filter error: {}", err);
            }

            for (out, &sample) in data.iter_mut().zip(&scratch) {
                *out = T::from_sample(sample);
            }
        },
        |err| eprintln!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}
