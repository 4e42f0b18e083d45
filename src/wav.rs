//! Low-pass filtering of WAV files (requires the `wav` feature).

use std::io::Read;
use std::path::Path;

use crate::{LowPassConfig, LowPassFilter, Sample};

/// Low-pass filters a WAV file and writes the result to `output`.
///
/// The file is processed at its own sample rate and channel count and
/// written back with the same WAV spec. Only 32-bit float and 16-bit integer
/// files are supported, since those are the formats the filter handles
/// natively.
///
/// # Arguments
///
/// * `input` - Path to the source WAV file
/// * `output` - Path of the WAV file to create
/// * `cutoff_frequency` - Cutoff frequency in Hz
///
/// # Examples
///
/// ```ignore
/// use biquad_lpf::wav::lowpass_wav_file;
///
/// lowpass_wav_file("drums.wav", "drums_muffled.wav", 800)?;
/// ```
pub fn lowpass_wav_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    cutoff_frequency: u32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let reader = hound::WavReader::open(input)?;
    let spec = reader.spec();

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => {
            filter_wav::<f32, _>(reader, output.as_ref(), cutoff_frequency)
        }
        (hound::SampleFormat::Int, 16) => {
            filter_wav::<i16, _>(reader, output.as_ref(), cutoff_frequency)
        }
        (format, bits) => Err(format!(
            "unsupported WAV sample format: {}-bit {:?}",
            bits, format
        )
        .into()),
    }
}

fn filter_wav<T, R>(
    reader: hound::WavReader<R>,
    output: &Path,
    cutoff_frequency: u32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    T: Sample + hound::Sample,
    R: Read,
{
    let spec = reader.spec();
    let mut samples: Vec<T> = reader.into_samples::<T>().collect::<Result<_, _>>()?;

    let config = LowPassConfig::new(
        T::FORMAT,
        spec.channels as u32,
        spec.sample_rate,
        cutoff_frequency,
    );
    let mut lpf = LowPassFilter::new(&config)?;

    // A truncated trailing frame is written back unfiltered
    let frame_count = samples.len() / spec.channels as usize;
    lpf.process_in_place(&mut samples, frame_count)?;

    let mut writer = hound::WavWriter::create(output, spec)?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    log::debug!(
        "low-passed {} frames at {} Hz into {}",
        frame_count,
        cutoff_frequency,
        output.display()
    );

    Ok(())
}
