//! Second-order low-pass filter.

use std::f64::consts::PI;

use super::{Biquad, BiquadConfig};
use crate::{Result, Sample, SampleFormat};

/// Parameters of a [`LowPassFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LowPassConfig {
    pub format: SampleFormat,
    pub channels: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Cutoff frequency in Hz
    pub cutoff_frequency: u32,
}

impl LowPassConfig {
    pub fn new(
        format: SampleFormat,
        channels: u32,
        sample_rate: u32,
        cutoff_frequency: u32,
    ) -> Self {
        Self {
            format,
            channels,
            sample_rate,
            cutoff_frequency,
        }
    }

    /// Derives the unnormalized biquad coefficients.
    ///
    /// Uses the Audio EQ Cookbook low-pass with a fixed Butterworth Q of
    /// `1/sqrt(2)`. The cutoff is not checked against Nyquist; a cutoff at or
    /// above `sample_rate / 2` yields degenerate coefficients.
    pub fn biquad_config(&self) -> BiquadConfig {
        let q = 1.0 / 2.0f64.sqrt();
        let w = 2.0 * PI * self.cutoff_frequency as f64 / self.sample_rate as f64;
        let s = w.sin();
        let c = w.cos();
        let alpha = s / (2.0 * q);

        BiquadConfig {
            format: self.format,
            channels: self.channels,
            a0: 1.0 + alpha,
            a1: -2.0 * c,
            a2: 1.0 - alpha,
            b0: (1.0 - c) / 2.0,
            b1: 1.0 - c,
            b2: (1.0 - c) / 2.0,
        }
    }
}

/// A 12 dB/octave low-pass filter over interleaved frames.
///
/// # Examples
///
/// ```
/// use biquad_lpf::{LowPassConfig, LowPassFilter, SampleFormat};
///
/// let config = LowPassConfig::new(SampleFormat::F32, 2, 48000, 1000);
/// let mut lpf = LowPassFilter::new(&config).unwrap();
///
/// let mut frames = vec![0.5f32; 2 * 256];
/// lpf.process_in_place(&mut frames, 256).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LowPassFilter {
    biquad: Biquad,
    config: LowPassConfig,
}

impl LowPassFilter {
    /// Creates a filter for `config`, with cleared history.
    ///
    /// Errors from the underlying [`Biquad`] (unsupported format, channel
    /// count out of range) are returned unchanged.
    pub fn new(config: &LowPassConfig) -> Result<Self> {
        Ok(Self {
            biquad: Biquad::new(&config.biquad_config())?,
            config: *config,
        })
    }

    pub(crate) fn zeroed() -> Self {
        Self {
            biquad: Biquad::zeroed(),
            config: LowPassConfig::default(),
        }
    }

    /// Re-derives the coefficients, e.g. after a cutoff change.
    ///
    /// As with [`Biquad::reinit`], the delay lines carry over to the new
    /// coefficients. On error the filter keeps its previous configuration.
    pub fn reinit(&mut self, config: &LowPassConfig) -> Result<()> {
        self.biquad.reinit(&config.biquad_config())?;
        self.config = *config;
        Ok(())
    }

    /// See [`Biquad::process`].
    pub fn process<T: Sample>(
        &mut self,
        frames_out: &mut [T],
        frames_in: &[T],
        frame_count: usize,
    ) -> Result<()> {
        self.biquad.process(frames_out, frames_in, frame_count)
    }

    /// See [`Biquad::process_in_place`].
    pub fn process_in_place<T: Sample>(
        &mut self,
        frames: &mut [T],
        frame_count: usize,
    ) -> Result<()> {
        self.biquad.process_in_place(frames, frame_count)
    }

    /// The configuration the current coefficients were derived from.
    pub fn config(&self) -> &LowPassConfig {
        &self.config
    }

    pub fn biquad(&self) -> &Biquad {
        &self.biquad
    }

    pub(crate) fn biquad_mut(&mut self) -> &mut Biquad {
        &mut self.biquad
    }
}
