//! Biquad filter engine.
//!
//! A [`Biquad`] evaluates the Direct Form I difference equation
//!
//! ```text
//! y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
//! ```
//!
//! over blocks of interleaved frames, keeping a separate delay line for
//! every channel. Coefficients are supplied through a [`BiquadConfig`] and
//! normalized by `a0` when the filter is (re)initialized.

use crate::{Error, MAX_CHANNELS, Result, Sample, SampleFormat};

/// Format, channel count and raw transfer-function coefficients of a biquad.
///
/// The coefficients are stored as given. Normalization by `a0` happens in
/// [`Biquad::reinit`], which is also where the values are validated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BiquadConfig {
    pub format: SampleFormat,
    pub channels: u32,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
}

impl BiquadConfig {
    /// Bundles a format, channel count and six coefficients. No validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use biquad_lpf::{BiquadConfig, SampleFormat};
    ///
    /// // y[n] = x[n] + 0.5 * y[n-1]
    /// let config = BiquadConfig::new(SampleFormat::F32, 2, 1.0, -0.5, 0.0, 1.0, 0.0, 0.0);
    /// assert!(!config.is_identity());
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        format: SampleFormat,
        channels: u32,
        a0: f64,
        a1: f64,
        a2: f64,
        b0: f64,
        b1: f64,
        b2: f64,
    ) -> Self {
        Self {
            format,
            channels,
            a0,
            a1,
            a2,
            b0,
            b1,
            b2,
        }
    }

    /// Whether the coefficients are exactly the identity transform
    /// `(a0, a1, a2, b0, b1, b2) = (1, 0, 0, 1, 0, 0)`.
    pub fn is_identity(&self) -> bool {
        self.a0 == 1.0
            && self.a1 == 0.0
            && self.a2 == 0.0
            && self.b0 == 1.0
            && self.b1 == 0.0
            && self.b2 == 0.0
    }

    fn validate(&self) -> Result<()> {
        if self.a0 == 0.0 {
            return Err(Error::InvalidArgument("a0 must not be zero"));
        }
        if !self.format.is_filterable() {
            return Err(Error::InvalidArgument("sample format must be f32 or s16"));
        }
        if self.channels == 0 || self.channels as usize > MAX_CHANNELS {
            return Err(Error::InvalidArgument(
                "channel count must be between 1 and MAX_CHANNELS",
            ));
        }
        Ok(())
    }
}

/// Delay-line contents of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DelayLine {
    /// Input at n-1
    pub x1: f32,
    /// Input at n-2
    pub x2: f32,
    /// Output at n-1
    pub y1: f32,
    /// Output at n-2
    pub y2: f32,
}

/// A second-order IIR filter over interleaved multi-channel frames.
///
/// History is kept per channel in fixed-size arrays, so processing never
/// allocates. The identity configuration is detected at initialization and
/// takes a copy-only fast path.
///
/// # Examples
///
/// ```
/// use biquad_lpf::{Biquad, BiquadConfig, SampleFormat};
///
/// let config = BiquadConfig::new(SampleFormat::F32, 1, 1.0, -0.5, 0.0, 1.0, 0.0, 0.0);
/// let mut biquad = Biquad::new(&config).unwrap();
///
/// let input = [1.0f32, 0.0, 0.0, 0.0];
/// let mut output = [0.0f32; 4];
/// biquad.process(&mut output, &input, 4).unwrap();
/// assert_eq!(output, [1.0, 0.5, 0.25, 0.125]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Biquad {
    config: BiquadConfig,
    is_passthrough: bool,
    x1: [f32; MAX_CHANNELS],
    x2: [f32; MAX_CHANNELS],
    y1: [f32; MAX_CHANNELS],
    y2: [f32; MAX_CHANNELS],
}

impl Biquad {
    /// Creates a filter with zeroed history and the given coefficients.
    ///
    /// Fails with [`Error::InvalidArgument`] under the same conditions as
    /// [`Biquad::reinit`].
    pub fn new(config: &BiquadConfig) -> Result<Self> {
        let mut biquad = Self::zeroed();
        biquad.reinit(config)?;
        Ok(biquad)
    }

    /// An instance with every field cleared. It has no usable format and
    /// rejects all processing until reinitialized.
    pub(crate) fn zeroed() -> Self {
        Self {
            config: BiquadConfig::default(),
            is_passthrough: false,
            x1: [0.0; MAX_CHANNELS],
            x2: [0.0; MAX_CHANNELS],
            y1: [0.0; MAX_CHANNELS],
            y2: [0.0; MAX_CHANNELS],
        }
    }

    /// Replaces the coefficients of a live filter.
    ///
    /// Fails with [`Error::InvalidArgument`] if `a0` is zero, if the format
    /// is neither f32 nor s16, or if the channel count is 0 or above
    /// [`MAX_CHANNELS`]. A failed call leaves the filter unchanged.
    ///
    /// The delay lines are **not** cleared. Output right after the change is
    /// computed from history produced by the previous coefficients, which can
    /// cause a transient. Build a fresh filter with [`Biquad::new`] when a
    /// clean start is needed.
    pub fn reinit(&mut self, config: &BiquadConfig) -> Result<()> {
        if let Err(err) = config.validate() {
            log::warn!("rejected biquad config {:?}: {}", config, err);
            return Err(err);
        }

        let a0 = config.a0;
        self.is_passthrough = config.is_identity();
        self.config = BiquadConfig {
            a0: 1.0,
            a1: config.a1 / a0,
            a2: config.a2 / a0,
            b0: config.b0 / a0,
            b1: config.b1 / a0,
            b2: config.b2 / a0,
            ..*config
        };

        log::debug!(
            "biquad configured: format={:?} channels={} passthrough={} b=({}, {}, {}) a=(1, {}, {})",
            self.config.format,
            self.config.channels,
            self.is_passthrough,
            self.config.b0,
            self.config.b1,
            self.config.b2,
            self.config.a1,
            self.config.a2,
        );

        Ok(())
    }

    /// Filters `frame_count` interleaved frames from `frames_in` into
    /// `frames_out`.
    ///
    /// `T` must match the configured format and both slices must hold at
    /// least `frame_count * channels` samples, otherwise
    /// [`Error::InvalidArgument`] is returned and nothing is written.
    /// In passthrough mode the input is copied verbatim and the delay lines
    /// are left alone.
    pub fn process<T: Sample>(
        &mut self,
        frames_out: &mut [T],
        frames_in: &[T],
        frame_count: usize,
    ) -> Result<()> {
        let len = self.sample_count::<T>(frame_count)?;
        if frames_out.len() < len || frames_in.len() < len {
            return Err(Error::InvalidArgument(
                "buffer shorter than frame_count frames",
            ));
        }
        let frames_out = &mut frames_out[..len];
        let frames_in = &frames_in[..len];

        if self.is_passthrough {
            frames_out.copy_from_slice(frames_in);
            return Ok(());
        }

        let channels = self.config.channels as usize;
        for (frame_out, frame_in) in frames_out
            .chunks_exact_mut(channels)
            .zip(frames_in.chunks_exact(channels))
        {
            for (c, (y, x)) in frame_out.iter_mut().zip(frame_in).enumerate() {
                *y = T::from_f64(self.tick(c, x.to_f64()));
            }
        }

        Ok(())
    }

    /// Filters `frame_count` interleaved frames in place.
    ///
    /// Produces exactly the samples [`Biquad::process`] would for the same
    /// input. In passthrough mode this is a no-op.
    pub fn process_in_place<T: Sample>(
        &mut self,
        frames: &mut [T],
        frame_count: usize,
    ) -> Result<()> {
        let len = self.sample_count::<T>(frame_count)?;
        if frames.len() < len {
            return Err(Error::InvalidArgument(
                "buffer shorter than frame_count frames",
            ));
        }

        if self.is_passthrough {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        for frame in frames[..len].chunks_exact_mut(channels) {
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = T::from_f64(self.tick(c, sample.to_f64()));
            }
        }

        Ok(())
    }

    /// Number of samples covered by `frame_count` frames of type `T`.
    fn sample_count<T: Sample>(&self, frame_count: usize) -> Result<usize> {
        if T::FORMAT != self.config.format {
            return Err(Error::InvalidArgument(
                "sample type does not match the configured format",
            ));
        }
        frame_count
            .checked_mul(self.config.channels as usize)
            .ok_or(Error::InvalidArgument("frame_count overflows"))
    }

    /// Runs one sample of channel `c` through the filter and shifts its
    /// delay line. State is kept in `f32`, math runs in `f64`.
    #[inline]
    fn tick(&mut self, c: usize, x0: f64) -> f64 {
        let (a1, a2) = (self.config.a1, self.config.a2);
        let (b0, b1, b2) = (self.config.b0, self.config.b1, self.config.b2);

        let x1 = self.x1[c] as f64;
        let x2 = self.x2[c] as f64;
        let y1 = self.y1[c] as f64;
        let y2 = self.y2[c] as f64;

        let y0 = b0 * x0 + b1 * x1 + b2 * x2 - a1 * y1 - a2 * y2;

        self.x2[c] = x1 as f32;
        self.x1[c] = x0 as f32;
        self.y2[c] = y1 as f32;
        self.y1[c] = y0 as f32;

        y0
    }

    /// The active coefficients, normalized so that `a0 == 1`.
    pub fn config(&self) -> &BiquadConfig {
        &self.config
    }

    pub fn format(&self) -> SampleFormat {
        self.config.format
    }

    pub fn channels(&self) -> u32 {
        self.config.channels
    }

    /// Whether the filter is configured as the identity and skips processing.
    pub fn is_passthrough(&self) -> bool {
        self.is_passthrough
    }

    /// The history of `channel`, or `None` past the configured channel count.
    pub fn delay_line(&self, channel: usize) -> Option<DelayLine> {
        (channel < self.config.channels as usize).then(|| DelayLine {
            x1: self.x1[channel],
            x2: self.x2[channel],
            y1: self.y1[channel],
            y2: self.y2[channel],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(format: SampleFormat, channels: u32) -> BiquadConfig {
        BiquadConfig::new(format, channels, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// y[n] = x[n] + 0.5 * y[n-1], exact in f32
    fn one_pole(format: SampleFormat, channels: u32) -> BiquadConfig {
        BiquadConfig::new(format, channels, 1.0, -0.5, 0.0, 1.0, 0.0, 0.0)
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_config_new_stores_values() {
        let config = BiquadConfig::new(SampleFormat::S16, 3, 2.0, 0.1, 0.2, 0.3, 0.4, 0.5);
        assert_eq!(config.format, SampleFormat::S16);
        assert_eq!(config.channels, 3);
        assert_eq!(
            (config.a0, config.a1, config.a2, config.b0, config.b1, config.b2),
            (2.0, 0.1, 0.2, 0.3, 0.4, 0.5)
        );
    }

    #[test]
    fn test_identity_enables_passthrough() {
        let biquad = Biquad::new(&identity(SampleFormat::F32, 2)).unwrap();
        assert!(biquad.is_passthrough());

        let biquad = Biquad::new(&one_pole(SampleFormat::F32, 2)).unwrap();
        assert!(!biquad.is_passthrough());
    }

    #[test]
    fn test_scaled_identity_is_not_passthrough() {
        // Normalizes to the identity but is not the identity before normalization
        let config = BiquadConfig::new(SampleFormat::F32, 1, 2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let biquad = Biquad::new(&config).unwrap();
        assert!(!biquad.is_passthrough());
    }

    #[test]
    fn test_passthrough_copies_input() {
        let mut biquad = Biquad::new(&identity(SampleFormat::F32, 2)).unwrap();
        let input = [0.1f32, -0.2, 0.3, -0.4, f32::MAX, f32::MIN_POSITIVE];
        let mut output = [0.0f32; 6];

        biquad.process(&mut output, &input, 3).unwrap();

        for (o, i) in output.iter().zip(&input) {
            assert_eq!(o.to_bits(), i.to_bits());
        }
        assert_eq!(biquad.delay_line(0), Some(DelayLine::default()));
    }

    #[test]
    fn test_passthrough_in_place_is_noop() {
        let mut biquad = Biquad::new(&identity(SampleFormat::S16, 1)).unwrap();
        let mut frames = [1i16, -2, 3, i16::MIN, i16::MAX];

        biquad.process_in_place(&mut frames, 5).unwrap();

        assert_eq!(frames, [1, -2, 3, i16::MIN, i16::MAX]);
        assert_eq!(biquad.delay_line(0), Some(DelayLine::default()));
    }

    #[test]
    fn test_normalization() {
        let config = BiquadConfig::new(SampleFormat::F32, 1, 4.0, 1.0, -2.0, 0.5, 3.0, -8.0);
        let biquad = Biquad::new(&config).unwrap();
        let stored = biquad.config();

        assert_eq!(stored.a0, 1.0);
        assert!(approx_eq(stored.a1, 1.0 / 4.0));
        assert!(approx_eq(stored.a2, -2.0 / 4.0));
        assert!(approx_eq(stored.b0, 0.5 / 4.0));
        assert!(approx_eq(stored.b1, 3.0 / 4.0));
        assert!(approx_eq(stored.b2, -8.0 / 4.0));
    }

    #[test]
    fn test_zero_a0_rejected() {
        let config = BiquadConfig::new(SampleFormat::F32, 1, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert!(matches!(
            Biquad::new(&config),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_failed_reinit_keeps_previous_state() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 1)).unwrap();
        let mut frames = [1.0f32, 0.0];
        biquad.process_in_place(&mut frames, 2).unwrap();
        let before = biquad.clone();

        let zero_a0 = BiquadConfig::new(SampleFormat::F32, 1, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert!(biquad.reinit(&zero_a0).is_err());
        assert_eq!(biquad, before);

        assert!(biquad.reinit(&one_pole(SampleFormat::S32, 1)).is_err());
        assert_eq!(biquad, before);
    }

    #[test]
    fn test_unsupported_formats_rejected() {
        for format in [
            SampleFormat::Unknown,
            SampleFormat::U8,
            SampleFormat::S24,
            SampleFormat::S32,
        ] {
            assert!(
                Biquad::new(&one_pole(format, 1)).is_err(),
                "{:?} should be rejected",
                format
            );
        }
    }

    #[test]
    fn test_channel_bounds() {
        assert!(Biquad::new(&one_pole(SampleFormat::F32, 0)).is_err());
        assert!(Biquad::new(&one_pole(SampleFormat::F32, MAX_CHANNELS as u32 + 1)).is_err());
        assert!(Biquad::new(&one_pole(SampleFormat::F32, MAX_CHANNELS as u32)).is_ok());
    }

    #[test]
    fn test_impulse_response_f32() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 1)).unwrap();
        let input = [1.0f32, 0.0, 0.0, 0.0, 0.0];
        let mut output = [0.0f32; 5];

        biquad.process(&mut output, &input, 5).unwrap();

        assert_eq!(output, [1.0, 0.5, 0.25, 0.125, 0.0625]);
    }

    #[test]
    fn test_impulse_response_s16_truncates() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::S16, 1)).unwrap();
        let input = [16384i16, 0, 0, 0];
        let mut output = [0i16; 4];

        biquad.process(&mut output, &input, 4).unwrap();

        // 0.5, 0.25, 0.125, 0.0625 scaled by 32767 and truncated
        assert_eq!(output, [16383, 8191, 4095, 2047]);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 2)).unwrap();
        let input = [1.0f32, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut output = [0.0f32; 6];

        biquad.process(&mut output, &input, 3).unwrap();

        assert_eq!(output, [1.0, 0.0, 0.5, 0.0, 0.25, 0.0]);
        assert_eq!(biquad.delay_line(1), Some(DelayLine::default()));
    }

    #[test]
    fn test_delay_line_tracks_history() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 1)).unwrap();
        let mut frames = [1.0f32, 0.25];
        biquad.process_in_place(&mut frames, 2).unwrap();

        // y = [1.0, 0.25 + 0.5]
        assert_eq!(
            biquad.delay_line(0),
            Some(DelayLine {
                x1: 0.25,
                x2: 1.0,
                y1: 0.75,
                y2: 1.0,
            })
        );
        assert_eq!(biquad.delay_line(1), None);
    }

    #[test]
    fn test_in_place_matches_two_buffers() {
        let config = BiquadConfig::new(SampleFormat::F32, 2, 1.2, -0.9, 0.3, 0.4, 0.2, 0.1);
        let input: Vec<f32> = (0..64).map(|i| ((i * 37 % 17) as f32 - 8.0) / 9.0).collect();

        let mut a = Biquad::new(&config).unwrap();
        let mut separate = vec![0.0f32; input.len()];
        a.process(&mut separate, &input, 32).unwrap();

        let mut b = Biquad::new(&config).unwrap();
        let mut in_place = input.clone();
        b.process_in_place(&mut in_place, 32).unwrap();

        assert_eq!(separate, in_place);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reinit_keeps_history() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 2)).unwrap();
        let mut frames = [1.0f32, -1.0, 0.5, 0.25];
        biquad.process_in_place(&mut frames, 2).unwrap();
        let history: Vec<_> = (0..2).map(|c| biquad.delay_line(c)).collect();

        let other = BiquadConfig::new(SampleFormat::F32, 2, 2.0, 0.3, 0.1, 0.5, 0.5, 0.5);
        biquad.reinit(&other).unwrap();

        let after: Vec<_> = (0..2).map(|c| biquad.delay_line(c)).collect();
        assert_eq!(history, after);
        assert_ne!(history[0], Some(DelayLine::default()));
    }

    #[test]
    fn test_reinit_toggles_passthrough() {
        let mut biquad = Biquad::new(&identity(SampleFormat::F32, 1)).unwrap();
        assert!(biquad.is_passthrough());

        biquad.reinit(&one_pole(SampleFormat::F32, 1)).unwrap();
        assert!(!biquad.is_passthrough());

        biquad.reinit(&identity(SampleFormat::F32, 1)).unwrap();
        assert!(biquad.is_passthrough());
    }

    #[test]
    fn test_passthrough_does_not_touch_history() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 1)).unwrap();
        let mut frames = [1.0f32];
        biquad.process_in_place(&mut frames, 1).unwrap();
        let history = biquad.delay_line(0);

        biquad.reinit(&identity(SampleFormat::F32, 1)).unwrap();
        let mut frames = [0.3f32, 0.7];
        biquad.process_in_place(&mut frames, 2).unwrap();
        assert_eq!(biquad.delay_line(0), history);

        // Leaving passthrough resumes from the history recorded before it
        biquad.reinit(&one_pole(SampleFormat::F32, 1)).unwrap();
        let mut frames = [0.0f32];
        biquad.process_in_place(&mut frames, 1).unwrap();
        assert_eq!(frames, [0.5]);
    }

    #[test]
    fn test_sample_type_mismatch() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::S16, 1)).unwrap();
        let mut frames = [0.5f32];
        assert!(matches!(
            biquad.process_in_place(&mut frames, 1),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(biquad.delay_line(0), Some(DelayLine::default()));
    }

    #[test]
    fn test_short_buffers_rejected() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 2)).unwrap();
        let input = [1.0f32; 4];
        let mut output = [0.0f32; 4];

        assert!(biquad.process(&mut output, &input, 3).is_err());
        assert!(biquad.process(&mut output[..3], &input, 2).is_err());
        assert!(biquad.process_in_place(&mut output, 3).is_err());
        assert_eq!(output, [0.0; 4]);
        assert_eq!(biquad.delay_line(0), Some(DelayLine::default()));
    }

    #[test]
    fn test_zero_frames_is_ok() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 1)).unwrap();
        let mut output: [f32; 0] = [];
        assert!(biquad.process(&mut output, &[], 0).is_ok());
    }

    #[test]
    fn test_longer_buffers_only_touch_frame_count() {
        let mut biquad = Biquad::new(&one_pole(SampleFormat::F32, 1)).unwrap();
        let input = [1.0f32, 1.0, 1.0];
        let mut output = [9.0f32; 3];

        biquad.process(&mut output, &input, 2).unwrap();

        assert_eq!(output, [1.0, 1.5, 9.0]);
    }
}
