//! Conversion between stored samples and the filter's `f64` domain.

use crate::SampleFormat;

/// A sample type the biquad engine can read and write.
///
/// Implementors map themselves into the float domain (`-1.0..=1.0` for
/// full-scale signals) and back. The filter math itself always runs in
/// `f64`, so one generic loop covers every format.
pub trait Sample: Copy + Send + Sync + 'static {
    /// The format tag matching this sample type.
    const FORMAT: SampleFormat;

    /// Reads the sample as a float-domain value.
    fn to_f64(self) -> f64;

    /// Converts a float-domain value back into a sample.
    fn from_f64(value: f64) -> Self;
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for i16 {
    const FORMAT: SampleFormat = SampleFormat::S16;

    /// Scales by `1/32768`.
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64 * 0.000030517578125
    }

    /// Scales by `32767` and truncates toward zero.
    ///
    /// There is no clamping step. Values outside the `i16` range saturate
    /// through the `as` conversion, and NaN becomes 0.
    #[inline]
    fn from_f64(value: f64) -> Self {
        (value * 32767.0) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        assert_eq!(<f32 as Sample>::FORMAT, SampleFormat::F32);
        assert_eq!(<i16 as Sample>::FORMAT, SampleFormat::S16);
    }

    #[test]
    fn test_i16_read_scaling() {
        assert_eq!(i16::MIN.to_f64(), -1.0);
        assert_eq!(16384i16.to_f64(), 0.5);
        assert_eq!(0i16.to_f64(), 0.0);
    }

    #[test]
    fn test_i16_write_truncates() {
        assert_eq!(i16::from_f64(1.0), 32767);
        assert_eq!(i16::from_f64(-1.0), -32767);
        // 0.5 * 32767 = 16383.5, truncated rather than rounded
        assert_eq!(i16::from_f64(0.5), 16383);
        assert_eq!(i16::from_f64(-0.5), -16383);
    }

    #[test]
    fn test_i16_out_of_range_saturates() {
        assert_eq!(i16::from_f64(2.0), i16::MAX);
        assert_eq!(i16::from_f64(-2.0), i16::MIN);
        assert_eq!(i16::from_f64(f64::NAN), 0);
    }

    #[test]
    fn test_f32_is_lossless_for_f32_values() {
        for &v in &[0.0f32, 0.25, -0.75, 1.0, 1e-7] {
            assert_eq!(f32::from_f64(v.to_f64()), v);
        }
    }
}
