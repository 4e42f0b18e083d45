//! Audio filters for block-based signal processing.
//!
//! The primary building block is [`Biquad`], a second-order IIR section
//! operating on interleaved f32 or s16 frames. [`LowPassFilter`] derives its
//! coefficients from a cutoff frequency using Robert Bristow-Johnson's Audio
//! EQ Cookbook and runs them through an owned [`Biquad`].

mod biquad;
mod lowpass;

pub use self::biquad::{Biquad, BiquadConfig, DelayLine};
pub use self::lowpass::{LowPassConfig, LowPassFilter};
