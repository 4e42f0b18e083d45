//! biquad-lpf - Streaming biquad and low-pass filters for Rust audio pipelines
//!
//! This library provides a second-order IIR filter engine and an RBJ low-pass
//! filter built on top of it, processing interleaved f32 or s16 frames in
//! caller-owned buffers without allocating.

mod error;
mod format;
mod sample;

pub mod ffi;
pub mod filters;
#[cfg(feature = "wav")]
pub mod wav;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
pub use filters::{Biquad, BiquadConfig, DelayLine, LowPassConfig, LowPassFilter};
pub use format::{MAX_CHANNELS, SampleFormat};
pub use sample::Sample;
