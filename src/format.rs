//! Sample formats understood by the host pipeline.

use crate::{Error, Result};

/// Maximum number of channels a single filter instance can process.
///
/// Per-channel delay lines are fixed-size arrays of this length, so no
/// allocation happens when a filter is (re)initialized or run.
pub const MAX_CHANNELS: usize = 32;

/// The sample format tag of an interleaved frame buffer.
///
/// Only [`SampleFormat::F32`] and [`SampleFormat::S16`] can be filtered. The
/// other tags exist because the surrounding pipeline uses them, and filters
/// reject them when configured.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    #[default]
    Unknown = 0,
    /// Unsigned 8-bit integer
    U8 = 1,
    /// Signed 16-bit integer
    S16 = 2,
    /// Signed 24-bit integer, tightly packed
    S24 = 3,
    /// Signed 32-bit integer
    S32 = 4,
    /// 32-bit IEEE float
    F32 = 5,
}

impl SampleFormat {
    /// Size of one sample in bytes. `Unknown` has size 0.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Unknown => 0,
            SampleFormat::U8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S24 => 3,
            SampleFormat::S32 => 4,
            SampleFormat::F32 => 4,
        }
    }

    /// Size of one interleaved frame of `channels` samples in bytes.
    pub fn bytes_per_frame(self, channels: u32) -> usize {
        self.bytes_per_sample() * channels as usize
    }

    /// Whether the biquad engine has a processing path for this format.
    pub fn is_filterable(self) -> bool {
        matches!(self, SampleFormat::F32 | SampleFormat::S16)
    }
}

impl TryFrom<u32> for SampleFormat {
    type Error = Error;

    /// Maps a host format tag to a format. Tags past `F32` are rejected.
    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(SampleFormat::Unknown),
            1 => Ok(SampleFormat::U8),
            2 => Ok(SampleFormat::S16),
            3 => Ok(SampleFormat::S24),
            4 => Ok(SampleFormat::S32),
            5 => Ok(SampleFormat::F32),
            _ => Err(Error::InvalidArgument("unknown sample format tag")),
        }
    }
}
