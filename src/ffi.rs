//! C ABI for hosts that allocate filter storage themselves.
//!
//! Filter state is opaque to the host. Allocate at least
//! [`biquad_size`] / [`lpf_size`] bytes aligned to [`biquad_align`] /
//! [`lpf_align`] and hand the pointer to the `*_init` functions; the field
//! layout of `Biquad` and `LowPassFilter` is not part of the ABI.
//!
//! Configurations do cross the ABI by value, as [`RawBiquadConfig`] and
//! [`RawLowPassConfig`]. Their sample format is a plain `u32` tag with the
//! [`SampleFormat`] discriminants, so an unknown tag from the host is
//! rejected with [`ResultCode::InvalidArgs`] rather than trusted.
//!
//! Every entry point validates its pointers and reports failure through
//! [`ResultCode`] instead of panicking.

use std::ffi::c_void;
use std::{mem, ptr, slice};

use crate::{
    Biquad, BiquadConfig, Error, LowPassConfig, LowPassFilter, Result, Sample, SampleFormat,
};

/// Status returned by every C entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success = 0,
    InvalidArgs = -2,
}

impl From<Result<()>> for ResultCode {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => ResultCode::Success,
            Err(Error::InvalidArgument(_)) => ResultCode::InvalidArgs,
        }
    }
}

/// Host-side form of [`BiquadConfig`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBiquadConfig {
    /// A [`SampleFormat`] discriminant
    pub format: u32,
    pub channels: u32,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
}

impl TryFrom<&RawBiquadConfig> for BiquadConfig {
    type Error = Error;

    fn try_from(raw: &RawBiquadConfig) -> Result<Self> {
        Ok(BiquadConfig::new(
            SampleFormat::try_from(raw.format)?,
            raw.channels,
            raw.a0,
            raw.a1,
            raw.a2,
            raw.b0,
            raw.b1,
            raw.b2,
        ))
    }
}

/// Host-side form of [`LowPassConfig`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLowPassConfig {
    /// A [`SampleFormat`] discriminant
    pub format: u32,
    pub channels: u32,
    pub sample_rate: u32,
    pub cutoff_frequency: u32,
}

impl TryFrom<&RawLowPassConfig> for LowPassConfig {
    type Error = Error;

    fn try_from(raw: &RawLowPassConfig) -> Result<Self> {
        Ok(LowPassConfig::new(
            SampleFormat::try_from(raw.format)?,
            raw.channels,
            raw.sample_rate,
            raw.cutoff_frequency,
        ))
    }
}

/// Bytes a host must allocate for one `Biquad`.
#[unsafe(no_mangle)]
pub extern "C" fn biquad_size() -> usize {
    mem::size_of::<Biquad>()
}

/// Alignment a host allocation for a `Biquad` must satisfy.
#[unsafe(no_mangle)]
pub extern "C" fn biquad_align() -> usize {
    mem::align_of::<Biquad>()
}

/// Bytes a host must allocate for one `LowPassFilter`.
#[unsafe(no_mangle)]
pub extern "C" fn lpf_size() -> usize {
    mem::size_of::<LowPassFilter>()
}

/// Alignment a host allocation for a `LowPassFilter` must satisfy.
#[unsafe(no_mangle)]
pub extern "C" fn lpf_align() -> usize {
    mem::align_of::<LowPassFilter>()
}

/// Builds a [`RawBiquadConfig`]. No validation; the format tag is checked
/// when the config is used.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn biquad_config_init(
    format: u32,
    channels: u32,
    a0: f64,
    a1: f64,
    a2: f64,
    b0: f64,
    b1: f64,
    b2: f64,
) -> RawBiquadConfig {
    RawBiquadConfig {
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

/// Initializes the biquad at `bq`.
///
/// `*bq` is cleared before `config` is inspected, so it is in a defined
/// state whenever `bq` is non-null, even if this returns an error.
///
/// # Safety
///
/// `bq` must be null or valid for writes of [`biquad_size`] bytes aligned to
/// [`biquad_align`]. `config` must be null or point to a `RawBiquadConfig`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn biquad_init(
    config: *const RawBiquadConfig,
    bq: *mut Biquad,
) -> ResultCode {
    if bq.is_null() {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: non-null and writable per the contract above.
    unsafe { bq.write(Biquad::zeroed()) };

    if config.is_null() {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: both pointers were checked and `*bq` is initialized.
    unsafe { biquad_reinit(config, bq) }
}

/// Replaces the coefficients of an initialized biquad, keeping its history.
///
/// # Safety
///
/// `bq` must be null or point to a `Biquad` initialized by [`biquad_init`].
/// `config` must be null or point to a `RawBiquadConfig`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn biquad_reinit(
    config: *const RawBiquadConfig,
    bq: *mut Biquad,
) -> ResultCode {
    if bq.is_null() || config.is_null() {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: non-null, and valid per the contract above.
    let (config, bq) = unsafe { (&*config, &mut *bq) };
    BiquadConfig::try_from(config)
        .and_then(|config| bq.reinit(&config))
        .into()
}

/// Filters `frame_count` interleaved frames in the biquad's format.
///
/// `frames_out` may be the same pointer as `frames_in`, in which case the
/// frames are filtered in place. A biquad whose last `biquad_init` failed
/// holds no configuration and rejects every call.
///
/// # Safety
///
/// `bq` must be null or point to a `Biquad` that went through
/// [`biquad_init`]. Non-null buffers must be aligned for the configured
/// sample type and hold `frame_count` frames. The buffers must either be
/// identical or not overlap at all.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn biquad_process(
    bq: *mut Biquad,
    frames_out: *mut c_void,
    frames_in: *const c_void,
    frame_count: u64,
) -> ResultCode {
    if bq.is_null() || frames_out.is_null() || frames_in.is_null() {
        return ResultCode::InvalidArgs;
    }
    let Ok(frame_count) = usize::try_from(frame_count) else {
        return ResultCode::InvalidArgs;
    };

    // SAFETY: non-null and initialized per the contract above.
    let bq = unsafe { &mut *bq };

    // Cleared by a failed init
    if !bq.format().is_filterable() || bq.channels() == 0 {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: buffer validity is forwarded from this function's contract.
    let result = match bq.format() {
        SampleFormat::F32 => unsafe { process_raw::<f32>(bq, frames_out, frames_in, frame_count) },
        SampleFormat::S16 => unsafe { process_raw::<i16>(bq, frames_out, frames_in, frame_count) },
        format => {
            // filterable, but without a processing path here
            debug_assert!(false, "no processing path for {:?}", format);
            Err(Error::InvalidArgument("sample format must be f32 or s16"))
        }
    };

    result.into()
}

/// Reinterprets the untyped buffers as `T` and runs the biquad over them.
///
/// # Safety
///
/// Same buffer requirements as [`biquad_process`], with `T` matching the
/// biquad's format.
unsafe fn process_raw<T: Sample>(
    bq: &mut Biquad,
    frames_out: *mut c_void,
    frames_in: *const c_void,
    frame_count: usize,
) -> Result<()> {
    let len = frame_count
        .checked_mul(bq.channels() as usize)
        .ok_or(Error::InvalidArgument("frame_count overflows"))?;

    if ptr::eq(frames_out.cast_const(), frames_in) {
        // SAFETY: one live slice over the shared buffer.
        let frames = unsafe { slice::from_raw_parts_mut(frames_out.cast::<T>(), len) };
        bq.process_in_place(frames, frame_count)
    } else {
        // SAFETY: distinct, non-overlapping buffers of `len` samples each.
        let (frames_out, frames_in) = unsafe {
            (
                slice::from_raw_parts_mut(frames_out.cast::<T>(), len),
                slice::from_raw_parts(frames_in.cast::<T>(), len),
            )
        };
        bq.process(frames_out, frames_in, frame_count)
    }
}

/// Builds a [`RawLowPassConfig`]. No validation.
#[unsafe(no_mangle)]
pub extern "C" fn lpf_config_init(
    format: u32,
    channels: u32,
    sample_rate: u32,
    cutoff_frequency: u32,
) -> RawLowPassConfig {
    RawLowPassConfig {
        format,
        channels,
        sample_rate,
        cutoff_frequency,
    }
}

/// Initializes the low-pass filter at `lpf`.
///
/// Like [`biquad_init`], `*lpf` is cleared before `config` is inspected.
///
/// # Safety
///
/// `lpf` must be null or valid for writes of [`lpf_size`] bytes aligned to
/// [`lpf_align`]. `config` must be null or point to a `RawLowPassConfig`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lpf_init(
    config: *const RawLowPassConfig,
    lpf: *mut LowPassFilter,
) -> ResultCode {
    if lpf.is_null() {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: non-null and writable per the contract above.
    unsafe { lpf.write(LowPassFilter::zeroed()) };

    if config.is_null() {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: checked above, valid per the contract.
    let config = unsafe { &*config };
    LowPassConfig::try_from(config)
        .and_then(|config| LowPassFilter::new(&config))
        // SAFETY: `*lpf` was initialized above.
        .map(|filter| unsafe { *lpf = filter })
        .into()
}

/// Re-derives the coefficients of an initialized low-pass filter.
///
/// # Safety
///
/// `lpf` must be null or point to a `LowPassFilter` initialized by
/// [`lpf_init`]. `config` must be null or point to a `RawLowPassConfig`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lpf_reinit(
    config: *const RawLowPassConfig,
    lpf: *mut LowPassFilter,
) -> ResultCode {
    if lpf.is_null() || config.is_null() {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: non-null, and valid per the contract above.
    let (config, lpf) = unsafe { (&*config, &mut *lpf) };
    LowPassConfig::try_from(config)
        .and_then(|config| lpf.reinit(&config))
        .into()
}

/// Filters `frame_count` frames through the low-pass filter.
///
/// # Safety
///
/// Same requirements as [`biquad_process`], with `lpf` in place of `bq`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lpf_process(
    lpf: *mut LowPassFilter,
    frames_out: *mut c_void,
    frames_in: *const c_void,
    frame_count: u64,
) -> ResultCode {
    if lpf.is_null() {
        return ResultCode::InvalidArgs;
    }

    // SAFETY: non-null and initialized per the contract above.
    let bq: *mut Biquad = unsafe { (*lpf).biquad_mut() };
    // SAFETY: forwarded from this function's contract.
    unsafe { biquad_process(bq, frames_out, frames_in, frame_count) }
}
