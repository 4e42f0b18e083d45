//! Low-pass filters a WAV file.
//!
//! Usage: cargo run --example lowpass_wav --features wav -- <input.wav> <output.wav> [cutoff_hz]

use anyhow::{Context, Result};
use biquad_lpf::wav::lowpass_wav_file;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next().context("missing input path")?;
    let output = args.next().context("missing output path")?;
    let cutoff: u32 = match args.next() {
        Some(arg) => arg.parse()?,
        None => 1000,
    };

    lowpass_wav_file(&input, &output, cutoff).map_err(|err| anyhow::anyhow!(err))?;
    println!("Wrote {} ({} Hz low-pass of {})", output, cutoff, input);

    Ok(())
}
