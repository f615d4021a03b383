//! WAV clip import and render export via hound.
//!
//! Clips are always brought in as mono: the clip mixer duplicates each voice
//! across output channels itself. Renders go out interleaved.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Channel layout, rate and bit depth of a WAV file.
///
/// 32-bit files are float; 16 and 24-bit files are integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl WavSpec {
    fn is_float(self) -> bool {
        self.bits_per_sample == 32
    }

    /// Integer full scale for this bit depth.
    fn full_scale(self) -> f32 {
        (1u32 << (self.bits_per_sample.clamp(2, 32) - 1)) as f32
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(h: hound::WavSpec) -> Self {
        Self {
            channels: h.channels,
            sample_rate: h.sample_rate,
            bits_per_sample: h.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(s: WavSpec) -> Self {
        Self {
            channels: s.channels,
            sample_rate: s.sample_rate,
            bits_per_sample: s.bits_per_sample,
            sample_format: if s.is_float() {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Load a WAV file as mono `f32` samples in `[-1, 1]`.
///
/// Multi-channel frames are averaged. Returns the file's own spec so callers
/// can resample.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let format = reader.spec().sample_format;
    let spec = WavSpec::from(reader.spec());

    let interleaved = if format == SampleFormat::Float {
        reader.into_samples::<f32>().collect::<hound::Result<Vec<_>>>()?
    } else {
        let scale = spec.full_scale().recip();
        reader
            .into_samples::<i32>()
            .map(|s| s.map(|v| v as f32 * scale))
            .collect::<hound::Result<Vec<_>>>()?
    };

    Ok((downmix(interleaved, usize::from(spec.channels)), spec))
}

fn downmix(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    let norm = (channels as f32).recip();
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() * norm)
        .collect()
}

/// Save interleaved samples.
///
/// `samples.len()` should be a multiple of `spec.channels`. Integer depths
/// clip at full scale; float output is written unclipped.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let mut writer = WavWriter::create(path, spec.into())?;

    if spec.is_float() {
        samples.iter().try_for_each(|&s| writer.write_sample(s))?;
    } else {
        let full = spec.full_scale();
        samples
            .iter()
            .try_for_each(|&s| writer.write_sample((s * full).clamp(-full, full - 1.0) as i32))?;
    }

    writer.finalize()?;
    Ok(())
}

/// Convert mono audio between sample rates by linear interpolation.
///
/// Identity when the rates match or either rate is 0.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let out_len = ((samples.len() as f64) / ratio).round() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx];
            let b = samples[(idx + 1).min(last)];
            a + (b - a) * frac
        })
        .collect()
}
