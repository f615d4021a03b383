//! WAV-backed clip loading for the engine's clip bank.

use std::path::Path;

use glade_engine::{ClipSource, SourceError};

use crate::wav::{read_wav, resample_linear};

/// Loads `[[clips]]` files as mono WAV, resampled to the soundscape rate.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavClipSource;

impl WavClipSource {
    /// New loader.
    pub fn new() -> Self {
        Self
    }
}

impl ClipSource for WavClipSource {
    fn load(&mut self, path: &Path, sample_rate: u32) -> Result<Vec<f32>, SourceError> {
        let (samples, spec) = read_wav(path)?;
        if spec.sample_rate == sample_rate {
            return Ok(samples);
        }
        tracing::debug!(
            path = %path.display(),
            from = spec.sample_rate,
            to = sample_rate,
            "resampling clip"
        );
        Ok(resample_linear(&samples, spec.sample_rate, sample_rate))
    }
}
