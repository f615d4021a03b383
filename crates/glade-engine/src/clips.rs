//! Immutable clip table built once at startup.
//!
//! Every clip is stored as mono `f32` samples at the soundscape sample rate
//! and shared with the audio thread through `Arc<[f32]>`. Other managers
//! address clips by [`ClipId`] only.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glade_config::{SoundscapeConfig, ToneConfig};
use glade_core::ClipId;
use glade_synth::SineOscillator;

use crate::error::{EngineError, Result, SourceError};

/// Fade applied to both ends of a generated tone, in seconds.
const TONE_FADE_SECS: f32 = 0.005;

/// Loads file-backed clips.
///
/// Implementations return mono samples resampled to `sample_rate`.
pub trait ClipSource {
    /// Load the clip at `path`.
    fn load(&mut self, path: &Path, sample_rate: u32) -> std::result::Result<Vec<f32>, SourceError>;
}

/// A [`ClipSource`] that refuses every file, for tone-only soundscapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TonesOnly;

impl ClipSource for TonesOnly {
    fn load(&mut self, path: &Path, _sample_rate: u32) -> std::result::Result<Vec<f32>, SourceError> {
        Err(format!("no loader for file clip {}", path.display()).into())
    }
}

/// Named mono clips at a single sample rate.
#[derive(Debug, Clone)]
pub struct ClipBank {
    sample_rate: u32,
    names: Vec<String>,
    samples: Vec<Arc<[f32]>>,
    index: HashMap<String, ClipId>,
}

impl ClipBank {
    /// Empty bank.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            names: Vec::new(),
            samples: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build every `[[clips]]` entry of `config`.
    pub fn from_config(config: &SoundscapeConfig, source: &mut impl ClipSource) -> Result<Self> {
        let mut bank = Self::new(config.sample_rate);
        for clip in &config.clips {
            let samples = match (config.resolve_clip_path(clip), &clip.tone) {
                (Some(path), _) => source
                    .load(&path, config.sample_rate)
                    .map_err(|e| EngineError::clip_load(&clip.name, e))?,
                (None, Some(tone)) => render_tone(tone, config.sample_rate),
                (None, None) => {
                    return Err(EngineError::clip_load(&clip.name, "clip has no source"));
                }
            };
            tracing::debug!(clip = %clip.name, frames = samples.len(), "clip loaded");
            bank.insert(clip.name.clone(), samples);
        }
        tracing::info!(clips = bank.len(), sample_rate = bank.sample_rate, "clip bank ready");
        Ok(bank)
    }

    /// Add a clip, replacing the samples of an existing clip with the same name.
    pub fn insert(&mut self, name: impl Into<String>, samples: Vec<f32>) -> ClipId {
        let name = name.into();
        if let Some(&id) = self.index.get(&name) {
            self.samples[usize::from(id.0)] = samples.into();
            return id;
        }
        let id = ClipId(self.names.len() as u16);
        self.names.push(name.clone());
        self.samples.push(samples.into());
        self.index.insert(name, id);
        id
    }

    /// Sample rate of every clip.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the bank holds no clips.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Id of a clip by name, if present.
    pub fn get(&self, name: &str) -> Option<ClipId> {
        self.index.get(name).copied()
    }

    /// Id of a clip by name.
    pub fn id(&self, name: &str) -> Result<ClipId> {
        self.get(name)
            .ok_or_else(|| EngineError::UnknownClip(name.to_string()))
    }

    /// Ids for a list of names.
    pub fn ids(&self, names: &[String]) -> Result<Vec<ClipId>> {
        names.iter().map(|n| self.id(n)).collect()
    }

    /// Name of a clip.
    pub fn name(&self, id: ClipId) -> Option<&str> {
        self.names.get(usize::from(id.0)).map(String::as_str)
    }

    /// Samples of a clip.
    pub fn samples(&self, id: ClipId) -> Option<&Arc<[f32]>> {
        self.samples.get(usize::from(id.0))
    }

    /// Length of a clip in seconds, 0 for unknown ids.
    pub fn length_secs(&self, id: ClipId) -> f32 {
        match self.samples(id) {
            Some(s) if self.sample_rate > 0 => s.len() as f32 / self.sample_rate as f32,
            _ => 0.0,
        }
    }

    /// Shared sample buffers indexed by `ClipId`, for the mixer.
    pub fn shared(&self) -> Vec<Arc<[f32]>> {
        self.samples.clone()
    }
}

/// Render a procedural tone clip with short fades at both ends.
pub fn render_tone(tone: &ToneConfig, sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let frames = (tone.length_secs * sr).round().max(0.0) as usize;
    let fade = ((TONE_FADE_SECS * sr) as usize).clamp(1, frames.max(1));
    let mut osc = SineOscillator::new(tone.frequency, sr);

    (0..frames)
        .map(|i| {
            let edge = i.min(frames - 1 - i);
            let ramp = (edge as f32 / fade as f32).min(1.0);
            tone.amplitude * ramp * osc.advance()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tone(frequency: f32, length_secs: f32) -> ToneConfig {
        ToneConfig {
            frequency,
            length_secs,
            amplitude: 0.5,
        }
    }

    #[test]
    fn tone_length_and_peak() {
        let samples = render_tone(&tone(100.0, 0.5), 1000);
        assert_eq!(samples.len(), 500);
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.5 + 1e-6 && peak > 0.4, "peak {peak}");
        assert_eq!(samples[0], 0.0);
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut bank = ClipBank::new(48000);
        let a = bank.insert("a", vec![0.0; 10]);
        let b = bank.insert("b", vec![0.0; 20]);
        assert_eq!((a, b), (ClipId(0), ClipId(1)));
        assert_eq!(bank.insert("a", vec![0.0; 5]), a);
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.samples(a).map(|s| s.len()), Some(5));
        assert_eq!(bank.name(b), Some("b"));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let bank = ClipBank::new(48000);
        assert!(matches!(bank.id("rain"), Err(EngineError::UnknownClip(n)) if n == "rain"));
    }

    #[test]
    fn length_uses_bank_rate() {
        let mut bank = ClipBank::new(1000);
        let id = bank.insert("x", vec![0.0; 250]);
        assert_eq!(bank.length_secs(id), 0.25);
        assert_eq!(bank.length_secs(ClipId(9)), 0.0);
    }

    #[test]
    fn tones_only_rejects_files() {
        let config = SoundscapeConfig::from_toml(
            r#"
            [[clips]]
            name = "rain"
            path = "rain.wav"
            [music]
            zones = [{ name = "Out", clip = "rain" }]
            "#,
        )
        .unwrap();
        let err = ClipBank::from_config(&config, &mut TonesOnly).unwrap_err();
        assert!(matches!(err, EngineError::ClipLoad { ref name, .. } if name == "rain"));
    }

    struct Fixed(Vec<PathBuf>);

    impl ClipSource for Fixed {
        fn load(&mut self, path: &Path, _: u32) -> std::result::Result<Vec<f32>, SourceError> {
            self.0.push(path.to_path_buf());
            Ok(vec![0.1; 8])
        }
    }

    #[test]
    fn file_clips_go_through_source() {
        let mut config = SoundscapeConfig::from_toml(
            r#"
            [[clips]]
            name = "rain"
            path = "audio/rain.wav"
            [[clips]]
            name = "hum"
            tone = { frequency = 60.0, length_secs = 0.1 }
            [music]
            zones = [{ name = "Out", clip = "rain" }]
            "#,
        )
        .unwrap();
        config.base_dir = Some(PathBuf::from("/w"));
        let mut source = Fixed(Vec::new());
        let bank = ClipBank::from_config(&config, &mut source).unwrap();
        assert_eq!(source.0, vec![PathBuf::from("/w/audio/rain.wav")]);
        assert_eq!(bank.samples(bank.id("rain").unwrap()).unwrap().len(), 8);
        assert_eq!(bank.samples(bank.id("hum").unwrap()).unwrap().len(), 4800);
    }
}
