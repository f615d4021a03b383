//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use glade_config::SoundscapeConfig;
use glade_engine::ClipBank;
use glade_io::WavClipSource;
use std::path::Path;

/// Load a config file and every clip it names.
pub fn load_soundscape(path: &Path) -> anyhow::Result<(SoundscapeConfig, ClipBank)> {
    let config = SoundscapeConfig::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let clips = ClipBank::from_config(&config, &mut WavClipSource::new())?;
    Ok((config, clips))
}

/// Parse a positive number of seconds for clap's `value_parser`.
pub fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("Invalid duration: '{}' (expected seconds)", s))?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(format!("Duration must be positive, got {}", s))
    }
}
