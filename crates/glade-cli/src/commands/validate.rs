//! Config validation command.

use super::common::load_soundscape;
use clap::Args;
use glade_engine::Soundscape;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidateArgs {
    /// Soundscape config (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let (config, clips) = load_soundscape(&args.config)?;
    let clip_count = clips.len();
    let (soundscape, _mixer) = Soundscape::build(&config, clips, config.sample_rate as f32, 0)?;

    println!("{}: OK", args.config.display());
    println!("  Sample rate: {} Hz", config.sample_rate);
    println!("  Clips: {}", clip_count);

    let zones: Vec<_> = soundscape
        .music()
        .zones()
        .iter()
        .map(|z| z.name.as_str())
        .collect();
    println!("  Music zones: {}", zones.join(", "));

    if let Some(zone) = soundscape.effect_zone() {
        println!("  Effect zone: {}", zone.area());
    }
    if !soundscape.emitters().is_empty() {
        let areas: Vec<_> = soundscape.emitters().iter().map(|e| e.area()).collect();
        println!("  Emitter areas: {}", areas.join(", "));
    }

    let targets: Vec<_> = soundscape.click_targets().collect();
    if !targets.is_empty() {
        println!("  Click targets: {}", targets.join(", "));
    }
    Ok(())
}
