//! Offline render of a scripted session.

use super::common::{load_soundscape, parse_seconds};
use crate::script::Script;
use clap::Args;
use glade_core::AudioRenderable;
use glade_engine::Soundscape;
use glade_io::{WavSpec, write_wav};
use std::path::PathBuf;

/// Seconds rendered after the last cue when no duration is given.
const TAIL_SECS: f64 = 3.0;

#[derive(Args)]
pub struct RenderArgs {
    /// Soundscape config (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Input script (one timed action per line)
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Output WAV file
    #[arg(short, long, default_value = "render.wav")]
    output: PathBuf,

    /// Session length in seconds (default: last cue plus 3 s)
    #[arg(short, long, value_parser = parse_seconds)]
    duration: Option<f64>,

    /// Simulation tick in seconds
    #[arg(long, default_value = "0.016666668", value_parser = parse_seconds)]
    tick: f64,

    /// Random seed for footsteps, variations and pauses
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output bit depth (16, 24, or 32 for float)
    #[arg(long, default_value = "16")]
    bit_depth: u16,

    /// Render a single channel instead of stereo
    #[arg(long)]
    mono: bool,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Unsupported bit depth {} (use 16, 24 or 32)", args.bit_depth);
    }

    let (config, clips) = load_soundscape(&args.config)?;
    let mut script = Script::load(&args.script)?;
    let duration = args.duration.unwrap_or(script.end() + TAIL_SECS);
    let sample_rate = config.sample_rate;
    let channels: u16 = if args.mono { 1 } else { 2 };

    println!(
        "Rendering {:.1}s of {} ({} cues) at {} Hz...",
        duration,
        args.config.display(),
        script.cues().len(),
        sample_rate
    );

    let (mut soundscape, mut mixer) =
        Soundscape::build(&config, clips, sample_rate as f32, args.seed)?;
    let samples = render_session(
        &mut soundscape,
        &mut mixer,
        &mut script,
        duration,
        args.tick,
        usize::from(channels),
    )?;

    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav(&args.output, &samples, spec)?;

    println!("Wrote {}", args.output.display());
    println!("  Peak: {:.1} dBFS", 20.0 * peak.max(1e-10).log10());
    if peak > 1.0 {
        println!("  Warning: output clips; lower clip volumes or snapshot gains");
    }
    Ok(())
}

/// Tick the soundscape and render interleaved audio up to `duration`.
///
/// Cues fire before the tick that crosses their time, and audio is rendered
/// after each tick up to the simulated clock.
pub fn render_session(
    soundscape: &mut Soundscape,
    mixer: &mut impl AudioRenderable,
    script: &mut Script,
    duration: f64,
    tick: f64,
    channels: usize,
) -> anyhow::Result<Vec<f32>> {
    let sample_rate = f64::from(soundscape.clips().sample_rate());
    let total_frames = (duration * sample_rate).round() as usize;
    let mut out = vec![0.0f32; total_frames * channels];
    let mut rendered = 0usize;

    while rendered < total_frames {
        script.apply_due(soundscape.now(), soundscape);
        soundscape.tick(tick as f32)?;

        let target = ((soundscape.now() * sample_rate).round() as usize).min(total_frames);
        if target > rendered {
            mixer.render(&mut out[rendered * channels..target * channels], channels);
            rendered = target;
        }
    }
    Ok(out)
}
