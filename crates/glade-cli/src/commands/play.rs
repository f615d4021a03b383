//! Live playback command.

use super::common::{load_soundscape, parse_seconds};
use crate::script::Script;
use clap::Args;
use glade_engine::Soundscape;
use glade_io::{OutputStream, StreamConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct PlayArgs {
    /// Soundscape config (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Input script to replay in real time
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Stop after this many seconds (default: run until Ctrl+C)
    #[arg(short, long, value_parser = parse_seconds)]
    duration: Option<f64>,

    /// Simulation tick in seconds
    #[arg(long, default_value = "0.016666668", value_parser = parse_seconds)]
    tick: f64,

    /// Random seed for footsteps, variations and pauses
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let (config, clips) = load_soundscape(&args.config)?;
    let mut script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };

    let mut stream = OutputStream::open(&StreamConfig {
        output_device: args.output,
    })?;
    let (mut soundscape, mixer) =
        Soundscape::build(&config, clips, stream.sample_rate() as f32, args.seed)?;

    println!(
        "Playing {} at {} Hz ({} ch)... Press Ctrl+C to stop.\n",
        args.config.display(),
        stream.sample_rate(),
        stream.channels()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    stream.start(mixer)?;

    let tick = Duration::from_secs_f64(args.tick);
    let mut last = Instant::now();
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(tick);
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        script.apply_due(soundscape.now(), &mut soundscape);
        soundscape.tick(dt)?;

        if args.duration.is_some_and(|d| soundscape.now() >= d) {
            break;
        }
    }

    stream.stop();
    println!("Played {:.1}s", soundscape.now());
    Ok(())
}
