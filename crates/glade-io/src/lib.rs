//! Audio I/O layer for the glade soundscape engine.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for loading clips and
//!   saving offline renders
//! - **Clip loading**: [`WavClipSource`], the file loader behind
//!   [`ClipBank::from_config`](glade_engine::ClipBank::from_config)
//! - **Real-time output**: [`OutputStream`] for driving a renderer from a cpal
//!   output callback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use glade_config::SoundscapeConfig;
//! use glade_engine::{ClipBank, Soundscape};
//! use glade_io::{OutputStream, StreamConfig, WavClipSource};
//!
//! let config = SoundscapeConfig::load("world.toml")?;
//! let clips = ClipBank::from_config(&config, &mut WavClipSource::new())?;
//!
//! let mut stream = OutputStream::open(&StreamConfig::default())?;
//! let (mut soundscape, mixer) =
//!     Soundscape::build(&config, clips, stream.sample_rate() as f32, 0)?;
//! stream.start(mixer)?;
//!
//! loop {
//!     soundscape.tick(1.0 / 60.0)?;
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! ```

mod clip_source;
mod stream;
mod wav;

pub use clip_source::WavClipSource;
pub use stream::{AudioDevice, OutputStream, StreamConfig, default_output_device, list_devices};
pub use wav::{WavSpec, read_wav, resample_linear, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
