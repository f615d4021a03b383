//! Soundscape configuration for the glade engine.
//!
//! A soundscape is a single TOML file describing the clip table and every
//! subsystem the engine builds at startup: music zones, day/night ambience,
//! snapshots, player effects, the knob and oven, synthesizers, footsteps and
//! the smaller trigger-driven players.
//!
//! Loading parses and validates in one step; any problem is fatal and is
//! reported with the config path of the offending entry.
//!
//! # Example
//!
//! ```rust
//! use glade_config::SoundscapeConfig;
//!
//! let config = SoundscapeConfig::from_toml(r#"
//!     [[clips]]
//!     name = "meadow"
//!     tone = { frequency = 220.0, length_secs = 4.0 }
//!
//!     [music]
//!     zones = [{ name = "Meadow", clip = "meadow" }]
//! "#).unwrap();
//!
//! assert_eq!(config.music.zones[0].name, "Meadow");
//! ```

mod error;
mod soundscape;

/// Startup validation.
pub mod validation;

pub use error::ConfigError;
pub use soundscape::{
    AmbientConfig, ClickableConfig, ClipConfig, ClipRef, DEFAULT_FOOTSTEP_ZONE, DayNightConfig,
    EffectTriggerConfig, EffectZoneConfig, EmitterConfig, FootstepZoneConfig, FootstepsConfig,
    IntervalPlayerConfig, KnobConfig, MusicConfig, MusicZoneConfig, NoteConfig, OvenConfig,
    PlayerEffect, PlayerEffectConfig, SnapshotConfig, SoundscapeConfig, SqueakConfig, ToneConfig,
};
pub use validation::{ValidationError, ValidationResult, validate};
