//! Glade Engine - the soundscape runtime
//!
//! Two halves joined by a bounded command channel:
//!
//! - the tick side, a [`Soundscape`] owning every gameplay manager (music
//!   zones, ambience, effect zones, player effects, day/night, knob and oven,
//!   footsteps, emitters, click sounds), advanced by [`Soundscape::tick`] and
//!   driven by game input such as [`Soundscape::enter_area`] and
//!   [`Soundscape::click`]
//! - the audio side, a [`ClipMixer`] rendering clips and synth voices inside
//!   the audio callback without locking or allocating
//!
//! # Example
//!
//! ```rust
//! use glade_config::SoundscapeConfig;
//! use glade_core::AudioRenderable;
//! use glade_engine::{ClipBank, Soundscape, TonesOnly};
//!
//! let config = SoundscapeConfig::from_toml(r#"
//!     sample_rate = 8000
//!
//!     [[clips]]
//!     name = "meadow"
//!     tone = { frequency = 220.0, length_secs = 1.0 }
//!
//!     [[clips]]
//!     name = "cave"
//!     tone = { frequency = 110.0, length_secs = 1.0 }
//!
//!     [music]
//!     zones = [
//!         { name = "Meadow", clip = "meadow" },
//!         { name = "Cave", clip = "cave" },
//!     ]
//! "#).unwrap();
//!
//! let clips = ClipBank::from_config(&config, &mut TonesOnly).unwrap();
//! let (mut soundscape, mut mixer) = Soundscape::build(&config, clips, 8000.0, 0).unwrap();
//!
//! soundscape.enter_area("Cave").unwrap();
//! soundscape.tick(0.1).unwrap();
//!
//! let mut buffer = vec![0.0f32; 800];
//! mixer.render(&mut buffer, 1);
//! ```

pub mod clips;
mod error;
pub mod event;
pub mod managers;
pub mod mixer;
pub mod snapshot;
mod soundscape;
pub mod tick;

pub use clips::{ClipBank, ClipSource, TonesOnly, render_tone};
pub use error::{EngineError, Result, SourceError};
pub use event::{EventKind, KnobPosition, SoundscapeEvent, TimeOfDay, TransitionListener};
pub use mixer::{Bus, BusGains, ChannelState, ClipMixer, MixCommand, OneShot, VoiceGroup};
pub use snapshot::{SnapshotBlender, SnapshotTable};
pub use soundscape::Soundscape;
pub use tick::{Outbox, TickContext, Tickable};
