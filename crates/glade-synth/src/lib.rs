//! Glade Synth - audio-thread synthesizers for the glade soundscape engine
//!
//! Everything here runs inside the audio callback: no locks, no allocation
//! after construction. Control from the tick thread arrives through
//! single-word atomics.
//!
//! # Components
//!
//! - [`SineOscillator`] - Phase-accumulating sine, deterministic for a given
//!   frequency, sample rate and initial phase
//! - [`NotePlayer`] - Sine note shaped by a keyframed
//!   [`Envelope`](glade_core::Envelope), gated by a [`NoteGate`]
//! - [`SqueakVoice`] - Fixed-pitch sine that fades between silence and a
//!   maximum volume on request through a [`SqueakControl`]
//!
//! # Example
//!
//! ```rust
//! use glade_core::{AudioRenderable, EnvelopeCurve};
//! use glade_synth::{NotePlayer, NoteSettings};
//!
//! let curve = EnvelopeCurve::from_points(&[
//!     (0.0, 0.0), (0.01, 1.0), (0.05, 0.5), (0.1, 0.5), (0.3, 0.0),
//! ]).unwrap();
//! let mut player = NotePlayer::new(curve, NoteSettings::default(), 48000.0);
//!
//! let gate = player.gate();
//! gate.press();
//!
//! let mut buffer = vec![0.0f32; 512];
//! player.render(&mut buffer, 2);
//! assert!(player.is_sounding());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod note;
pub mod oscillator;
pub mod squeak;

pub use note::{NoteGate, NotePlayer, NoteSettings};
pub use oscillator::SineOscillator;
pub use squeak::{SqueakControl, SqueakDirection, SqueakVoice};
