//! Glade Core - primitives for the glade soundscape engine
//!
//! This crate provides the building blocks shared by the tick thread and the
//! audio thread: keyframed note envelopes, play heads, the two-channel
//! crossfader, and the three-slot transition state used by every manager.
//!
//! # Core Abstractions
//!
//! ## Envelopes
//!
//! - [`EnvelopeCurve`] - Five named breakpoints with smooth interpolation
//! - [`Envelope`] - A curve plus the [`PlayHead`]s currently traversing it
//! - [`PlayHead`] - One note press, with the sustain loop-back rule
//! - [`EnvelopeStage`] - Which segment a play head is in
//!
//! ## Crossfading
//!
//! - [`Channel`] - Tick-side state of one playback channel
//! - [`DualChannel`] - Exactly two channels, addressed by the clip they hold
//! - [`Crossfader`] - Linear A/B crossfade with resume offsets
//!
//! ## Transitions
//!
//! - [`Transition`] - `current` / `transitioning_into` / `target` slots
//!
//! ## Rendering
//!
//! - [`AudioRenderable`] - Anything that adds samples into an interleaved buffer
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the crate without the standard
//! library (an allocator is still required for play head storage):
//!
//! ```toml
//! [dependencies]
//! glade-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use glade_core::{Envelope, EnvelopeCurve};
//!
//! let curve = EnvelopeCurve::from_points(&[
//!     (0.0, 0.0),
//!     (0.05, 1.0),
//!     (0.2, 0.6),
//!     (0.5, 0.6),
//!     (1.0, 0.0),
//! ])
//! .unwrap();
//!
//! let mut envelope = Envelope::new(curve);
//! envelope.press();
//! let level = envelope.sample_and_advance(1.0 / 48000.0);
//! assert!(level >= 0.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod channel;
pub mod crossfade;
pub mod envelope;
pub mod math;
pub mod play_head;
pub mod render;
pub mod transition;

pub use channel::{Channel, ClipId};
pub use crossfade::{
    ChannelId, CrossfadeCompletion, CrossfadeEntry, Crossfader, DualChannel, InvariantViolation,
};
pub use envelope::{
    BREAKPOINT_COUNT, Breakpoint, BreakpointName, Envelope, EnvelopeCurve, EnvelopeError,
    MAX_PLAY_HEADS,
};
pub use math::{clamp01, inverse_lerp, lerp};
pub use play_head::{DONE_EPSILON, EnvelopeStage, PlayHead};
pub use render::{AudioRenderable, frame_count};
pub use transition::Transition;
