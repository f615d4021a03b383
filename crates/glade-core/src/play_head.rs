//! A single traversal through an [`EnvelopeCurve`].
//!
//! A play head is created when a note is pressed and dropped by its owning
//! [`Envelope`](crate::Envelope) once it runs past the release breakpoint.
//! While the key is held the head loops between the decay and sustain
//! breakpoints; once released it skips whatever is left of that hold region
//! and plays out the release segment.

use crate::envelope::{BreakpointName, EnvelopeCurve};

/// Margin past the release breakpoint before a head counts as finished.
pub const DONE_EPSILON: f32 = 0.001;

/// Which segment of the curve a play head is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeStage {
    /// No note sounding.
    Off,
    /// Rising towards the attack peak.
    Attacking,
    /// Falling from the peak towards the decay breakpoint.
    Decaying,
    /// Held, looping between the decay and sustain breakpoints.
    Sustaining,
    /// Released, playing out the tail.
    Releasing,
}

/// One in-progress note on an envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayHead {
    id: u32,
    position: f32,
    is_sustaining: bool,
}

impl PlayHead {
    /// Create a pressed (sustaining) play head at position 0.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            position: 0.0,
            is_sustaining: true,
        }
    }

    /// Identifier assigned by the owning envelope.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Elapsed envelope time in seconds.
    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Whether the key for this head is still held.
    #[inline]
    pub fn is_sustaining(&self) -> bool {
        self.is_sustaining
    }

    /// Mark the key as held.
    pub fn press(&mut self) {
        self.is_sustaining = true;
    }

    /// Mark the key as released.
    pub fn release(&mut self) {
        self.is_sustaining = false;
    }

    /// Move the head forward by `dt` seconds and apply the loop-back rules.
    ///
    /// - Held and at or past the sustain breakpoint: jump back to the decay
    ///   breakpoint.
    /// - Released while inside `[decay, sustain]`: jump forward to the
    ///   sustain breakpoint so the release segment starts immediately.
    #[inline]
    pub fn advance(&mut self, dt: f32, curve: &EnvelopeCurve) {
        self.position += dt;

        let decay = curve.time(BreakpointName::DecayRight);
        let sustain = curve.time(BreakpointName::SustainRight);

        if self.is_sustaining && self.position >= sustain {
            self.position = decay;
        } else if !self.is_sustaining && self.position >= decay && self.position <= sustain {
            self.position = sustain;
        }
    }

    /// Segment of `curve` the head is currently in.
    pub fn stage(&self, curve: &EnvelopeCurve) -> EnvelopeStage {
        if self.is_done(curve) {
            EnvelopeStage::Off
        } else if self.position < curve.time(BreakpointName::AttackRight) {
            EnvelopeStage::Attacking
        } else if self.position < curve.time(BreakpointName::DecayRight) {
            EnvelopeStage::Decaying
        } else if self.is_sustaining {
            EnvelopeStage::Sustaining
        } else {
            EnvelopeStage::Releasing
        }
    }

    /// True once the head has run past the release breakpoint.
    #[inline]
    pub fn is_done(&self, curve: &EnvelopeCurve) -> bool {
        self.position >= curve.time(BreakpointName::ReleaseRight) + DONE_EPSILON
    }
}
