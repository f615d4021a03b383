//! Envelope-shaped sine note rendered on the audio thread.
//!
//! The tick thread never touches the [`Envelope`] directly. It flips a
//! [`NoteGate`]; the audio thread compares the gate against the envelope at
//! the start of every buffer and presses or releases accordingly.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use glade_core::{AudioRenderable, Envelope, EnvelopeCurve};

use crate::oscillator::SineOscillator;

/// Lock-free press/release flag shared between tick and audio threads.
///
/// Presses are also counted, so a press and release that both land between
/// two audio buffers still starts a note.
#[derive(Debug, Default)]
pub struct NoteGate {
    held: AtomicBool,
    presses: AtomicU32,
}

impl NoteGate {
    /// A released gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the note (tick thread).
    #[inline]
    pub fn press(&self) {
        self.presses.fetch_add(1, Ordering::Relaxed);
        self.held.store(true, Ordering::Relaxed);
    }

    /// Let the note go (tick thread).
    #[inline]
    pub fn release(&self) {
        self.held.store(false, Ordering::Relaxed);
    }

    /// Whether the note is held (audio thread).
    #[inline]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }

    /// Number of presses so far, wrapping.
    #[inline]
    pub fn presses(&self) -> u32 {
        self.presses.load(Ordering::Relaxed)
    }
}

/// Fixed tone and level of a [`NotePlayer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteSettings {
    /// Oscillator frequency in Hz.
    pub frequency: f32,
    /// Linear output gain.
    pub gain: f32,
}

impl Default for NoteSettings {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            gain: 0.05,
        }
    }
}

/// Monophonic sine note with a keyframed envelope.
///
/// Per frame: `gain · envelope(t) · sin(phase)` is added to every output
/// channel. Play heads advance by `1 / sample_rate` per frame and finished
/// heads are dropped after each buffer.
#[derive(Debug)]
pub struct NotePlayer {
    envelope: Envelope,
    oscillator: SineOscillator,
    settings: NoteSettings,
    sample_rate: f32,
    gate: Arc<NoteGate>,
    seen_presses: u32,
}

impl NotePlayer {
    /// Create a player and the gate that drives it.
    pub fn new(curve: EnvelopeCurve, settings: NoteSettings, sample_rate: f32) -> Self {
        Self {
            envelope: Envelope::new(curve),
            oscillator: SineOscillator::new(settings.frequency, sample_rate),
            settings,
            sample_rate,
            gate: Arc::new(NoteGate::new()),
            seen_presses: 0,
        }
    }

    /// Shared handle to the gate, for the tick thread.
    pub fn gate(&self) -> Arc<NoteGate> {
        Arc::clone(&self.gate)
    }

    /// The envelope and its live play heads.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Tone settings.
    pub fn settings(&self) -> NoteSettings {
        self.settings
    }

    /// Whether any play head is still sounding.
    pub fn is_sounding(&self) -> bool {
        !self.envelope.play_heads().is_empty()
    }

    fn sync_gate(&mut self) {
        let presses = self.gate.presses();
        let pressed = presses != self.seen_presses;
        self.seen_presses = presses;

        let held = self.gate.is_held();
        if (held || pressed) && !self.envelope.is_held() {
            self.envelope.press();
        }
        if !held {
            self.envelope.release();
        }
    }
}

impl AudioRenderable for NotePlayer {
    fn render(&mut self, output: &mut [f32], channels: usize) {
        self.sync_gate();
        if self.envelope.play_heads().is_empty() {
            return;
        }

        let channels = channels.max(1);
        let dt = 1.0 / self.sample_rate;
        let gain = self.settings.gain;

        for frame in output.chunks_exact_mut(channels) {
            let level = self.envelope.sample_and_advance(dt);
            let sample = gain * level * self.oscillator.advance();
            for s in frame.iter_mut() {
                *s += sample;
            }
        }

        self.envelope.maintain();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.oscillator.set_sample_rate(sample_rate);
    }
}
