//! Phase-accumulating sine oscillator.

use core::f32::consts::TAU;
use libm::sinf;

/// Sine oscillator with its phase kept in radians.
///
/// Each call to [`advance`](Self::advance) adds `2π·frequency/sample_rate`
/// to the phase and returns `sin(phase)`. The phase wraps at `2π`, so two
/// oscillators with the same frequency, sample rate and initial phase
/// produce identical sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct SineOscillator {
    phase: f32,
    increment: f32,
    frequency: f32,
    sample_rate: f32,
}

impl SineOscillator {
    /// Create an oscillator at `frequency` Hz, starting at phase 0.
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            increment: 0.0,
            frequency: frequency.max(0.0),
            sample_rate,
        };
        osc.update_increment();
        osc
    }

    /// Start from `phase` radians instead of 0.
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set frequency in Hz.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.max(0.0);
        self.update_increment();
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set sample rate and recompute the phase increment.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_increment();
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Step the phase forward one frame and return the new sine value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        sinf(self.phase)
    }

    fn update_increment(&mut self) {
        self.increment = if self.sample_rate > 0.0 {
            TAU * self.frequency / self.sample_rate
        } else {
            0.0
        };
    }
}
