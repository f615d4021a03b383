//! High sine squeak that eases between silence and a maximum volume.
//!
//! The tick thread writes a requested [`SqueakDirection`] and fade duration
//! into a [`SqueakControl`]; the audio thread samples both once per buffer.
//! A new request is only acted on once the previous fade has finished.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use glade_core::{AudioRenderable, clamp01};

use crate::oscillator::SineOscillator;

/// Which end of the volume range the squeak is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SqueakDirection {
    /// Fade towards silence.
    #[default]
    GoToMin = 0,
    /// Fade towards the maximum volume.
    GoToMax = 1,
}

impl SqueakDirection {
    fn from_u8(v: u8) -> Self {
        if v == Self::GoToMax as u8 {
            Self::GoToMax
        } else {
            Self::GoToMin
        }
    }
}

/// Single-word requests shared with the audio thread.
///
/// Both fields are independent relaxed atomics. A reader may briefly pair a
/// new direction with the previous duration; the next buffer corrects it.
#[derive(Debug)]
pub struct SqueakControl {
    direction: AtomicU8,
    seconds: AtomicU32,
}

impl Default for SqueakControl {
    fn default() -> Self {
        Self {
            direction: AtomicU8::new(SqueakDirection::GoToMin as u8),
            seconds: AtomicU32::new(1.0f32.to_bits()),
        }
    }
}

impl SqueakControl {
    /// Silent, with a one-second default fade.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fade in over `seconds`.
    pub fn begin(&self, seconds: f32) {
        self.request(SqueakDirection::GoToMax, seconds);
    }

    /// Fade out over `seconds`.
    pub fn stop(&self, seconds: f32) {
        self.request(SqueakDirection::GoToMin, seconds);
    }

    /// Request a fade in `direction` lasting `seconds`.
    pub fn request(&self, direction: SqueakDirection, seconds: f32) {
        self.seconds.store(seconds.max(0.0).to_bits(), Ordering::Relaxed);
        self.direction.store(direction as u8, Ordering::Relaxed);
    }

    /// Most recently requested direction.
    pub fn direction(&self) -> SqueakDirection {
        SqueakDirection::from_u8(self.direction.load(Ordering::Relaxed))
    }

    /// Most recently requested fade duration in seconds.
    pub fn seconds(&self) -> f32 {
        f32::from_bits(self.seconds.load(Ordering::Relaxed))
    }
}

/// Audio-thread squeak voice.
#[derive(Debug)]
pub struct SqueakVoice {
    control: Arc<SqueakControl>,
    oscillator: SineOscillator,
    max_volume: f32,
    sample_rate: f32,
    direction: SqueakDirection,
    transitioning: bool,
    rate: f32,
    progress: f32,
}

impl SqueakVoice {
    /// Create a silent voice at `pitch` Hz peaking at `max_volume`.
    pub fn new(pitch: f32, max_volume: f32, sample_rate: f32) -> Self {
        Self {
            control: Arc::new(SqueakControl::new()),
            oscillator: SineOscillator::new(pitch, sample_rate),
            max_volume,
            sample_rate,
            direction: SqueakDirection::GoToMin,
            transitioning: false,
            rate: 1.0,
            progress: 0.0,
        }
    }

    /// Shared control block, for the tick thread.
    pub fn control(&self) -> Arc<SqueakControl> {
        Arc::clone(&self.control)
    }

    /// Current linear volume.
    pub fn volume(&self) -> f32 {
        self.max_volume * self.progress
    }

    /// Fade progress between silence (0) and `max_volume` (1).
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether a fade is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Direction of the latest accepted fade.
    pub fn direction(&self) -> SqueakDirection {
        self.direction
    }

    fn poll_control(&mut self) {
        let requested = self.control.direction();
        let seconds = self.control.seconds();
        if self.transitioning || requested == self.direction {
            return;
        }
        self.direction = requested;
        self.rate = if seconds > 0.0 { 1.0 / seconds } else { f32::INFINITY };
        self.transitioning = true;
    }

    #[inline]
    fn advance_volume(&mut self, dt: f32) {
        if !self.transitioning {
            return;
        }
        let step = dt * self.rate;
        match self.direction {
            SqueakDirection::GoToMax => {
                self.progress = clamp01(self.progress + step);
                self.transitioning = self.progress < 1.0;
            }
            SqueakDirection::GoToMin => {
                self.progress = clamp01(self.progress - step);
                self.transitioning = self.progress > 0.0;
            }
        }
    }
}

impl AudioRenderable for SqueakVoice {
    fn render(&mut self, output: &mut [f32], channels: usize) {
        self.poll_control();
        if !self.transitioning && self.progress <= 0.0 {
            return;
        }

        let channels = channels.max(1);
        let dt = 1.0 / self.sample_rate;
        for frame in output.chunks_exact_mut(channels) {
            let sample = self.volume() * self.oscillator.advance();
            for s in frame.iter_mut() {
                *s += sample;
            }
            self.advance_volume(dt);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.oscillator.set_sample_rate(sample_rate);
    }
}
