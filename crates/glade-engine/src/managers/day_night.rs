//! Click-triggered blackout that swaps day and night at its midpoint.
//!
//! ```text
//!  progress   0 ────────── 0.5 ────────── 1
//!  opacity    0 ──rises──▶  1  ──falls──▶ 0
//!                           │
//!                     lights swap,
//!                  TimeChanged broadcast
//! ```

use glade_config::DayNightConfig;
use glade_core::lerp;

use crate::error::Result;
use crate::event::{SoundscapeEvent, TimeOfDay};
use crate::tick::{TickContext, Tickable};

/// Day/night lighting state and blackout overlay.
#[derive(Debug, Clone)]
pub struct DayNightController {
    target: String,
    speed: f32,
    time: TimeOfDay,
    transitioning: bool,
    progress: f32,
    switched: bool,
    opacity: f32,
}

impl DayNightController {
    /// Start in daytime with a transparent overlay.
    pub fn new(config: &DayNightConfig) -> Self {
        Self {
            target: config.target.clone(),
            speed: config.transition_speed,
            time: TimeOfDay::Day,
            transitioning: false,
            progress: 0.0,
            switched: false,
            opacity: 0.0,
        }
    }

    /// Click target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Start a transition. Returns `false` if one is already running.
    pub fn click(&mut self) -> bool {
        if self.transitioning {
            return false;
        }
        tracing::debug!(from = %self.time, "day/night transition");
        self.transitioning = true;
        self.switched = false;
        self.progress = 0.0;
        true
    }

    /// Time of day the lights currently show.
    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    /// Blackout overlay opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Transition progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether a transition is running.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }
}

impl Tickable for DayNightController {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        if !self.transitioning {
            return Ok(());
        }
        self.progress += self.speed * ctx.dt;

        if self.progress >= 0.5 && !self.switched {
            self.time = self.time.toggled();
            self.switched = true;
            tracing::debug!(time = %self.time, "lights swapped");
            ctx.out.emit(SoundscapeEvent::TimeChanged(self.time));
        }

        self.opacity = if self.progress <= 0.5 {
            lerp(0.0, 1.0, self.progress * 2.0)
        } else {
            lerp(1.0, 0.0, (self.progress - 0.5) * 2.0)
        };

        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.transitioning = false;
            self.opacity = 0.0;
        }
        Ok(())
    }
}
