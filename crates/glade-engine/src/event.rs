//! Notifications broadcast by managers, and the listeners that receive them.
//!
//! Events are fire-and-forget. Each one is delivered synchronously, right
//! after the manager that raised it finishes its tick, to every receiver in
//! the dispatch table for its [`EventKind`] in registration order.

use glade_config::PlayerEffect;
use std::fmt;

/// Knob state after a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnobPosition {
    /// Turned off.
    Off,
    /// Turned on.
    On,
}

impl KnobPosition {
    /// The opposite position.
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

/// Time of day driven by the day/night controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    /// Daytime.
    Day,
    /// Nighttime.
    Night,
}

impl TimeOfDay {
    /// The opposite time of day.
    pub fn toggled(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Night => "night",
        })
    }
}

/// A notification raised by a manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundscapeEvent {
    /// The knob was turned.
    KnobPositionChanged(KnobPosition),
    /// A player effect transition started.
    PlayerEffectTransitionBegin {
        /// Effect being transitioned into.
        target: PlayerEffect,
        /// Duration of the transition.
        transition_secs: f32,
    },
    /// Lights swapped at the midpoint of a day/night transition.
    TimeChanged(TimeOfDay),
}

impl SoundscapeEvent {
    /// Routing key of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::KnobPositionChanged(_) => EventKind::KnobPositionChanged,
            Self::PlayerEffectTransitionBegin { .. } => EventKind::PlayerEffectTransitionBegin,
            Self::TimeChanged(_) => EventKind::TimeChanged,
        }
    }
}

/// Event discriminant used as the dispatch table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`SoundscapeEvent::KnobPositionChanged`].
    KnobPositionChanged,
    /// [`SoundscapeEvent::PlayerEffectTransitionBegin`].
    PlayerEffectTransitionBegin,
    /// [`SoundscapeEvent::TimeChanged`].
    TimeChanged,
}

impl EventKind {
    /// Every kind, in table order.
    pub const ALL: [EventKind; 3] = [
        EventKind::KnobPositionChanged,
        EventKind::PlayerEffectTransitionBegin,
        EventKind::TimeChanged,
    ];

    /// Row of this kind in the dispatch table.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Receives soundscape notifications.
///
/// Implemented for any `FnMut(&SoundscapeEvent)`, so a closure can be
/// subscribed directly.
pub trait TransitionListener: Send {
    /// Called once per event, on the tick thread.
    fn on_event(&mut self, event: &SoundscapeEvent);
}

impl<F> TransitionListener for F
where
    F: FnMut(&SoundscapeEvent) + Send,
{
    fn on_event(&mut self, event: &SoundscapeEvent) {
        self(event);
    }
}
