//! Per-tick context shared by every manager.

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::error::Result;
use crate::event::SoundscapeEvent;
use crate::mixer::{BusGains, ChannelState, MixCommand, OneShot, VoiceGroup};

/// Everything a manager produced during one tick or trigger.
///
/// Flushed by the [`Soundscape`](crate::Soundscape) right after each
/// manager runs: commands go to the mixer, events to their listeners.
#[derive(Debug, Default)]
pub struct Outbox {
    pub(crate) commands: Vec<MixCommand>,
    pub(crate) events: Vec<SoundscapeEvent>,
    pub(crate) blend: Option<(BusGains, f32)>,
}

impl Outbox {
    /// Empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the state of a looping slot.
    pub fn set_channel(&mut self, slot: usize, state: ChannelState) {
        self.commands.push(MixCommand::Channel { slot, state });
    }

    /// Start a one-shot.
    pub fn play(&mut self, shot: OneShot) {
        self.commands.push(MixCommand::OneShot(shot));
    }

    /// Stop every one-shot in `group`.
    pub fn stop_group(&mut self, group: VoiceGroup) {
        self.commands.push(MixCommand::StopGroup(group));
    }

    /// Blend the mixer buses to `gains` over `secs` seconds.
    ///
    /// The last request in a tick wins.
    pub fn blend_to(&mut self, gains: BusGains, secs: f32) {
        self.blend = Some((gains, secs));
    }

    /// Broadcast an event.
    pub fn emit(&mut self, event: SoundscapeEvent) {
        self.events.push(event);
    }

    /// Commands queued so far.
    pub fn commands(&self) -> &[MixCommand] {
        &self.commands
    }

    /// Events queued so far.
    pub fn events(&self) -> &[SoundscapeEvent] {
        &self.events
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty() && self.blend.is_none()
    }
}

/// Inputs and outputs of one manager step.
pub struct TickContext<'a> {
    /// Seconds since the previous tick; 0 for triggers.
    pub dt: f32,
    /// Seconds since the soundscape started.
    pub now: f64,
    /// Shared random source.
    pub rng: &'a mut SmallRng,
    /// Where commands and events go.
    pub out: &'a mut Outbox,
}

impl TickContext<'_> {
    /// Uniformly chosen element, `None` for an empty slice.
    pub fn pick<'s, T>(&mut self, items: &'s [T]) -> Option<&'s T> {
        items.choose(&mut *self.rng)
    }

    /// Uniform value in `[range[0], range[1]]`; the lower bound if the range is empty.
    pub fn uniform(&mut self, range: [f32; 2]) -> f32 {
        let [lo, hi] = range;
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }
}

/// A manager advanced once per simulation tick.
pub trait Tickable {
    /// Advance by `ctx.dt` seconds.
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()>;
}
