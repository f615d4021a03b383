//! Tick-thread managers.
//!
//! Each manager owns the state of one gameplay audio feature and implements
//! [`Tickable`](crate::tick::Tickable). Managers never reach each other
//! directly: they write commands and events to the tick's
//! [`Outbox`](crate::tick::Outbox) and the [`Soundscape`](crate::Soundscape)
//! routes them.

pub mod ambient;
pub mod day_night;
pub mod effect_zone;
pub mod footsteps;
pub mod knob;
pub mod music;
pub mod note;
pub mod oven;
pub mod player_effect;
pub mod players;
pub mod squeal;

pub use ambient::AmbientSoundManager;
pub use day_night::DayNightController;
pub use effect_zone::{EffectZoneManager, ZoneSnapshot};
pub use footsteps::{FootstepSystem, StepSet};
pub use knob::Knob;
pub use music::{MusicZone, MusicZoneManager};
pub use note::NoteTrigger;
pub use oven::{OvenState, TransitionablePlayer};
pub use player_effect::{PlayerEffectManager, Rgba};
pub use players::{AreaEmitter, ClickSound, IntervalPlayer};
pub use squeal::PoisonSquealTrigger;

use glade_core::{ChannelId, DualChannel};

use crate::mixer::{Bus, ChannelState};
use crate::tick::Outbox;

/// Publish both channels of a crossfader to their mixer slots.
pub(crate) fn publish_pair(channels: &DualChannel, slots: [usize; 2], bus: Bus, out: &mut Outbox) {
    for (id, channel) in channels.iter() {
        let slot = match id {
            ChannelId::A => slots[0],
            ChannelId::B => slots[1],
        };
        out.set_channel(slot, ChannelState::of(channel, bus));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use crate::error::Result;
    use crate::tick::{Outbox, TickContext, Tickable};

    /// Drives a single manager with a seeded rng and its own clock.
    pub(crate) struct Harness {
        pub rng: SmallRng,
        pub outbox: Outbox,
        pub now: f64,
    }

    impl Harness {
        pub(crate) fn new() -> Self {
            Self {
                rng: SmallRng::seed_from_u64(7),
                outbox: Outbox::new(),
                now: 0.0,
            }
        }

        /// Advance the clock by `dt` and tick `manager`; the outbox holds
        /// only that tick's output.
        pub(crate) fn tick(&mut self, manager: &mut impl Tickable, dt: f32) -> Result<()> {
            self.outbox = Outbox::new();
            self.now += f64::from(dt);
            let mut ctx = TickContext {
                dt,
                now: self.now,
                rng: &mut self.rng,
                out: &mut self.outbox,
            };
            manager.tick(&mut ctx)
        }

        /// Zero-length context for triggers, with a cleared outbox.
        pub(crate) fn ctx(&mut self) -> TickContext<'_> {
            self.outbox = Outbox::new();
            TickContext {
                dt: 0.0,
                now: self.now,
                rng: &mut self.rng,
                out: &mut self.outbox,
            }
        }
    }
}
