//! Surface-dependent footsteps.

use std::collections::HashMap;

use glade_config::{DEFAULT_FOOTSTEP_ZONE, FootstepsConfig};
use glade_core::ClipId;

use crate::clips::ClipBank;
use crate::error::Result;
use crate::mixer::{OneShot, VoiceGroup};
use crate::tick::{TickContext, Tickable};

/// One step sound set: clips plus pitch and volume ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSet {
    /// Candidate clips.
    pub clips: Vec<ClipId>,
    /// Pitch range `[min, max]`.
    pub pitch: [f32; 2],
    /// Volume range `[min, max]`.
    pub volume: [f32; 2],
}

/// Plays a step every `interval_secs` while the player moves.
#[derive(Debug, Clone)]
pub struct FootstepSystem {
    interval: f32,
    surfaces: HashMap<String, String>,
    zones: HashMap<String, Vec<StepSet>>,
    zone: String,
    moving: bool,
    was_moving: bool,
    next_step_at: f64,
}

impl FootstepSystem {
    /// Group the configured sets by zone, starting in the default zone.
    pub fn new(config: &FootstepsConfig, clips: &ClipBank) -> Result<Self> {
        let mut zones: HashMap<String, Vec<StepSet>> = HashMap::new();
        for zone in &config.zones {
            zones.entry(zone.name.clone()).or_default().push(StepSet {
                clips: clips.ids(&zone.clips)?,
                pitch: zone.pitch,
                volume: zone.volume,
            });
        }
        Ok(Self {
            interval: config.interval_secs,
            surfaces: config
                .surfaces
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            zones,
            zone: DEFAULT_FOOTSTEP_ZONE.to_string(),
            moving: false,
            was_moving: false,
            next_step_at: 0.0,
        })
    }

    /// Surface under the player. Unknown or absent surfaces keep the zone.
    pub fn set_surface(&mut self, surface: Option<&str>) {
        if let Some(zone) = surface.and_then(|s| self.surfaces.get(s)) {
            if *zone != self.zone {
                tracing::debug!(zone = %zone, "footstep zone");
                self.zone.clone_from(zone);
            }
        }
    }

    /// Whether the player is moving.
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    /// Zone steps are currently drawn from.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Whether the player is moving.
    pub fn is_moving(&self) -> bool {
        self.moving
    }
}

impl Tickable for FootstepSystem {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let was_moving = std::mem::replace(&mut self.was_moving, self.moving);
        if !self.moving {
            if was_moving {
                ctx.out.stop_group(VoiceGroup::Footsteps);
            }
            return Ok(());
        }
        if ctx.now < self.next_step_at {
            return Ok(());
        }

        let Some(sets) = self.zones.get(&self.zone) else {
            return Ok(());
        };
        let Some(set) = ctx.pick(sets) else {
            return Ok(());
        };
        let pitch = ctx.uniform(set.pitch);
        let volume = ctx.uniform(set.volume);
        if let Some(&clip) = ctx.pick(&set.clips) {
            ctx.out.play(OneShot {
                pitch,
                group: VoiceGroup::Footsteps,
                ..OneShot::new(clip, volume)
            });
        }
        self.next_step_at = ctx.now + f64::from(self.interval);
        Ok(())
    }
}
