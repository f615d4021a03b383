//! Area that blends the mixer to an effect snapshot while occupied.

use glade_config::EffectZoneConfig;
use glade_core::Transition;

use crate::error::Result;
use crate::mixer::BusGains;
use crate::snapshot::SnapshotTable;
use crate::tick::{TickContext, Tickable};

/// Which of the two zone snapshots is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSnapshot {
    /// Outside the area.
    NoEffect,
    /// Inside the area.
    Effect,
}

/// Toggles between the "no effect" and "effect" snapshots.
#[derive(Debug, Clone)]
pub struct EffectZoneManager {
    area: String,
    no_effect: BusGains,
    effect: BusGains,
    transition_secs: f32,
    transition: Transition<ZoneSnapshot>,
    ends_at: f64,
}

impl EffectZoneManager {
    /// Build from config, resolving both snapshots.
    pub fn new(config: &EffectZoneConfig, snapshots: &SnapshotTable) -> Result<Self> {
        Ok(Self {
            area: config.area.clone(),
            no_effect: snapshots.get(&config.no_effect_snapshot)?,
            effect: snapshots.get(&config.effect_snapshot)?,
            transition_secs: config.transition_secs,
            transition: Transition::new(ZoneSnapshot::NoEffect),
            ends_at: 0.0,
        })
    }

    /// Area name.
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Gains of the "no effect" snapshot.
    pub fn resting_gains(&self) -> BusGains {
        self.no_effect
    }

    /// Player entered the area.
    pub fn enter(&mut self) {
        self.transition.request(ZoneSnapshot::Effect);
    }

    /// Player left the area.
    pub fn exit(&mut self) {
        self.transition.request(ZoneSnapshot::NoEffect);
    }

    /// Snapshot settled before any in-flight transition.
    pub fn current(&self) -> ZoneSnapshot {
        self.transition.current()
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_transitioning()
    }

    fn gains(&self, snapshot: ZoneSnapshot) -> BusGains {
        match snapshot {
            ZoneSnapshot::NoEffect => self.no_effect,
            ZoneSnapshot::Effect => self.effect,
        }
    }
}

impl Tickable for EffectZoneManager {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        if self.transition.is_transitioning() && ctx.now >= self.ends_at {
            self.transition.complete();
        }
        if let Some(into) = self.transition.begin() {
            tracing::debug!(?into, area = %self.area, "effect zone transition");
            ctx.out.blend_to(self.gains(into), self.transition_secs);
            self.ends_at = ctx.now + f64::from(self.transition_secs);
        }
        Ok(())
    }
}
