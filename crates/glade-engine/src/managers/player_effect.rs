//! Player status effects: overlay tint, snapshot blend and a transition sound.

use glade_config::{PlayerEffect, PlayerEffectConfig};
use glade_core::{ClipId, clamp01, lerp};

use crate::clips::ClipBank;
use crate::error::{EngineError, Result};
use crate::event::SoundscapeEvent;
use crate::mixer::{BusGains, OneShot};
use crate::snapshot::SnapshotTable;
use crate::tick::{TickContext, Tickable};

/// RGBA overlay tint.
pub type Rgba = [f32; 4];

#[derive(Debug, Clone)]
struct EffectEntry {
    effect: PlayerEffect,
    color: Rgba,
    snapshot: BusGains,
    sounds: Vec<ClipId>,
    transition_secs: f32,
}

/// Moves the player between effects, one transition at a time.
#[derive(Debug, Clone)]
pub struct PlayerEffectManager {
    entries: Vec<EffectEntry>,
    current: PlayerEffect,
    transitioning: bool,
    started_at: f64,
    duration: f32,
    color_from: Rgba,
    color_to: Rgba,
    color: Rgba,
}

impl PlayerEffectManager {
    /// Build from `[[player_effects]]`, starting in `none`.
    pub fn new(
        configs: &[PlayerEffectConfig],
        clips: &ClipBank,
        snapshots: &SnapshotTable,
    ) -> Result<Self> {
        let entries = configs
            .iter()
            .map(|c| {
                Ok(EffectEntry {
                    effect: c.effect,
                    color: c.color,
                    snapshot: snapshots.get(&c.snapshot)?,
                    sounds: clips.ids(&c.sounds)?,
                    transition_secs: c.transition_secs,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let color = entries
            .iter()
            .find(|e| e.effect == PlayerEffect::None)
            .map(|e| e.color)
            .unwrap_or_default();

        Ok(Self {
            entries,
            current: PlayerEffect::None,
            transitioning: false,
            started_at: 0.0,
            duration: 0.0,
            color_from: color,
            color_to: color,
            color,
        })
    }

    /// Effect most recently transitioned into.
    pub fn current(&self) -> PlayerEffect {
        self.current
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Overlay tint shown now.
    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Start a transition to `effect`.
    ///
    /// Ignored while a transition runs or when `effect` is already current.
    /// Returns whether a transition started.
    pub fn transition_to(&mut self, effect: PlayerEffect, ctx: &mut TickContext<'_>) -> Result<bool> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.effect == effect)
            .ok_or(EngineError::UnknownEffect(effect))?;
        if self.transitioning || self.current == effect {
            tracing::debug!(%effect, current = %self.current, "player effect request ignored");
            return Ok(false);
        }

        if let Some(&clip) = ctx.pick(&entry.sounds) {
            ctx.out.play(OneShot::new(clip, 1.0));
        }
        ctx.out.blend_to(entry.snapshot, entry.transition_secs);
        ctx.out.emit(SoundscapeEvent::PlayerEffectTransitionBegin {
            target: effect,
            transition_secs: entry.transition_secs,
        });

        tracing::debug!(%effect, secs = entry.transition_secs, "player effect transition");
        self.current = effect;
        self.transitioning = true;
        self.started_at = ctx.now;
        self.duration = entry.transition_secs;
        self.color_from = self.color;
        self.color_to = entry.color;
        Ok(true)
    }
}

impl Tickable for PlayerEffectManager {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        if !self.transitioning {
            return Ok(());
        }
        let t = if self.duration > 0.0 {
            clamp01(((ctx.now - self.started_at) / f64::from(self.duration)) as f32)
        } else {
            1.0
        };
        for i in 0..4 {
            self.color[i] = lerp(self.color_from[i], self.color_to[i], t);
        }
        if t >= 1.0 {
            self.color = self.color_to;
            self.transitioning = false;
        }
        Ok(())
    }
}
