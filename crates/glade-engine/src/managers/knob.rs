//! Two-position knob with a turn animation and an emissive ramp.

use glade_config::KnobConfig;
use glade_core::{ClipId, clamp01};

use crate::clips::ClipBank;
use crate::error::Result;
use crate::event::{KnobPosition, SoundscapeEvent};
use crate::mixer::OneShot;
use crate::tick::{TickContext, Tickable};

/// A clickable knob.
///
/// Each click plays a random turn sound, flips the position and broadcasts
/// [`SoundscapeEvent::KnobPositionChanged`]. Clicks are ignored until the
/// previous turn sound has finished. While turned on the material
/// brightness ramps up at `material_speed` per second, and down while off.
#[derive(Debug, Clone)]
pub struct Knob {
    target: String,
    sounds: Vec<(ClipId, f32)>,
    volume: f32,
    material_speed: f32,
    position: KnobPosition,
    clip_end: f64,
    clip_len: f32,
    material: f32,
    turn: f32,
}

impl Knob {
    /// Build from config. Starts off, dark and unturned.
    pub fn new(config: &KnobConfig, clips: &ClipBank) -> Result<Self> {
        let sounds = clips
            .ids(&config.sounds)?
            .into_iter()
            .map(|id| (id, clips.length_secs(id)))
            .collect();
        Ok(Self {
            target: config.target.clone(),
            sounds,
            volume: config.volume,
            material_speed: config.material_speed,
            position: KnobPosition::Off,
            clip_end: 0.0,
            clip_len: 1.0,
            material: 0.0,
            turn: 0.0,
        })
    }

    /// Click target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Turn the knob. Returns `false` while the previous turn sound plays.
    pub fn click(&mut self, ctx: &mut TickContext<'_>) -> bool {
        if ctx.now < self.clip_end {
            return false;
        }
        self.position = self.position.toggled();
        let len = match ctx.pick(&self.sounds) {
            Some(&(clip, len)) => {
                ctx.out.play(OneShot::new(clip, self.volume));
                len
            }
            None => 0.0,
        };
        self.clip_len = len.max(1e-3);
        self.clip_end = ctx.now + f64::from(len);
        tracing::debug!(position = ?self.position, "knob turned");
        ctx.out.emit(SoundscapeEvent::KnobPositionChanged(self.position));
        true
    }

    /// Current position.
    pub fn position(&self) -> KnobPosition {
        self.position
    }

    /// Emissive brightness in `[0, 1]`.
    pub fn material(&self) -> f32 {
        self.material
    }

    /// Rotation progress in `[0, 1]`; 1 is fully on.
    pub fn turn(&self) -> f32 {
        self.turn
    }
}

impl Tickable for Knob {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let remaining = ((self.clip_end - ctx.now).max(0.0)) as f32 / self.clip_len;
        match self.position {
            KnobPosition::Off => {
                self.material -= self.material_speed * ctx.dt;
                self.turn = remaining;
            }
            KnobPosition::On => {
                self.material += self.material_speed * ctx.dt;
                self.turn = 1.0 - remaining;
            }
        }
        self.material = clamp01(self.material);
        self.turn = clamp01(self.turn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::test_support::Harness;

    fn knob() -> Knob {
        let mut clips = ClipBank::new(100);
        clips.insert("click", vec![0.0; 50]);
        Knob::new(
            &KnobConfig {
                target: "knob".into(),
                sounds: vec!["click".into()],
                material_speed: 0.5,
                volume: 0.8,
            },
            &clips,
        )
        .unwrap()
    }

    #[test]
    fn click_toggles_plays_and_broadcasts() {
        let mut k = knob();
        let mut h = Harness::new();
        assert!(k.click(&mut h.ctx()));
        assert_eq!(k.position(), KnobPosition::On);
        assert_eq!(h.outbox.commands().len(), 1);
        assert_eq!(
            h.outbox.events(),
            &[SoundscapeEvent::KnobPositionChanged(KnobPosition::On)]
        );
    }

    #[test]
    fn clicks_ignored_until_sound_finishes() {
        let mut k = knob();
        let mut h = Harness::new();
        assert!(k.click(&mut h.ctx()));
        h.tick(&mut k, 0.25).unwrap();
        assert!(!k.click(&mut h.ctx()));
        assert!(h.outbox.is_empty());
        h.tick(&mut k, 0.25).unwrap();
        assert!(k.click(&mut h.ctx()));
        assert_eq!(k.position(), KnobPosition::Off);
    }

    #[test]
    fn turn_follows_sound_and_material_ramps() {
        let mut k = knob();
        let mut h = Harness::new();
        k.click(&mut h.ctx());
        h.tick(&mut k, 0.25).unwrap();
        assert_eq!(k.turn(), 0.5);
        assert_eq!(k.material(), 0.125);
        for _ in 0..20 {
            h.tick(&mut k, 0.25).unwrap();
        }
        assert_eq!(k.turn(), 1.0);
        assert_eq!(k.material(), 1.0);

        k.click(&mut h.ctx());
        h.tick(&mut k, 0.25).unwrap();
        assert_eq!(k.turn(), 0.5);
        assert_eq!(k.material(), 0.875);
    }
}
