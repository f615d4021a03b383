//! Oven hum: a looping clip wrapped in fade-in and fade-out one-shots.

use glade_config::OvenConfig;
use glade_core::{Channel, ClipId};

use crate::clips::ClipBank;
use crate::error::Result;
use crate::event::KnobPosition;
use crate::mixer::{Bus, ChannelState, OneShot};
use crate::tick::{TickContext, Tickable};

/// Playback phase of a [`TransitionablePlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvenState {
    /// Fade-in one-shot playing.
    FadingIn,
    /// Main clip looping.
    MainClip,
    /// Fade-out one-shot playing.
    FadingOut,
    /// Silent.
    Stopped,
}

/// Plays fade-in → looping main → fade-out on request.
///
/// Requests are recorded as a target state and acted on by the next tick.
/// A request arriving during a fade is remembered and begins once the fade
/// finishes.
#[derive(Debug, Clone)]
pub struct TransitionablePlayer {
    fade_in: (ClipId, f32),
    fade_out: (ClipId, f32),
    volume: f32,
    slot: usize,
    channel: Channel,
    current: OvenState,
    target: OvenState,
    finish: Option<(f64, OvenState)>,
}

impl TransitionablePlayer {
    /// Build from config; the main loop is published on mixer `slot`.
    pub fn new(config: &OvenConfig, clips: &ClipBank, slot: usize) -> Result<Self> {
        let clip = |name: &str| -> Result<(ClipId, f32)> {
            let id = clips.id(name)?;
            Ok((id, clips.length_secs(id)))
        };
        let (main, main_len) = clip(&config.main)?;
        let mut channel = Channel::new();
        channel.load(main, main_len);
        channel.set_volume(config.volume);

        Ok(Self {
            fade_in: clip(&config.fade_in)?,
            fade_out: clip(&config.fade_out)?,
            volume: config.volume,
            slot,
            channel,
            current: OvenState::Stopped,
            target: OvenState::Stopped,
            finish: None,
        })
    }

    /// Request fade in. Only honoured from `FadingOut` or `Stopped`.
    pub fn transition_into(&mut self) {
        if matches!(self.current, OvenState::FadingOut | OvenState::Stopped) {
            self.target = OvenState::FadingIn;
        }
    }

    /// Request fade out. Only honoured from `MainClip` or `FadingIn`.
    pub fn transition_out(&mut self) {
        if matches!(self.current, OvenState::MainClip | OvenState::FadingIn) {
            self.target = OvenState::FadingOut;
        }
    }

    /// Listener for `KnobPositionChanged`.
    pub fn on_knob(&mut self, position: KnobPosition) {
        match position {
            KnobPosition::On => self.transition_into(),
            KnobPosition::Off => self.transition_out(),
        }
    }

    /// Current phase.
    pub fn state(&self) -> OvenState {
        self.current
    }

    /// The main loop channel.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    fn begin(&mut self, ctx: &mut TickContext<'_>) {
        match (self.current, self.target) {
            (OvenState::Stopped, OvenState::FadingIn) => {
                let (clip, len) = self.fade_in;
                ctx.out.play(OneShot::new(clip, self.volume));
                self.finish = Some((ctx.now + f64::from(len), OvenState::MainClip));
                self.current = OvenState::FadingIn;
                self.target = OvenState::MainClip;
            }
            (OvenState::MainClip, OvenState::FadingOut) => {
                let (clip, len) = self.fade_out;
                self.channel.stop();
                ctx.out.play(OneShot::new(clip, self.volume));
                self.finish = Some((ctx.now + f64::from(len), OvenState::Stopped));
                self.current = OvenState::FadingOut;
                self.target = OvenState::Stopped;
            }
            _ => self.target = self.current,
        }
        tracing::debug!(state = ?self.current, "oven transition");
    }
}

impl Tickable for TransitionablePlayer {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        self.channel.advance(ctx.dt);

        if let Some((at, next)) = self.finish {
            if ctx.now >= at {
                self.finish = None;
                self.current = next;
                if next == OvenState::MainClip {
                    self.channel.seek(0.0);
                    self.channel.play();
                }
            }
        }

        if self.finish.is_none() && self.current != self.target {
            self.begin(ctx);
        }

        ctx.out
            .set_channel(self.slot, ChannelState::of(&self.channel, Bus::Effects));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::test_support::Harness;
    use crate::mixer::MixCommand;

    fn player() -> TransitionablePlayer {
        let mut clips = ClipBank::new(10);
        clips.insert("in", vec![0.0; 10]);
        clips.insert("hum", vec![0.0; 40]);
        clips.insert("out", vec![0.0; 5]);
        TransitionablePlayer::new(
            &OvenConfig {
                fade_in: "in".into(),
                main: "hum".into(),
                fade_out: "out".into(),
                volume: 0.7,
            },
            &clips,
            4,
        )
        .unwrap()
    }

    fn one_shots(h: &Harness) -> usize {
        h.outbox
            .commands()
            .iter()
            .filter(|c| matches!(c, MixCommand::OneShot(_)))
            .count()
    }

    #[test]
    fn knob_on_fades_in_then_loops() {
        let mut p = player();
        let mut h = Harness::new();
        p.on_knob(KnobPosition::On);
        h.tick(&mut p, 0.5).unwrap();
        assert_eq!(p.state(), OvenState::FadingIn);
        assert_eq!(one_shots(&h), 1);
        assert!(!p.channel().is_playing());

        h.tick(&mut p, 0.5).unwrap();
        assert_eq!(p.state(), OvenState::FadingIn);
        h.tick(&mut p, 0.5).unwrap();
        assert_eq!(p.state(), OvenState::MainClip);
        assert!(p.channel().is_playing());
        assert_eq!(p.channel().volume(), 0.7);
    }

    #[test]
    fn knob_off_fades_out_to_stopped() {
        let mut p = player();
        let mut h = Harness::new();
        p.on_knob(KnobPosition::On);
        for _ in 0..3 {
            h.tick(&mut p, 0.5).unwrap();
        }
        p.on_knob(KnobPosition::Off);
        h.tick(&mut p, 0.25).unwrap();
        assert_eq!(p.state(), OvenState::FadingOut);
        assert!(!p.channel().is_playing());
        assert_eq!(one_shots(&h), 1);

        h.tick(&mut p, 0.25).unwrap();
        h.tick(&mut p, 0.25).unwrap();
        assert_eq!(p.state(), OvenState::Stopped);
    }

    #[test]
    fn off_while_stopped_is_a_no_op() {
        let mut p = player();
        let mut h = Harness::new();
        p.on_knob(KnobPosition::Off);
        h.tick(&mut p, 0.1).unwrap();
        assert_eq!(p.state(), OvenState::Stopped);
        assert_eq!(one_shots(&h), 0);
    }

    #[test]
    fn off_during_fade_in_runs_after_it() {
        let mut p = player();
        let mut h = Harness::new();
        p.on_knob(KnobPosition::On);
        h.tick(&mut p, 0.5).unwrap();
        p.on_knob(KnobPosition::Off);
        h.tick(&mut p, 0.5).unwrap();
        assert_eq!(p.state(), OvenState::FadingIn);
        h.tick(&mut p, 0.5).unwrap();
        assert_eq!(p.state(), OvenState::FadingOut);
    }
}
