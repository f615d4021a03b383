//! Small clip players: random-interval one-shots, area-gated loops and
//! click sounds.

use glade_config::{ClickableConfig, EmitterConfig, IntervalPlayerConfig};
use glade_core::{Channel, ClipId};

use crate::clips::ClipBank;
use crate::error::Result;
use crate::mixer::{Bus, ChannelState, OneShot};
use crate::tick::{TickContext, Tickable};

/// Plays a clip at start, then again after each play finishes plus a
/// random pause.
#[derive(Debug, Clone)]
pub struct IntervalPlayer {
    clip: ClipId,
    len: f32,
    pause: [f32; 2],
    volume: f32,
    next_at: Option<f64>,
}

impl IntervalPlayer {
    /// Build from config.
    pub fn new(config: &IntervalPlayerConfig, clips: &ClipBank) -> Result<Self> {
        let clip = clips.id(&config.clip)?;
        Ok(Self {
            clip,
            len: clips.length_secs(clip),
            pause: [config.min_secs, config.max_secs],
            volume: config.volume,
            next_at: None,
        })
    }

    /// When the clip plays next, once started.
    pub fn next_at(&self) -> Option<f64> {
        self.next_at
    }
}

impl Tickable for IntervalPlayer {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        if self.next_at.is_some_and(|at| ctx.now < at) {
            return Ok(());
        }
        ctx.out.play(OneShot::new(self.clip, self.volume));
        let pause = ctx.uniform(self.pause);
        self.next_at = Some(ctx.now + f64::from(self.len) + f64::from(pause));
        Ok(())
    }
}

/// A looping clip audible only while the player is inside `area`.
#[derive(Debug, Clone)]
pub struct AreaEmitter {
    area: String,
    slot: usize,
    channel: Channel,
}

impl AreaEmitter {
    /// Start the loop muted on mixer `slot`.
    pub fn new(config: &EmitterConfig, clips: &ClipBank, slot: usize) -> Result<Self> {
        let clip = clips.id(&config.clip)?;
        let mut channel = Channel::new();
        channel.load(clip, clips.length_secs(clip));
        channel.set_volume(config.volume);
        channel.set_muted(true);
        channel.play();
        Ok(Self {
            area: config.area.clone(),
            slot,
            channel,
        })
    }

    /// Area name.
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Unmute.
    pub fn enter(&mut self) {
        self.channel.set_muted(false);
    }

    /// Mute.
    pub fn exit(&mut self) {
        self.channel.set_muted(true);
    }

    /// The loop channel.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl Tickable for AreaEmitter {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        self.channel.advance(ctx.dt);
        ctx.out
            .set_channel(self.slot, ChannelState::of(&self.channel, Bus::Ambient));
        Ok(())
    }
}

/// Random clip on click.
#[derive(Debug, Clone)]
pub struct ClickSound {
    target: String,
    clips: Vec<ClipId>,
    volume: f32,
}

impl ClickSound {
    /// Build from config.
    pub fn new(config: &ClickableConfig, clips: &ClipBank) -> Result<Self> {
        Ok(Self {
            target: config.target.clone(),
            clips: clips.ids(&config.clips)?,
            volume: config.volume,
        })
    }

    /// Click target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Play one of the clips.
    pub fn click(&self, ctx: &mut TickContext<'_>) {
        if let Some(&clip) = ctx.pick(&self.clips) {
            ctx.out.play(OneShot::new(clip, self.volume));
        }
    }
}
