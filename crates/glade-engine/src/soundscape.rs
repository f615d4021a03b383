//! The tick-thread orchestrator.
//!
//! A [`Soundscape`] owns every manager, advances them once per tick in a
//! fixed order and routes what they produce:
//!
//! ```text
//!  game input ──▶ Soundscape ──tick──▶ manager ──▶ Outbox
//!                     ▲                              │
//!                     │    events ◀──────────────────┤ (dispatched at once)
//!                     │    blend  ──▶ SnapshotBlender┤
//!                     └────────────── commands ──────┴──▶ crossbeam ──▶ ClipMixer
//! ```
//!
//! The outbox is flushed right after each manager, so an event raised
//! mid-tick reaches its listeners before any later manager runs. The day/night
//! controller runs before the ambience manager, so a time change starts the
//! ambience crossfade in the same tick.

use std::collections::HashMap;

use crossbeam_channel::{Sender, TrySendError};
use glade_config::{PlayerEffect, SoundscapeConfig};
use glade_core::EnvelopeCurve;
use glade_synth::{NotePlayer, NoteSettings, SqueakVoice};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::clips::ClipBank;
use crate::error::{EngineError, Result};
use crate::event::{EventKind, SoundscapeEvent, TransitionListener};
use crate::managers::{
    AmbientSoundManager, AreaEmitter, ClickSound, DayNightController, EffectZoneManager,
    FootstepSystem, IntervalPlayer, Knob, MusicZoneManager, NoteTrigger, PlayerEffectManager,
    PoisonSquealTrigger, TransitionablePlayer,
};
use crate::mixer::{BusGains, ChannelState, ClipMixer, MixCommand, command_channel};
use crate::snapshot::{SnapshotBlender, SnapshotTable};
use crate::tick::{Outbox, TickContext, Tickable};

const MUSIC_SLOTS: [usize; 2] = [0, 1];
const AMBIENT_SLOTS: [usize; 2] = [2, 3];
const OVEN_SLOT: usize = 4;
const FIRST_EMITTER_SLOT: usize = 5;

/// What a click on a target does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickRoute {
    DayNight,
    Knob,
    Note,
    Effect(PlayerEffect),
    Sound(usize),
}

/// Receiver of a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Ambient,
    Oven,
    PoisonSqueal,
    External(usize),
}

/// The soundscape simulation driven from the game (or CLI) thread.
pub struct Soundscape {
    clips: ClipBank,
    now: f64,
    rng: SmallRng,

    music: MusicZoneManager,
    ambient: Option<AmbientSoundManager>,
    effect_zone: Option<EffectZoneManager>,
    player_effects: Option<PlayerEffectManager>,
    squeal: Option<PoisonSquealTrigger>,
    day_night: Option<DayNightController>,
    knob: Option<Knob>,
    oven: Option<TransitionablePlayer>,
    note: Option<NoteTrigger>,
    footsteps: Option<FootstepSystem>,
    interval_players: Vec<IntervalPlayer>,
    emitters: Vec<AreaEmitter>,
    click_sounds: Vec<ClickSound>,

    snapshots: SnapshotTable,
    blender: SnapshotBlender,

    click_routes: HashMap<String, ClickRoute>,
    routes: [Vec<Route>; EventKind::ALL.len()],
    listeners: Vec<Box<dyn TransitionListener>>,

    outbox: Outbox,
    commands: Sender<MixCommand>,
    sent: Vec<Option<ChannelState>>,
}

impl Soundscape {
    /// Build the managers and the matching audio-thread mixer.
    ///
    /// `sample_rate` is the output rate the mixer renders at; `seed` drives
    /// every random pick (footsteps, one-shot variations, interval pauses).
    pub fn build(
        config: &SoundscapeConfig,
        clips: ClipBank,
        sample_rate: f32,
        seed: u64,
    ) -> Result<(Self, ClipMixer)> {
        let snapshots = SnapshotTable::from_config(&config.snapshots);

        let music = MusicZoneManager::new(&config.music, &clips, MUSIC_SLOTS)?;
        let ambient = config
            .ambient
            .as_ref()
            .map(|c| AmbientSoundManager::new(c, &clips, AMBIENT_SLOTS))
            .transpose()?;
        let effect_zone = config
            .effect_zone
            .as_ref()
            .map(|c| EffectZoneManager::new(c, &snapshots))
            .transpose()?;
        let player_effects = if config.player_effects.is_empty() {
            None
        } else {
            Some(PlayerEffectManager::new(
                &config.player_effects,
                &clips,
                &snapshots,
            )?)
        };
        let day_night = config.day_night.as_ref().map(DayNightController::new);
        let knob = config
            .knob
            .as_ref()
            .map(|c| Knob::new(c, &clips))
            .transpose()?;
        let oven = config
            .oven
            .as_ref()
            .map(|c| TransitionablePlayer::new(c, &clips, OVEN_SLOT))
            .transpose()?;
        let footsteps = config
            .footsteps
            .as_ref()
            .map(|c| FootstepSystem::new(c, &clips))
            .transpose()?;
        let interval_players = config
            .interval_players
            .iter()
            .map(|c| IntervalPlayer::new(c, &clips))
            .collect::<Result<Vec<_>>>()?;
        let emitters = config
            .emitters
            .iter()
            .enumerate()
            .map(|(i, c)| AreaEmitter::new(c, &clips, FIRST_EMITTER_SLOT + i))
            .collect::<Result<Vec<_>>>()?;
        let click_sounds = config
            .clickables
            .iter()
            .map(|c| ClickSound::new(c, &clips))
            .collect::<Result<Vec<_>>>()?;

        let slots = FIRST_EMITTER_SLOT + emitters.len();
        let (commands, receiver) = command_channel();
        let mut mixer = ClipMixer::new(&clips, slots, receiver, sample_rate);

        let mut note = None;
        if let Some(cfg) = &config.note {
            let points: Vec<(f32, f32)> = cfg.envelope.iter().map(|&[t, v]| (t, v)).collect();
            let curve = EnvelopeCurve::from_points(&points)?;
            let settings = NoteSettings {
                frequency: cfg.frequency,
                gain: cfg.gain,
            };
            let player = NotePlayer::new(curve, settings, sample_rate);
            note = Some(NoteTrigger::new(
                cfg.target.clone(),
                player.gate(),
                cfg.release_after_secs,
            ));
            mixer = mixer.with_note(player);
        }

        let mut squeal = None;
        if let Some(cfg) = &config.squeak {
            let voice = SqueakVoice::new(cfg.pitch, cfg.max_volume, sample_rate);
            squeal = Some(PoisonSquealTrigger::new(voice.control()));
            mixer = mixer.with_squeak(voice);
        }

        let mut click_routes = HashMap::new();
        if let Some(dn) = &day_night {
            click_routes.insert(dn.target().to_string(), ClickRoute::DayNight);
        }
        if let Some(k) = &knob {
            click_routes.insert(k.target().to_string(), ClickRoute::Knob);
        }
        if let Some(n) = &note {
            click_routes.insert(n.target().to_string(), ClickRoute::Note);
        }
        for trigger in &config.effect_triggers {
            click_routes.insert(trigger.target.clone(), ClickRoute::Effect(trigger.effect));
        }
        for (i, sound) in click_sounds.iter().enumerate() {
            click_routes.insert(sound.target().to_string(), ClickRoute::Sound(i));
        }

        let mut routes: [Vec<Route>; EventKind::ALL.len()] = Default::default();
        if ambient.is_some() {
            routes[EventKind::TimeChanged.index()].push(Route::Ambient);
        }
        if oven.is_some() {
            routes[EventKind::KnobPositionChanged.index()].push(Route::Oven);
        }
        if squeal.is_some() {
            routes[EventKind::PlayerEffectTransitionBegin.index()].push(Route::PoisonSqueal);
        }

        let resting = effect_zone
            .as_ref()
            .map_or(BusGains::UNITY, EffectZoneManager::resting_gains);

        tracing::info!(
            clips = clips.len(),
            zones = music.zones().len(),
            emitters = emitters.len(),
            click_targets = click_routes.len(),
            sample_rate,
            "soundscape built"
        );

        let mut soundscape = Self {
            clips,
            now: 0.0,
            rng: SmallRng::seed_from_u64(seed),
            music,
            ambient,
            effect_zone,
            player_effects,
            squeal,
            day_night,
            knob,
            oven,
            note,
            footsteps,
            interval_players,
            emitters,
            click_sounds,
            snapshots,
            blender: SnapshotBlender::new(resting),
            click_routes,
            routes,
            listeners: Vec::new(),
            outbox: Outbox::new(),
            commands,
            sent: vec![None; slots],
        };
        soundscape.send(MixCommand::Buses(resting));
        Ok((soundscape, mixer))
    }

    /// Advance every manager by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        self.now += f64::from(dt);
        let now = self.now;

        if let Some(m) = &mut self.day_night {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
            self.flush();
        }
        if let Some(m) = &mut self.knob {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
            self.flush();
        }
        if let Some(m) = &mut self.player_effects {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
            self.flush();
        }
        if let Some(m) = &mut self.effect_zone {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
            self.flush();
        }
        step(&mut self.music, dt, now, &mut self.rng, &mut self.outbox)?;
        self.flush();
        if let Some(m) = &mut self.ambient {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
            self.flush();
        }
        if let Some(m) = &mut self.oven {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
            self.flush();
        }
        if let Some(m) = &mut self.note {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
        }
        if let Some(m) = &mut self.footsteps {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
        }
        for m in &mut self.interval_players {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
        }
        for m in &mut self.emitters {
            step(m, dt, now, &mut self.rng, &mut self.outbox)?;
        }
        self.flush();

        if self.blender.advance(dt) {
            self.send(MixCommand::Buses(self.blender.current()));
        }
        Ok(())
    }

    /// The player entered an area.
    ///
    /// An area may be a music zone, the effect zone and any number of emitter
    /// areas at once. Fails with [`EngineError::UnknownZone`] if nothing
    /// listens to `area`.
    pub fn enter_area(&mut self, area: &str) -> Result<()> {
        let mut known = false;
        if self.music.has_zone(area) {
            self.music.enter_zone(area)?;
            known = true;
        }
        if let Some(zone) = self.effect_zone.as_mut().filter(|z| z.area() == area) {
            zone.enter();
            known = true;
        }
        for emitter in self.emitters.iter_mut().filter(|e| e.area() == area) {
            emitter.enter();
            known = true;
        }
        if known {
            Ok(())
        } else {
            Err(EngineError::UnknownZone(area.to_string()))
        }
    }

    /// The player left an area. Music zones ignore exits.
    pub fn exit_area(&mut self, area: &str) -> Result<()> {
        let mut known = self.music.has_zone(area);
        if let Some(zone) = self.effect_zone.as_mut().filter(|z| z.area() == area) {
            zone.exit();
            known = true;
        }
        for emitter in self.emitters.iter_mut().filter(|e| e.area() == area) {
            emitter.exit();
            known = true;
        }
        if known {
            Ok(())
        } else {
            Err(EngineError::UnknownZone(area.to_string()))
        }
    }

    /// The player clicked `target`. Unknown targets are logged and ignored.
    pub fn click(&mut self, target: &str) -> Result<()> {
        let Some(&route) = self.click_routes.get(target) else {
            tracing::warn!(target, "click on unknown target");
            return Ok(());
        };
        let mut ctx = TickContext {
            dt: 0.0,
            now: self.now,
            rng: &mut self.rng,
            out: &mut self.outbox,
        };
        match route {
            ClickRoute::DayNight => {
                if let Some(dn) = &mut self.day_night {
                    dn.click();
                }
            }
            ClickRoute::Knob => {
                if let Some(knob) = &mut self.knob {
                    knob.click(&mut ctx);
                }
            }
            ClickRoute::Note => {
                if let Some(note) = &mut self.note {
                    note.click(self.now);
                }
            }
            ClickRoute::Effect(effect) => {
                let manager = self
                    .player_effects
                    .as_mut()
                    .ok_or(EngineError::UnknownEffect(effect))?;
                manager.transition_to(effect, &mut ctx)?;
            }
            ClickRoute::Sound(i) => self.click_sounds[i].click(&mut ctx),
        }
        self.flush();
        Ok(())
    }

    /// Ask the player effect manager to transition to `effect`.
    ///
    /// Returns whether a transition started; requests during a transition
    /// or for the current effect are ignored.
    pub fn request_effect(&mut self, effect: PlayerEffect) -> Result<bool> {
        let manager = self
            .player_effects
            .as_mut()
            .ok_or(EngineError::UnknownEffect(effect))?;
        let mut ctx = TickContext {
            dt: 0.0,
            now: self.now,
            rng: &mut self.rng,
            out: &mut self.outbox,
        };
        let started = manager.transition_to(effect, &mut ctx)?;
        self.flush();
        Ok(started)
    }

    /// Whether the player is walking.
    pub fn set_moving(&mut self, moving: bool) {
        if let Some(f) = &mut self.footsteps {
            f.set_moving(moving);
        }
    }

    /// Surface under the player; `None` when nothing was hit.
    pub fn set_surface(&mut self, surface: Option<&str>) {
        if let Some(f) = &mut self.footsteps {
            f.set_surface(surface);
        }
    }

    /// Register a listener for every event, after the built-in ones.
    pub fn subscribe(&mut self, listener: impl TransitionListener + 'static) {
        let index = self.listeners.len();
        self.listeners.push(Box::new(listener));
        for kind in EventKind::ALL {
            self.routes[kind.index()].push(Route::External(index));
        }
    }

    /// Seconds simulated so far.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Clip table.
    pub fn clips(&self) -> &ClipBank {
        &self.clips
    }

    /// Named snapshots.
    pub fn snapshots(&self) -> &SnapshotTable {
        &self.snapshots
    }

    /// Bus gain blender.
    pub fn blender(&self) -> &SnapshotBlender {
        &self.blender
    }

    /// Music zones.
    pub fn music(&self) -> &MusicZoneManager {
        &self.music
    }

    /// Day/night ambience, if configured.
    pub fn ambient(&self) -> Option<&AmbientSoundManager> {
        self.ambient.as_ref()
    }

    /// Effect zone, if configured.
    pub fn effect_zone(&self) -> Option<&EffectZoneManager> {
        self.effect_zone.as_ref()
    }

    /// Player effects, if configured.
    pub fn player_effects(&self) -> Option<&PlayerEffectManager> {
        self.player_effects.as_ref()
    }

    /// Day/night controller, if configured.
    pub fn day_night(&self) -> Option<&DayNightController> {
        self.day_night.as_ref()
    }

    /// Knob, if configured.
    pub fn knob(&self) -> Option<&Knob> {
        self.knob.as_ref()
    }

    /// Oven player, if configured.
    pub fn oven(&self) -> Option<&TransitionablePlayer> {
        self.oven.as_ref()
    }

    /// Note trigger, if configured.
    pub fn note(&self) -> Option<&NoteTrigger> {
        self.note.as_ref()
    }

    /// Footsteps, if configured.
    pub fn footsteps(&self) -> Option<&FootstepSystem> {
        self.footsteps.as_ref()
    }

    /// Area emitters.
    pub fn emitters(&self) -> &[AreaEmitter] {
        &self.emitters
    }

    /// Click targets with a handler.
    pub fn click_targets(&self) -> impl Iterator<Item = &str> {
        self.click_routes.keys().map(String::as_str)
    }

    fn flush(&mut self) {
        if self.outbox.is_empty() {
            return;
        }
        let out = std::mem::take(&mut self.outbox);
        for cmd in out.commands {
            self.send(cmd);
        }
        if let Some((gains, secs)) = out.blend {
            self.blender.blend_to(gains, secs);
        }
        for event in &out.events {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: &SoundscapeEvent) {
        for &route in &self.routes[event.kind().index()] {
            match (route, *event) {
                (Route::Ambient, SoundscapeEvent::TimeChanged(time)) => {
                    if let Some(ambient) = &mut self.ambient {
                        ambient.on_time_changed(time);
                    }
                }
                (Route::Oven, SoundscapeEvent::KnobPositionChanged(position)) => {
                    if let Some(oven) = &mut self.oven {
                        oven.on_knob(position);
                    }
                }
                (
                    Route::PoisonSqueal,
                    SoundscapeEvent::PlayerEffectTransitionBegin {
                        target,
                        transition_secs,
                    },
                ) => {
                    if let Some(squeal) = &self.squeal {
                        squeal.on_player_effect(target, transition_secs);
                    }
                }
                (Route::External(i), _) => {
                    if let Some(listener) = self.listeners.get_mut(i) {
                        listener.on_event(event);
                    }
                }
                _ => {}
            }
        }
    }

    fn send(&mut self, cmd: MixCommand) {
        if let MixCommand::Channel { slot, state } = cmd {
            match self.sent.get_mut(slot) {
                Some(last) if *last == Some(state) => return,
                Some(last) => *last = Some(state),
                None => {}
            }
        }
        match self.commands.try_send(cmd) {
            Ok(()) => {}
            Err(TrySendError::Full(cmd)) => {
                tracing::warn!(?cmd, "mixer command queue full, dropping");
                if let MixCommand::Channel { slot, .. } = cmd {
                    if let Some(last) = self.sent.get_mut(slot) {
                        *last = None;
                    }
                }
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

fn step(
    manager: &mut impl Tickable,
    dt: f32,
    now: f64,
    rng: &mut SmallRng,
    out: &mut Outbox,
) -> Result<()> {
    let mut ctx = TickContext { dt, now, rng, out };
    manager.tick(&mut ctx)
}
