//! Audio-thread clip mixer and the commands that drive it.
//!
//! The tick thread never touches audio buffers. It describes what should be
//! heard as small `Copy` [`MixCommand`]s sent through a bounded
//! `crossbeam-channel`; [`ClipMixer`] drains them at the start of every
//! buffer with `try_recv` and renders:
//!
//! - looping channel slots (music, ambience, oven loop, emitters), re-seeked
//!   whenever the channel generation changes
//! - pitched one-shot voices with linear interpolation
//! - the note player and squeak voice on the synth bus
//!
//! Everything is preallocated; `render` neither locks nor allocates.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use glade_config::SnapshotConfig;
use glade_core::{AudioRenderable, Channel, ClipId, frame_count, lerp};
use glade_synth::{NotePlayer, SqueakVoice};

use crate::clips::ClipBank;

/// Capacity of the command channel.
pub const COMMAND_CAPACITY: usize = 1024;

/// Maximum simultaneous one-shot voices; further requests are dropped.
pub const MAX_ONE_SHOTS: usize = 32;

const SCRATCH_LEN: usize = 1024;

/// Mixer bus a sound is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    /// Zone music.
    Music,
    /// Day/night ambience and area emitters.
    Ambient,
    /// One-shots and the oven.
    Effects,
    /// Synthesized voices.
    Synth,
}

/// Linear gain per bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusGains {
    /// Music bus gain.
    pub music: f32,
    /// Ambience bus gain.
    pub ambient: f32,
    /// Effects bus gain.
    pub effects: f32,
    /// Synth bus gain.
    pub synth: f32,
}

impl BusGains {
    /// All buses at 1.
    pub const UNITY: Self = Self {
        music: 1.0,
        ambient: 1.0,
        effects: 1.0,
        synth: 1.0,
    };

    /// Gain of one bus.
    #[inline]
    pub fn gain(&self, bus: Bus) -> f32 {
        match bus {
            Bus::Music => self.music,
            Bus::Ambient => self.ambient,
            Bus::Effects => self.effects,
            Bus::Synth => self.synth,
        }
    }

    /// Per-bus linear interpolation.
    pub fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            music: lerp(from.music, to.music, t),
            ambient: lerp(from.ambient, to.ambient, t),
            effects: lerp(from.effects, to.effects, t),
            synth: lerp(from.synth, to.synth, t),
        }
    }
}

impl Default for BusGains {
    fn default() -> Self {
        Self::UNITY
    }
}

impl From<&SnapshotConfig> for BusGains {
    fn from(s: &SnapshotConfig) -> Self {
        Self {
            music: s.music,
            ambient: s.ambient,
            effects: s.effects,
            synth: s.synth,
        }
    }
}

/// One-shot voices that can be stopped together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceGroup {
    /// Ordinary one-shots.
    General,
    /// Footsteps; silenced when the player stops moving.
    Footsteps,
}

/// What a looping slot should be doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelState {
    /// Loaded clip.
    pub clip: Option<ClipId>,
    /// Whether the clip advances.
    pub playing: bool,
    /// Output volume; 0 while muted.
    pub volume: f32,
    /// Position to seek to when `generation` changes, in seconds.
    pub position: f32,
    /// Seek counter from [`Channel::generation`].
    pub generation: u32,
    /// Output bus.
    pub bus: Bus,
}

impl ChannelState {
    /// Snapshot of a tick-side channel.
    pub fn of(channel: &Channel, bus: Bus) -> Self {
        Self {
            clip: channel.clip(),
            playing: channel.is_playing(),
            volume: if channel.is_muted() {
                0.0
            } else {
                channel.volume()
            },
            position: channel.position(),
            generation: channel.generation(),
            bus,
        }
    }

    /// A stopped, empty slot.
    pub fn silent(bus: Bus) -> Self {
        Self {
            clip: None,
            playing: false,
            volume: 0.0,
            position: 0.0,
            generation: 0,
            bus,
        }
    }
}

/// A fire-and-forget clip playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneShot {
    /// Clip to play.
    pub clip: ClipId,
    /// Linear volume.
    pub volume: f32,
    /// Playback rate; 1 is original pitch.
    pub pitch: f32,
    /// Output bus.
    pub bus: Bus,
    /// Stop group.
    pub group: VoiceGroup,
}

impl OneShot {
    /// Play `clip` at `volume`, original pitch, on the effects bus.
    pub fn new(clip: ClipId, volume: f32) -> Self {
        Self {
            clip,
            volume,
            pitch: 1.0,
            bus: Bus::Effects,
            group: VoiceGroup::General,
        }
    }
}

/// Tick thread → audio thread message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixCommand {
    /// Update a looping slot.
    Channel {
        /// Slot index.
        slot: usize,
        /// New state.
        state: ChannelState,
    },
    /// Start a one-shot voice.
    OneShot(OneShot),
    /// Stop every one-shot in a group.
    StopGroup(VoiceGroup),
    /// Replace the bus gains.
    Buses(BusGains),
}

/// Bounded command channel between the tick and audio threads.
pub fn command_channel() -> (Sender<MixCommand>, Receiver<MixCommand>) {
    crossbeam_channel::bounded(COMMAND_CAPACITY)
}

#[derive(Debug, Clone, Copy)]
struct LoopVoice {
    state: ChannelState,
    cursor: f64,
    applied: Option<(ClipId, u32)>,
}

#[derive(Debug, Clone, Copy)]
struct OneShotVoice {
    shot: OneShot,
    cursor: f64,
}

/// Renders clips and synth voices from [`MixCommand`]s.
pub struct ClipMixer {
    clips: Vec<Arc<[f32]>>,
    clip_rate: f32,
    sample_rate: f32,
    step: f64,
    commands: Receiver<MixCommand>,
    loops: Vec<LoopVoice>,
    one_shots: Vec<OneShotVoice>,
    buses: BusGains,
    note: Option<NotePlayer>,
    squeak: Option<SqueakVoice>,
    scratch: Box<[f32; SCRATCH_LEN]>,
}

impl ClipMixer {
    /// Mixer with `slots` looping slots, rendering at `sample_rate`.
    pub fn new(bank: &ClipBank, slots: usize, commands: Receiver<MixCommand>, sample_rate: f32) -> Self {
        let clip_rate = bank.sample_rate() as f32;
        Self {
            clips: bank.shared(),
            clip_rate,
            sample_rate,
            step: playback_step(clip_rate, sample_rate),
            commands,
            loops: vec![
                LoopVoice {
                    state: ChannelState::silent(Bus::Music),
                    cursor: 0.0,
                    applied: None,
                };
                slots
            ],
            one_shots: Vec::with_capacity(MAX_ONE_SHOTS),
            buses: BusGains::UNITY,
            note: None,
            squeak: None,
            scratch: Box::new([0.0; SCRATCH_LEN]),
        }
    }

    /// Attach the note player.
    pub fn with_note(mut self, note: NotePlayer) -> Self {
        self.note = Some(note);
        self
    }

    /// Attach the squeak voice.
    pub fn with_squeak(mut self, squeak: SqueakVoice) -> Self {
        self.squeak = Some(squeak);
        self
    }

    /// Current bus gains.
    pub fn buses(&self) -> BusGains {
        self.buses
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of looping slots.
    pub fn slot_count(&self) -> usize {
        self.loops.len()
    }

    /// Last state received for a slot.
    pub fn slot(&self, slot: usize) -> Option<&ChannelState> {
        self.loops.get(slot).map(|v| &v.state)
    }

    /// Number of one-shots still sounding.
    pub fn active_one_shots(&self) -> usize {
        self.one_shots.len()
    }

    /// The note player, if attached.
    pub fn note(&self) -> Option<&NotePlayer> {
        self.note.as_ref()
    }

    /// The squeak voice, if attached.
    pub fn squeak(&self) -> Option<&SqueakVoice> {
        self.squeak.as_ref()
    }

    /// Apply every pending command.
    pub fn drain_commands(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            self.apply(cmd);
        }
    }

    fn apply(&mut self, cmd: MixCommand) {
        match cmd {
            MixCommand::Channel { slot, state } => {
                let clip_len = state.clip.and_then(|c| self.clip_len(c));
                let clip_rate = f64::from(self.clip_rate);
                if let Some(voice) = self.loops.get_mut(slot) {
                    voice.state = state;
                    let key = state.clip.map(|c| (c, state.generation));
                    if key != voice.applied {
                        voice.applied = key;
                        voice.cursor = f64::from(state.position) * clip_rate;
                        if let Some(len) = clip_len {
                            voice.cursor %= len as f64;
                        }
                    }
                }
            }
            MixCommand::OneShot(shot) => {
                if self.one_shots.len() < MAX_ONE_SHOTS && self.clip_len(shot.clip).is_some() {
                    self.one_shots.push(OneShotVoice { shot, cursor: 0.0 });
                }
            }
            MixCommand::StopGroup(group) => self.one_shots.retain(|v| v.shot.group != group),
            MixCommand::Buses(gains) => self.buses = gains,
        }
    }

    fn clip_len(&self, clip: ClipId) -> Option<usize> {
        self.clips
            .get(usize::from(clip.0))
            .map(|s| s.len())
            .filter(|&n| n > 0)
    }

    fn render_clips(&mut self, output: &mut [f32], channels: usize) {
        let frames = frame_count(output.len(), channels);
        let channels = channels.max(1);
        let buses = self.buses;
        let step = self.step;

        for frame in 0..frames {
            let mut sum = 0.0f32;

            for voice in &mut self.loops {
                let state = voice.state;
                let Some(clip) = state.clip else { continue };
                if !state.playing {
                    continue;
                }
                let Some(samples) = self.clips.get(usize::from(clip.0)) else {
                    continue;
                };
                if samples.is_empty() {
                    continue;
                }
                let gain = state.volume * buses.gain(state.bus);
                sum += gain * interpolate(samples, voice.cursor, true);
                voice.cursor += step;
                let len = samples.len() as f64;
                if voice.cursor >= len {
                    voice.cursor %= len;
                }
            }

            for voice in &mut self.one_shots {
                let Some(samples) = self.clips.get(usize::from(voice.shot.clip.0)) else {
                    continue;
                };
                if voice.cursor >= samples.len() as f64 {
                    continue;
                }
                let gain = voice.shot.volume * buses.gain(voice.shot.bus);
                sum += gain * interpolate(samples, voice.cursor, false);
                voice.cursor += step * f64::from(voice.shot.pitch.max(0.0));
            }

            let start = frame * channels;
            for s in &mut output[start..start + channels] {
                *s += sum;
            }
        }

        let clips = &self.clips;
        self.one_shots.retain(|v| {
            clips
                .get(usize::from(v.shot.clip.0))
                .is_some_and(|s| v.cursor < s.len() as f64)
        });
    }

    fn render_synths(&mut self, output: &mut [f32], channels: usize) {
        if self.note.is_none() && self.squeak.is_none() {
            return;
        }
        let channels = channels.max(1);
        let gain = self.buses.synth;

        // Synths are mono: render one sample per frame, then spread it.
        for chunk in output.chunks_mut(SCRATCH_LEN.saturating_mul(channels)) {
            let frames = frame_count(chunk.len(), channels);
            let scratch = &mut self.scratch[..frames];
            scratch.fill(0.0);
            if let Some(note) = &mut self.note {
                note.render(scratch, 1);
            }
            if let Some(squeak) = &mut self.squeak {
                squeak.render(scratch, 1);
            }
            for (frame, s) in chunk.chunks_exact_mut(channels).zip(scratch.iter()) {
                for o in frame {
                    *o += gain * s;
                }
            }
        }
    }
}

impl AudioRenderable for ClipMixer {
    fn render(&mut self, output: &mut [f32], channels: usize) {
        self.drain_commands();
        self.render_clips(output, channels);
        self.render_synths(output, channels);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.step = playback_step(self.clip_rate, sample_rate);
        if let Some(note) = &mut self.note {
            note.set_sample_rate(sample_rate);
        }
        if let Some(squeak) = &mut self.squeak {
            squeak.set_sample_rate(sample_rate);
        }
    }
}

fn playback_step(clip_rate: f32, sample_rate: f32) -> f64 {
    if sample_rate > 0.0 {
        f64::from(clip_rate) / f64::from(sample_rate)
    } else {
        0.0
    }
}

/// Linear interpolation between neighbouring samples.
#[inline]
fn interpolate(samples: &[f32], cursor: f64, wrap: bool) -> f32 {
    let len = samples.len();
    let i = cursor as usize;
    let frac = (cursor - i as f64) as f32;
    let a = samples[i.min(len - 1)];
    let b = match samples.get(i + 1) {
        Some(&b) => b,
        None if wrap => samples[0],
        None => 0.0,
    };
    a + (b - a) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_core::EnvelopeCurve;
    use glade_synth::NoteSettings;

    fn bank() -> ClipBank {
        let mut bank = ClipBank::new(4);
        bank.insert("ramp", vec![0.0, 0.25, 0.5, 0.75]);
        bank.insert("dc", vec![1.0; 4]);
        bank
    }

    fn mixer(slots: usize) -> (Sender<MixCommand>, ClipMixer) {
        let (tx, rx) = command_channel();
        (tx, ClipMixer::new(&bank(), slots, rx, 4.0))
    }

    fn playing(clip: ClipId, volume: f32, generation: u32) -> ChannelState {
        ChannelState {
            clip: Some(clip),
            playing: true,
            volume,
            position: 0.0,
            generation,
            bus: Bus::Music,
        }
    }

    #[test]
    fn looping_slot_wraps() {
        let (tx, mut m) = mixer(1);
        tx.send(MixCommand::Channel {
            slot: 0,
            state: playing(ClipId(0), 1.0, 1),
        })
        .unwrap();
        let mut out = vec![0.0; 6];
        m.render(&mut out, 1);
        assert_eq!(out, vec![0.0, 0.25, 0.5, 0.75, 0.0, 0.25]);
    }

    #[test]
    fn seek_applies_on_generation_change_only() {
        let (tx, mut m) = mixer(1);
        let mut state = playing(ClipId(0), 1.0, 1);
        state.position = 0.5;
        tx.send(MixCommand::Channel { slot: 0, state }).unwrap();
        let mut out = vec![0.0; 1];
        m.render(&mut out, 1);
        assert_eq!(out[0], 0.5);

        // Same generation, new position estimate: keep playing where we are.
        state.position = 0.0;
        tx.send(MixCommand::Channel { slot: 0, state }).unwrap();
        let mut out = vec![0.0; 1];
        m.render(&mut out, 1);
        assert_eq!(out[0], 0.75);
    }

    #[test]
    fn seek_past_the_end_wraps_into_the_clip() {
        let (tx, mut m) = mixer(1);
        let mut state = playing(ClipId(0), 1.0, 1);
        // 1.25 s at 4 Hz is frame 5 of a 4-frame loop.
        state.position = 1.25;
        tx.send(MixCommand::Channel { slot: 0, state }).unwrap();
        let mut out = vec![0.0; 2];
        m.render(&mut out, 1);
        assert_eq!(out, vec![0.25, 0.5]);
    }

    #[test]
    fn one_shot_plays_once_and_is_dropped() {
        let (tx, mut m) = mixer(0);
        tx.send(MixCommand::OneShot(OneShot::new(ClipId(1), 0.5)))
            .unwrap();
        let mut out = vec![0.0; 12];
        m.render(&mut out, 2);
        assert!(out[..8].iter().all(|&s| s == 0.5));
        assert!(out[8..].iter().all(|&s| s == 0.0));
        assert_eq!(m.active_one_shots(), 0);
    }

    #[test]
    fn pitched_one_shot_finishes_early() {
        let (tx, mut m) = mixer(0);
        let mut shot = OneShot::new(ClipId(1), 1.0);
        shot.pitch = 2.0;
        tx.send(MixCommand::OneShot(shot)).unwrap();
        let mut out = vec![0.0; 4];
        m.render(&mut out, 1);
        assert_eq!(out, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn stop_group_silences_only_that_group() {
        let (tx, mut m) = mixer(0);
        let mut step = OneShot::new(ClipId(1), 1.0);
        step.group = VoiceGroup::Footsteps;
        tx.send(MixCommand::OneShot(step)).unwrap();
        tx.send(MixCommand::OneShot(OneShot::new(ClipId(1), 1.0)))
            .unwrap();
        m.drain_commands();
        assert_eq!(m.active_one_shots(), 2);
        tx.send(MixCommand::StopGroup(VoiceGroup::Footsteps)).unwrap();
        m.drain_commands();
        assert_eq!(m.active_one_shots(), 1);
    }

    #[test]
    fn bus_gain_scales_output() {
        let (tx, mut m) = mixer(1);
        tx.send(MixCommand::Buses(BusGains {
            music: 0.5,
            ..BusGains::UNITY
        }))
        .unwrap();
        tx.send(MixCommand::Channel {
            slot: 0,
            state: playing(ClipId(1), 0.5, 1),
        })
        .unwrap();
        let mut out = vec![0.0; 2];
        m.render(&mut out, 1);
        assert_eq!(out, vec![0.25, 0.25]);
    }

    #[test]
    fn stopped_slot_is_silent() {
        let (tx, mut m) = mixer(1);
        let mut state = playing(ClipId(1), 1.0, 1);
        state.playing = false;
        tx.send(MixCommand::Channel { slot: 0, state }).unwrap();
        let mut out = vec![0.0; 4];
        m.render(&mut out, 1);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn one_shot_capacity_is_bounded() {
        let (tx, mut m) = mixer(0);
        for _ in 0..MAX_ONE_SHOTS + 5 {
            tx.send(MixCommand::OneShot(OneShot::new(ClipId(1), 0.0)))
                .unwrap();
        }
        m.drain_commands();
        assert_eq!(m.active_one_shots(), MAX_ONE_SHOTS);
    }

    #[test]
    fn note_renders_on_synth_bus() {
        let curve = EnvelopeCurve::from_points(&[
            (0.0, 1.0),
            (0.5, 1.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (3.0, 0.0),
        ])
        .unwrap();
        let note = NotePlayer::new(curve, NoteSettings { frequency: 1.0, gain: 1.0 }, 4.0);
        let gate = note.gate();
        let (tx, m) = mixer(0);
        let mut m = m.with_note(note);
        gate.press();

        let mut loud = vec![0.0; 4];
        m.render(&mut loud, 1);
        tx.send(MixCommand::Buses(BusGains {
            synth: 0.0,
            ..BusGains::UNITY
        }))
        .unwrap();
        let mut muted = vec![0.0; 4];
        m.render(&mut muted, 1);

        assert!(loud.iter().any(|s| s.abs() > 0.5));
        assert!(muted.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn synths_spread_over_wide_layouts() {
        let curve = EnvelopeCurve::from_points(&[
            (0.0, 1.0),
            (0.5, 1.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (3.0, 0.0),
        ])
        .unwrap();
        let note = NotePlayer::new(curve, NoteSettings { frequency: 1.0, gain: 1.0 }, 4.0);
        let gate = note.gate();
        let (_tx, m) = mixer(0);
        let mut m = m.with_note(note);
        gate.press();

        let channels = SCRATCH_LEN * 2;
        let mut out = vec![0.0; channels * 2];
        m.render(&mut out, channels);

        for frame in out.chunks_exact(channels) {
            assert!(frame.iter().all(|&s| s == frame[0]));
        }
        assert!(out.iter().any(|s| s.abs() > 0.5));
    }
}
