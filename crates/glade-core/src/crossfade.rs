//! Two interchangeable channels and the linear crossfade between them.
//!
//! [`DualChannel`] owns exactly two [`Channel`]s, `A` and `B`, and addresses
//! them by the clip they hold. [`Crossfader`] drives one transition at a time
//! between keyed entries (music zones, day/night ambience):
//!
//! ```text
//!  begin        outgoing = base_out · (1 − p)      p ≥ 1
//!  ──────▶      incoming = base_in  · p        ──────────▶  outgoing stopped + unloaded
//!  load free    p += dt · speed, clamped               incoming = base_in
//!  channel                                             offset saved
//! ```

use core::fmt;

use crate::channel::{Channel, ClipId};
use crate::transition::Transition;

/// One of the two channels of a [`DualChannel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// First channel.
    A,
    /// Second channel.
    B,
}

impl ChannelId {
    /// The opposite channel.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// A channel lookup that could not be resolved to exactly one channel.
///
/// These indicate a bug in the caller, not a runtime condition to recover
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Neither channel holds the clip.
    ClipNotHeld(ClipId),
    /// Both channels hold the clip.
    ClipHeldTwice(ClipId),
    /// A crossfade would load the clip that is already playing.
    CrossfadeToSameClip(ClipId),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClipNotHeld(clip) => write!(f, "no channel holds {clip}"),
            Self::ClipHeldTwice(clip) => write!(f, "both channels hold {clip}"),
            Self::CrossfadeToSameClip(clip) => {
                write!(f, "crossfade source and destination are both {clip}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvariantViolation {}

/// Exactly two playback channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DualChannel {
    a: Channel,
    b: Channel,
}

impl DualChannel {
    /// Two empty channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel by id.
    #[inline]
    pub fn channel(&self, id: ChannelId) -> &Channel {
        match id {
            ChannelId::A => &self.a,
            ChannelId::B => &self.b,
        }
    }

    /// Mutable channel by id.
    #[inline]
    pub fn channel_mut(&mut self, id: ChannelId) -> &mut Channel {
        match id {
            ChannelId::A => &mut self.a,
            ChannelId::B => &mut self.b,
        }
    }

    /// The channel holding `clip`.
    pub fn source_playing(&self, clip: ClipId) -> Result<ChannelId, InvariantViolation> {
        match (self.a.holds(clip), self.b.holds(clip)) {
            (true, false) => Ok(ChannelId::A),
            (false, true) => Ok(ChannelId::B),
            (false, false) => Err(InvariantViolation::ClipNotHeld(clip)),
            (true, true) => Err(InvariantViolation::ClipHeldTwice(clip)),
        }
    }

    /// The channel *not* holding `clip`.
    ///
    /// Fails under the same conditions as [`source_playing`](Self::source_playing).
    pub fn source_not_playing(&self, clip: ClipId) -> Result<ChannelId, InvariantViolation> {
        self.source_playing(clip).map(ChannelId::other)
    }

    /// First channel with no clip loaded, falling back to `A`.
    pub fn free_channel(&self) -> ChannelId {
        if self.a.clip().is_none() || self.b.clip().is_some() {
            ChannelId::A
        } else {
            ChannelId::B
        }
    }

    /// Both channels in `A`, `B` order.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &Channel)> {
        [(ChannelId::A, &self.a), (ChannelId::B, &self.b)].into_iter()
    }

    /// Advance both channels' position estimates.
    pub fn advance(&mut self, dt: f32) {
        self.a.advance(dt);
        self.b.advance(dt);
    }
}

/// Clip, base volume and start offset for one crossfade key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeEntry {
    /// Clip to play.
    pub clip: ClipId,
    /// Clip length in seconds, 0 if unknown.
    pub length: f32,
    /// Volume once fully faded in.
    pub volume: f32,
    /// Offset in seconds to start from when faded in.
    pub resume_at: f32,
}

/// Reported when a crossfade finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeCompletion<K> {
    /// Key faded out.
    pub from: K,
    /// Key faded in.
    pub to: K,
    /// Play position of the outgoing channel at the switch.
    pub saved_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct InFlight {
    outgoing: ChannelId,
    incoming: ChannelId,
    base_out: f32,
    base_in: f32,
}

/// Linear crossfade between keyed entries on a [`DualChannel`].
///
/// `K` identifies an entry (a zone index, day or night). Entries are
/// resolved through a lookup passed to [`tick`](Self::tick) so the owner
/// can keep per-key resume offsets in its own table.
#[derive(Debug, Clone)]
pub struct Crossfader<K> {
    channels: DualChannel,
    transition: Transition<K>,
    progress: f32,
    speed: f32,
    in_flight: Option<InFlight>,
}

impl<K: Copy + PartialEq + fmt::Debug> Crossfader<K> {
    /// Start `initial` playing at full volume on the free channel.
    ///
    /// `speed` is progress per second; a fade lasts `1 / speed` seconds.
    pub fn new(initial: K, entry: &CrossfadeEntry, speed: f32) -> Self {
        let mut channels = DualChannel::new();
        let id = channels.free_channel();
        let ch = channels.channel_mut(id);
        ch.load(entry.clip, entry.length);
        ch.set_volume(entry.volume);
        ch.seek(entry.resume_at);
        ch.play();

        Self {
            channels,
            transition: Transition::new(initial),
            progress: 0.0,
            speed,
            in_flight: None,
        }
    }

    /// Both channels.
    pub fn channels(&self) -> &DualChannel {
        &self.channels
    }

    /// Mutable access to both channels.
    pub fn channels_mut(&mut self) -> &mut DualChannel {
        &mut self.channels
    }

    /// Key currently output.
    pub fn current(&self) -> K {
        self.transition.current()
    }

    /// Most recently requested key.
    pub fn target(&self) -> K {
        self.transition.target()
    }

    /// Key being faded in, if any.
    pub fn transitioning_into(&self) -> Option<K> {
        self.transition.transitioning_into()
    }

    /// Whether a fade is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_transitioning()
    }

    /// Fade progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress per second.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Request a fade to `target`.
    ///
    /// Picked up on the next tick, or after the in-flight fade completes.
    pub fn request(&mut self, target: K) {
        self.transition.request(target);
    }

    /// Advance channel positions and the fade by `dt` seconds.
    ///
    /// Begins a fade when idle and the target differs from the current key.
    /// Returns the completion record on the tick the fade finishes.
    pub fn tick(
        &mut self,
        dt: f32,
        lookup: impl Fn(K) -> CrossfadeEntry,
    ) -> Result<Option<CrossfadeCompletion<K>>, InvariantViolation> {
        self.channels.advance(dt);

        if self.in_flight.is_none() {
            self.begin(&lookup)?;
        }

        let Some(fade) = self.in_flight else {
            return Ok(None);
        };

        self.progress = (self.progress + dt * self.speed).clamp(0.0, 1.0);
        self.channels
            .channel_mut(fade.outgoing)
            .set_volume(fade.base_out * (1.0 - self.progress));
        self.channels
            .channel_mut(fade.incoming)
            .set_volume(self.progress * fade.base_in);

        if self.progress < 1.0 {
            return Ok(None);
        }

        let outgoing = self.channels.channel_mut(fade.outgoing);
        let saved_offset = outgoing.position();
        outgoing.set_volume(0.0);
        outgoing.stop();
        outgoing.unload();
        self.channels
            .channel_mut(fade.incoming)
            .set_volume(fade.base_in);

        self.in_flight = None;
        let Some((from, to)) = self.transition.complete() else {
            return Ok(None);
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(?from, ?to, saved_offset, "crossfade complete");

        Ok(Some(CrossfadeCompletion {
            from,
            to,
            saved_offset,
        }))
    }

    fn begin(&mut self, lookup: &impl Fn(K) -> CrossfadeEntry) -> Result<(), InvariantViolation> {
        let current = lookup(self.transition.current());
        let Some(into) = self.transition.begin() else {
            return Ok(());
        };
        let next = lookup(into);

        let incoming = match self.channels.source_not_playing(current.clip) {
            Ok(id) => id,
            Err(e) => {
                self.transition.abort();
                return Err(e);
            }
        };
        if next.clip == current.clip {
            self.transition.abort();
            return Err(InvariantViolation::CrossfadeToSameClip(next.clip));
        }
        let outgoing = incoming.other();

        let ch = self.channels.channel_mut(incoming);
        ch.load(next.clip, next.length);
        ch.set_volume(0.0);
        ch.seek(next.resume_at);
        ch.play();

        self.progress = 0.0;
        self.in_flight = Some(InFlight {
            outgoing,
            incoming,
            base_out: current.volume,
            base_in: next.volume,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(?into, resume_at = next.resume_at, "crossfade begin");

        Ok(())
    }
}
