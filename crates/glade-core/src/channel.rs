//! Tick-side state of a single playback channel.
//!
//! A [`Channel`] does not produce audio itself. It records what the audio
//! thread should be doing (which clip, how loud, from which offset) and keeps
//! its own estimate of the play position so that offsets can be saved and
//! resumed without asking the audio thread. The estimate wraps at the clip
//! length the same way the looping voice does.

use core::fmt;

/// Identity of a loaded clip.
///
/// Clip ids are indices into the clip table built at startup; two channels
/// hold "the same clip" exactly when their ids compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(pub u16);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClipId({})", self.0)
    }
}

/// Playback channel state owned by the tick thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    clip: Option<ClipId>,
    volume: f32,
    playing: bool,
    muted: bool,
    position: f32,
    length: f32,
    generation: u32,
}

impl Channel {
    /// Create an empty, stopped channel at volume 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clip currently loaded, if any.
    #[inline]
    pub fn clip(&self) -> Option<ClipId> {
        self.clip
    }

    /// Whether `clip` is the loaded clip.
    #[inline]
    pub fn holds(&self, clip: ClipId) -> bool {
        self.clip == Some(clip)
    }

    /// Load a clip `length_secs` long. The play position resets to 0 and
    /// playback stops.
    ///
    /// A length of 0 means unknown: the position is then never wrapped.
    pub fn load(&mut self, clip: ClipId, length_secs: f32) {
        self.clip = Some(clip);
        self.playing = false;
        self.position = 0.0;
        self.length = length_secs.max(0.0);
    }

    /// Unload the clip and stop.
    pub fn unload(&mut self) {
        self.clip = None;
        self.playing = false;
        self.position = 0.0;
        self.length = 0.0;
    }

    /// Start (or restart) playback from the current position.
    pub fn play(&mut self) {
        self.playing = true;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Stop playback, keeping the clip loaded.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Jump to `seconds` into the clip, wrapped to the clip length.
    pub fn seek(&mut self, seconds: f32) {
        self.position = self.wrap(seconds.max(0.0));
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whether the channel is playing.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Linear volume.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the linear volume (negative values clamp to 0).
    #[inline]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.max(0.0);
    }

    /// Whether output is muted (playback keeps advancing).
    #[inline]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mute or unmute output.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Estimated play position in seconds, in `[0, length)` when the
    /// length is known.
    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Length of the loaded clip in seconds, 0 if unknown.
    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Counter bumped on every `play` and `seek`.
    ///
    /// The audio thread re-seeks its voice whenever this changes.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Volume as heard, i.e. 0 when stopped or muted.
    #[inline]
    pub fn effective_volume(&self) -> f32 {
        if self.playing && !self.muted { self.volume } else { 0.0 }
    }

    /// Advance the position estimate by `dt` seconds while playing.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        if self.playing {
            self.position = self.wrap(self.position + dt);
        }
    }

    fn wrap(&self, position: f32) -> f32 {
        if self.length > 0.0 && position >= self.length {
            position % self.length
        } else {
            position
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_resets_position() {
        let mut ch = Channel::new();
        ch.load(ClipId(1), 10.0);
        ch.play();
        ch.advance(2.0);
        ch.load(ClipId(2), 10.0);
        assert_eq!(ch.position(), 0.0);
        assert!(!ch.is_playing());
        assert!(ch.holds(ClipId(2)));
    }

    #[test]
    fn advance_only_while_playing() {
        let mut ch = Channel::new();
        ch.load(ClipId(0), 10.0);
        ch.advance(1.0);
        assert_eq!(ch.position(), 0.0);
        ch.play();
        ch.advance(1.0);
        assert_eq!(ch.position(), 1.0);
    }

    #[test]
    fn position_wraps_at_clip_length() {
        let mut ch = Channel::new();
        ch.load(ClipId(0), 10.0);
        ch.play();
        for _ in 0..25 {
            ch.advance(1.0);
        }
        assert_eq!(ch.position(), 5.0);

        ch.seek(32.0);
        assert_eq!(ch.position(), 2.0);
    }

    #[test]
    fn unknown_length_never_wraps() {
        let mut ch = Channel::new();
        ch.load(ClipId(0), 0.0);
        ch.play();
        ch.advance(25.0);
        assert_eq!(ch.position(), 25.0);
        ch.unload();
        assert_eq!(ch.length(), 0.0);
    }

    #[test]
    fn generation_bumps_on_play_and_seek() {
        let mut ch = Channel::new();
        let g0 = ch.generation();
        ch.play();
        ch.seek(3.0);
        assert_eq!(ch.generation(), g0.wrapping_add(2));
        assert_eq!(ch.position(), 3.0);
    }

    #[test]
    fn effective_volume_respects_mute() {
        let mut ch = Channel::new();
        ch.load(ClipId(0), 10.0);
        ch.set_volume(0.8);
        assert_eq!(ch.effective_volume(), 0.0);
        ch.play();
        assert_eq!(ch.effective_volume(), 0.8);
        ch.set_muted(true);
        assert_eq!(ch.effective_volume(), 0.0);
    }
}
