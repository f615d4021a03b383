//! Keyframed note envelopes and their play heads.
//!
//! An envelope is described by exactly five breakpoints, in time order:
//!
//! ```text
//!  value
//!    │      AttackRight
//!    │         ●
//!    │        ╱ ╲        SustainRight
//!    │       ╱   ●━━━━━━━━━●  (held: loops DecayRight → SustainRight)
//!    │      ╱  DecayRight    ╲
//!    │     ╱                  ╲
//!    ●────╱────────────────────●──── time
//!  AttackLeft               ReleaseRight
//! ```
//!
//! The curve is evaluated with monotone cubic Hermite interpolation, so the
//! output is continuous (C1) and never overshoots between breakpoints.
//! Outside the breakpoint range the curve holds its end values.

use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::play_head::{EnvelopeStage, PlayHead};

/// Number of breakpoints every envelope must have.
pub const BREAKPOINT_COUNT: usize = 5;

/// Play heads an [`Envelope`] reserves up front.
///
/// Presses beyond this many overlapping notes are dropped so that the audio
/// thread never allocates.
pub const MAX_PLAY_HEADS: usize = 8;

/// Names of the five envelope breakpoints, in time order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BreakpointName {
    /// Start of the attack segment.
    AttackLeft,
    /// Peak at the end of the attack segment.
    AttackRight,
    /// End of the decay segment; held notes loop back here.
    DecayRight,
    /// End of the sustain hold; released notes continue from here.
    SustainRight,
    /// End of the release segment.
    ReleaseRight,
}

impl BreakpointName {
    /// All names in time order.
    pub const ALL: [BreakpointName; BREAKPOINT_COUNT] = [
        BreakpointName::AttackLeft,
        BreakpointName::AttackRight,
        BreakpointName::DecayRight,
        BreakpointName::SustainRight,
        BreakpointName::ReleaseRight,
    ];

    /// Index of this breakpoint within the curve.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single `(time, value)` keyframe.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Breakpoint {
    /// Time in seconds from note start.
    pub time: f32,
    /// Curve value at `time`.
    pub value: f32,
}

impl Breakpoint {
    /// Create a breakpoint.
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Errors raised while building an [`EnvelopeCurve`].
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    /// The curve did not have exactly [`BREAKPOINT_COUNT`] breakpoints.
    WrongBreakpointCount(usize),
    /// Breakpoint `index` is not strictly later than the one before it.
    NonIncreasingTime {
        /// Index of the offending breakpoint.
        index: usize,
    },
    /// Breakpoint `index` contains NaN or an infinity.
    NonFinite {
        /// Index of the offending breakpoint.
        index: usize,
    },
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongBreakpointCount(n) => {
                write!(f, "envelope needs exactly {BREAKPOINT_COUNT} breakpoints, found {n}")
            }
            Self::NonIncreasingTime { index } => write!(
                f,
                "breakpoint {index} must be strictly later than breakpoint {}",
                index - 1
            ),
            Self::NonFinite { index } => write!(f, "breakpoint {index} is not finite"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EnvelopeError {}

/// Five validated breakpoints plus precomputed Hermite tangents.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeCurve {
    points: [Breakpoint; BREAKPOINT_COUNT],
    tangents: [f32; BREAKPOINT_COUNT],
}

impl EnvelopeCurve {
    /// Build a curve from five breakpoints with strictly increasing times.
    pub fn new(points: [Breakpoint; BREAKPOINT_COUNT]) -> Result<Self, EnvelopeError> {
        for (index, point) in points.iter().enumerate() {
            if !point.time.is_finite() || !point.value.is_finite() {
                return Err(EnvelopeError::NonFinite { index });
            }
            if index > 0 && point.time <= points[index - 1].time {
                return Err(EnvelopeError::NonIncreasingTime { index });
            }
        }

        Ok(Self {
            tangents: monotone_tangents(&points),
            points,
        })
    }

    /// Build a curve from `(time, value)` pairs.
    pub fn from_points(points: &[(f32, f32)]) -> Result<Self, EnvelopeError> {
        if points.len() != BREAKPOINT_COUNT {
            return Err(EnvelopeError::WrongBreakpointCount(points.len()));
        }
        let mut bps = [Breakpoint::default(); BREAKPOINT_COUNT];
        for (bp, &(time, value)) in bps.iter_mut().zip(points) {
            *bp = Breakpoint::new(time, value);
        }
        Self::new(bps)
    }

    /// Breakpoint by name.
    #[inline]
    pub fn breakpoint(&self, name: BreakpointName) -> Breakpoint {
        self.points[name.index()]
    }

    /// Time of a breakpoint by name.
    #[inline]
    pub fn time(&self, name: BreakpointName) -> f32 {
        self.points[name.index()].time
    }

    /// All breakpoints in time order.
    pub fn breakpoints(&self) -> &[Breakpoint; BREAKPOINT_COUNT] {
        &self.points
    }

    /// Evaluate the curve at `time` seconds.
    ///
    /// Holds the first value before [`BreakpointName::AttackLeft`] and the
    /// last value after [`BreakpointName::ReleaseRight`].
    #[inline]
    pub fn evaluate(&self, time: f32) -> f32 {
        let first = self.points[0];
        let last = self.points[BREAKPOINT_COUNT - 1];
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let mut i = 0;
        while i < BREAKPOINT_COUNT - 2 && time >= self.points[i + 1].time {
            i += 1;
        }

        let p0 = self.points[i];
        let p1 = self.points[i + 1];
        let h = p1.time - p0.time;
        let s = (time - p0.time) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * p0.value + h10 * h * self.tangents[i] + h01 * p1.value + h11 * h * self.tangents[i + 1]
    }
}

/// Fritsch–Carlson style tangents: flat at the ends and at local extrema,
/// harmonic mean of neighbouring secants elsewhere.
fn monotone_tangents(points: &[Breakpoint; BREAKPOINT_COUNT]) -> [f32; BREAKPOINT_COUNT] {
    let mut secants = [0.0f32; BREAKPOINT_COUNT - 1];
    for i in 0..BREAKPOINT_COUNT - 1 {
        secants[i] = (points[i + 1].value - points[i].value) / (points[i + 1].time - points[i].time);
    }

    let mut tangents = [0.0f32; BREAKPOINT_COUNT];
    for i in 1..BREAKPOINT_COUNT - 1 {
        let (d0, d1) = (secants[i - 1], secants[i]);
        if d0 * d1 > 0.0 {
            tangents[i] = 2.0 / (1.0 / d0 + 1.0 / d1);
        }
    }
    tangents
}

/// An envelope curve together with the play heads traversing it.
///
/// Presses are serialized: while a note is held, further presses are
/// ignored. A released note keeps sounding through its release segment, so
/// a new press may overlap it; overlapping heads are summed by
/// [`sample_and_advance`](Self::sample_and_advance).
///
/// # Example
///
/// ```rust
/// use glade_core::{Envelope, EnvelopeCurve};
///
/// let curve = EnvelopeCurve::from_points(&[
///     (0.0, 0.0), (0.01, 1.0), (0.02, 0.5), (0.03, 0.5), (0.04, 0.0),
/// ]).unwrap();
/// let mut env = Envelope::new(curve);
///
/// assert!(env.press());
/// assert!(!env.press()); // already held
/// assert_eq!(env.play_heads().len(), 1);
///
/// env.release();
/// for _ in 0..100 {
///     env.sample_and_advance(0.001);
/// }
/// env.maintain();
/// assert!(env.play_heads().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    curve: EnvelopeCurve,
    play_heads: Vec<PlayHead>,
    held: Option<u32>,
    next_id: u32,
}

impl Envelope {
    /// Create an envelope with no active play heads.
    pub fn new(curve: EnvelopeCurve) -> Self {
        Self {
            curve,
            play_heads: Vec::with_capacity(MAX_PLAY_HEADS),
            held: None,
            next_id: 0,
        }
    }

    /// The underlying curve.
    pub fn curve(&self) -> &EnvelopeCurve {
        &self.curve
    }

    /// Currently live play heads, oldest first.
    pub fn play_heads(&self) -> &[PlayHead] {
        &self.play_heads
    }

    /// Whether a note is currently held.
    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Start a new note.
    ///
    /// Returns `false` without doing anything if a note is already held or
    /// all [`MAX_PLAY_HEADS`] slots are busy.
    pub fn press(&mut self) -> bool {
        if self.held.is_some() || self.play_heads.len() >= MAX_PLAY_HEADS {
            return false;
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let mut head = PlayHead::new(id);
        head.press();
        self.play_heads.push(head);
        self.held = Some(id);
        true
    }

    /// Release the held note. No-op when nothing is held.
    pub fn release(&mut self) {
        let Some(id) = self.held.take() else {
            return;
        };
        if let Some(head) = self.play_heads.iter_mut().find(|h| h.id() == id) {
            head.release();
        }
    }

    /// Sum of the curve values under every play head, then advance each head
    /// by `dt` seconds.
    #[inline]
    pub fn sample_and_advance(&mut self, dt: f32) -> f32 {
        let curve = &self.curve;
        let mut sum = 0.0;
        for head in &mut self.play_heads {
            sum += curve.evaluate(head.position());
            head.advance(dt, curve);
        }
        sum
    }

    /// Stage of the newest play head, [`EnvelopeStage::Off`] when silent.
    pub fn stage(&self) -> EnvelopeStage {
        self.play_heads
            .last()
            .map_or(EnvelopeStage::Off, |h| h.stage(&self.curve))
    }

    /// Drop play heads that have finished their release segment.
    pub fn maintain(&mut self) {
        let curve = &self.curve;
        self.play_heads.retain(|h| !h.is_done(curve));
    }

    /// Drop every play head immediately.
    pub fn reset(&mut self) {
        self.play_heads.clear();
        self.held = None;
    }
}
