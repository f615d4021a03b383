//! Integration tests for glade-core.
//!
//! Exercises the primitives together the way the engine does: a crossfader
//! whose owner keeps per-key resume offsets, and an envelope driven at audio
//! rate through press, sustain and release.

use glade_core::{
    BreakpointName, ChannelId, ClipId, CrossfadeEntry, Crossfader, Envelope, EnvelopeCurve,
    Transition,
};

const SAMPLE_RATE: f32 = 48000.0;

fn pluck() -> EnvelopeCurve {
    EnvelopeCurve::from_points(&[
        (0.0, 0.0),
        (0.01, 1.0),
        (0.05, 0.4),
        (0.1, 0.4),
        (0.3, 0.0),
    ])
    .unwrap()
}

// ============================================================================
// 1. Crossfading with resume offsets
// ============================================================================

struct ZoneTable {
    entries: Vec<CrossfadeEntry>,
}

impl ZoneTable {
    fn lookup(&self, zone: usize) -> CrossfadeEntry {
        self.entries[zone]
    }
}

fn run_until_complete(
    xf: &mut Crossfader<usize>,
    table: &mut ZoneTable,
    dt: f32,
) -> glade_core::CrossfadeCompletion<usize> {
    for _ in 0..10_000 {
        let done = xf.tick(dt, |z| table.lookup(z)).unwrap();
        if let Some(done) = done {
            table.entries[done.from].resume_at = done.saved_offset;
            return done;
        }
    }
    panic!("crossfade did not complete");
}

#[test]
fn zone_round_trip_resumes_saved_offset() {
    let mut table = ZoneTable {
        entries: vec![
            CrossfadeEntry {
                clip: ClipId(10),
                length: 20.0,
                volume: 1.0,
                resume_at: 0.0,
            },
            CrossfadeEntry {
                clip: ClipId(11),
                length: 20.0,
                volume: 0.6,
                resume_at: 0.0,
            },
        ],
    };
    let mut xf = Crossfader::new(0usize, &table.lookup(0), 2.0);

    // Let zone 0 play for a while, then cross to zone 1.
    xf.tick(1.5, |z| table.lookup(z)).unwrap();
    xf.request(1);
    let first = run_until_complete(&mut xf, &mut table, 0.125);
    assert_eq!((first.from, first.to), (0, 1));
    assert!((table.entries[0].resume_at - 2.0).abs() < 1e-4);

    // Back to zone 0: it must restart from where it left off.
    xf.request(0);
    xf.tick(0.0, |z| table.lookup(z)).unwrap();
    let incoming = xf.channels().source_playing(ClipId(10)).unwrap();
    assert_eq!(incoming, ChannelId::A);
    assert!((xf.channels().channel(incoming).position() - 2.0).abs() < 1e-4);

    let second = run_until_complete(&mut xf, &mut table, 0.125);
    assert_eq!((second.from, second.to), (1, 0));
    assert_eq!(xf.channels().channel(ChannelId::A).volume(), 1.0);
    assert_eq!(xf.channels().channel(ChannelId::B).clip(), None);
}

#[test]
fn only_one_channel_audible_when_idle() {
    let table = ZoneTable {
        entries: vec![
            CrossfadeEntry {
                clip: ClipId(0),
                length: 20.0,
                volume: 0.9,
                resume_at: 0.0,
            },
            CrossfadeEntry {
                clip: ClipId(1),
                length: 20.0,
                volume: 0.9,
                resume_at: 0.0,
            },
        ],
    };
    let mut xf = Crossfader::new(0usize, &table.lookup(0), 4.0);
    xf.request(1);
    for _ in 0..100 {
        xf.tick(0.01, |z| table.lookup(z)).unwrap();
    }
    let audible = xf
        .channels()
        .iter()
        .filter(|(_, ch)| ch.effective_volume() > 0.0)
        .count();
    assert_eq!(audible, 1);
}

// ============================================================================
// 2. Envelope at audio rate
// ============================================================================

#[test]
fn envelope_sustains_then_releases_at_audio_rate() {
    let mut env = Envelope::new(pluck());
    let dt = 1.0 / SAMPLE_RATE;
    env.press();

    // One second of hold: far beyond the sustain breakpoint.
    let mut last = 0.0;
    for _ in 0..SAMPLE_RATE as usize {
        last = env.sample_and_advance(dt);
    }
    env.maintain();
    assert_eq!(env.play_heads().len(), 1);
    assert!((last - 0.4).abs() < 0.01, "sustain level {last}");

    env.release();
    let release_end = env.curve().time(BreakpointName::ReleaseRight);
    let frames = ((release_end + 0.01) * SAMPLE_RATE) as usize;
    for _ in 0..frames {
        env.sample_and_advance(dt);
    }
    env.maintain();
    assert!(env.play_heads().is_empty());
}

#[test]
fn envelope_output_is_continuous() {
    let mut env = Envelope::new(pluck());
    let dt = 1.0 / SAMPLE_RATE;
    env.press();

    let mut prev = env.sample_and_advance(dt);
    for i in 0..(SAMPLE_RATE as usize / 2) {
        if i == 6000 {
            env.release();
        }
        let v = env.sample_and_advance(dt);
        assert!((v - prev).abs() < 0.01, "jump {prev} -> {v} at frame {i}");
        prev = v;
    }
}

// ============================================================================
// 3. Transition slots
// ============================================================================

#[test]
fn transition_latest_request_wins_after_completion() {
    let mut t = Transition::new('a');
    t.request('b');
    assert_eq!(t.begin(), Some('b'));
    t.request('c');
    t.request('d');
    t.complete();
    assert_eq!(t.begin(), Some('d'));
}
