//! Integration tests for glade-synth.
//!
//! Drives the note player and squeak voice the way the audio callback does:
//! fixed-size buffers, gate and control changes between buffers, several
//! renderables summed into one interleaved buffer.

use glade_core::{AudioRenderable, EnvelopeCurve};
use glade_synth::{NotePlayer, NoteSettings, SineOscillator, SqueakVoice};

const SR: f32 = 48000.0;
const BLOCK: usize = 256;

fn organ() -> EnvelopeCurve {
    EnvelopeCurve::from_points(&[
        (0.0, 0.0),
        (0.01, 1.0),
        (0.03, 0.7),
        (0.06, 0.7),
        (0.2, 0.0),
    ])
    .unwrap()
}

fn render_blocks(r: &mut impl AudioRenderable, blocks: usize, channels: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(blocks * BLOCK * channels);
    let mut buf = vec![0.0f32; BLOCK * channels];
    for _ in 0..blocks {
        buf.fill(0.0);
        r.render(&mut buf, channels);
        out.extend_from_slice(&buf);
    }
    out
}

// ---------------------------------------------------------------------------
// 1. Determinism
// ---------------------------------------------------------------------------

#[test]
fn identical_players_render_identical_samples() {
    let settings = NoteSettings {
        frequency: 330.0,
        gain: 0.1,
    };
    let mut a = NotePlayer::new(organ(), settings, SR);
    let mut b = NotePlayer::new(organ(), settings, SR);
    a.gate().press();
    b.gate().press();

    let out_a = render_blocks(&mut a, 40, 2);
    let out_b = render_blocks(&mut b, 40, 2);
    assert_eq!(out_a, out_b);
}

#[test]
fn block_size_does_not_change_output() {
    let mut whole = NotePlayer::new(organ(), NoteSettings::default(), SR);
    let mut split = NotePlayer::new(organ(), NoteSettings::default(), SR);
    whole.gate().press();
    split.gate().press();

    let mut big = vec![0.0f32; 1024];
    whole.render(&mut big, 1);

    let mut small = vec![0.0f32; 1024];
    for chunk in small.chunks_mut(128) {
        split.render(chunk, 1);
    }
    for (i, (x, y)) in big.iter().zip(&small).enumerate() {
        assert!((x - y).abs() < 1e-6, "frame {i}: {x} vs {y}");
    }
}

// ---------------------------------------------------------------------------
// 2. Note lifecycle
// ---------------------------------------------------------------------------

#[test]
fn held_note_keeps_sounding() {
    let mut player = NotePlayer::new(organ(), NoteSettings::default(), SR);
    player.gate().press();
    let out = render_blocks(&mut player, 400, 1);
    assert!(player.is_sounding());

    // The last block sits on the sustain plateau: peak ≈ gain · sustain.
    let tail = &out[out.len() - BLOCK..];
    let peak = tail.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!((peak - 0.05 * 0.7).abs() < 0.005, "peak {peak}");
}

#[test]
fn released_note_decays_to_silence() {
    let mut player = NotePlayer::new(organ(), NoteSettings::default(), SR);
    let gate = player.gate();
    gate.press();
    render_blocks(&mut player, 20, 1);
    gate.release();
    render_blocks(&mut player, 60, 1);

    assert!(!player.is_sounding());
    let after = render_blocks(&mut player, 1, 1);
    assert!(after.iter().all(|&s| s == 0.0));
}

#[test]
fn repress_while_held_keeps_single_head() {
    let mut player = NotePlayer::new(organ(), NoteSettings::default(), SR);
    let gate = player.gate();
    gate.press();
    render_blocks(&mut player, 2, 1);
    gate.press();
    render_blocks(&mut player, 2, 1);
    assert_eq!(player.envelope().play_heads().len(), 1);
}

// ---------------------------------------------------------------------------
// 3. Summing renderables
// ---------------------------------------------------------------------------

#[test]
fn note_and_squeak_sum_into_one_buffer() {
    let mut note = NotePlayer::new(organ(), NoteSettings::default(), SR);
    let mut squeak = SqueakVoice::new(1000.0, 0.05, SR);
    note.gate().press();
    squeak.control().begin(0.0);

    let mut both = vec![0.0f32; BLOCK * 2];
    note.render(&mut both, 2);
    squeak.render(&mut both, 2);

    let mut note_only = NotePlayer::new(organ(), NoteSettings::default(), SR);
    note_only.gate().press();
    let mut squeak_only = SqueakVoice::new(1000.0, 0.05, SR);
    squeak_only.control().begin(0.0);
    let mut a = vec![0.0f32; BLOCK * 2];
    let mut b = vec![0.0f32; BLOCK * 2];
    note_only.render(&mut a, 2);
    squeak_only.render(&mut b, 2);

    for i in 0..both.len() {
        assert!((both[i] - (a[i] + b[i])).abs() < 1e-6);
    }
}

#[test]
fn oscillator_matches_closed_form() {
    let mut osc = SineOscillator::new(440.0, SR);
    let inc = core::f32::consts::TAU * 440.0 / SR;
    for n in 1..=200 {
        let expected = libm::sinf(inc * n as f32);
        let got = osc.advance();
        assert!((got - expected).abs() < 1e-3, "n={n}: {got} vs {expected}");
    }
}
