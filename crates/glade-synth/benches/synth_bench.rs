//! Criterion benchmarks for the glade-synth render path
//!
//! Run with: cargo bench -p glade-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glade_core::{AudioRenderable, EnvelopeCurve};
use glade_synth::{NotePlayer, NoteSettings, SineOscillator, SqueakVoice};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn curve() -> EnvelopeCurve {
    EnvelopeCurve::from_points(&[
        (0.0, 0.0),
        (0.01, 1.0),
        (0.05, 0.5),
        (0.1, 0.5),
        (0.3, 0.0),
    ])
    .unwrap()
}

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("SineOscillator");
    for &block_size in BLOCK_SIZES {
        let mut osc = SineOscillator::new(440.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..n {
                    sum += osc.advance();
                }
                black_box(sum)
            })
        });
    }
    group.finish();
}

fn bench_note_player(c: &mut Criterion) {
    let mut group = c.benchmark_group("NotePlayer");
    for &block_size in BLOCK_SIZES {
        let mut player = NotePlayer::new(curve(), NoteSettings::default(), SAMPLE_RATE);
        player.gate().press();
        let mut buffer = vec![0.0f32; block_size * 2];
        group.bench_with_input(BenchmarkId::new("held", block_size), &block_size, |b, _| {
            b.iter(|| {
                player.render(black_box(&mut buffer), 2);
            })
        });
    }
    group.finish();
}

fn bench_squeak(c: &mut Criterion) {
    let mut group = c.benchmark_group("SqueakVoice");
    for &block_size in BLOCK_SIZES {
        let mut voice = SqueakVoice::new(1000.0, 0.05, SAMPLE_RATE);
        voice.control().begin(0.0);
        let mut buffer = vec![0.0f32; block_size * 2];
        group.bench_with_input(BenchmarkId::new("steady", block_size), &block_size, |b, _| {
            b.iter(|| {
                voice.render(black_box(&mut buffer), 2);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_oscillator, bench_note_player, bench_squeak);
criterion_main!(benches);
