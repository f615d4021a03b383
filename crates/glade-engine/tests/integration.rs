//! Integration tests for glade-engine
//!
//! Drives a complete tone-only soundscape through the public API the way a
//! game loop would: input, tick, render.

use std::sync::{Arc, Mutex};

use glade_config::{PlayerEffect, SoundscapeConfig};
use glade_core::AudioRenderable;
use glade_engine::managers::OvenState;
use glade_engine::{
    ClipBank, ClipMixer, EngineError, KnobPosition, Soundscape, SoundscapeEvent, TimeOfDay,
    TonesOnly,
};
use proptest::prelude::*;

const SAMPLE_RATE: u32 = 8000;
const TICK: f32 = 0.05;

const WORLD: &str = r#"
sample_rate = 8000

[[clips]]
name = "meadow"
tone = { frequency = 220.0, length_secs = 2.0 }

[[clips]]
name = "cave"
tone = { frequency = 110.0, length_secs = 2.0 }

[[clips]]
name = "birds"
tone = { frequency = 880.0, length_secs = 1.0, amplitude = 0.1 }

[[clips]]
name = "crickets"
tone = { frequency = 1760.0, length_secs = 1.0, amplitude = 0.1 }

[[clips]]
name = "click"
tone = { frequency = 2000.0, length_secs = 0.1 }

[[clips]]
name = "step"
tone = { frequency = 90.0, length_secs = 0.1 }

[[clips]]
name = "hum"
tone = { frequency = 60.0, length_secs = 1.0 }

[music]
speed = 2.0
zones = [
    { name = "Meadow", clip = "meadow" },
    { name = "Cave", clip = "cave", volume = 0.7 },
]

[ambient]
speed = 2.0
day = { clip = "birds" }
night = { clip = "crickets", volume = 0.8 }

[[snapshots]]
name = "No Effects"

[[snapshots]]
name = "Underwater"
music = 0.4
effects = 0.2

[[snapshots]]
name = "Hazy"
music = 0.6

[effect_zone]
area = "Pond"
effect_snapshot = "Underwater"

[[player_effects]]
effect = "none"
snapshot = "No Effects"
sounds = ["click"]

[[player_effects]]
effect = "poisoned"
color = [0.2, 0.8, 0.2, 0.4]
snapshot = "Hazy"
sounds = ["click"]

[[effect_triggers]]
target = "potion"
effect = "poisoned"

[[effect_triggers]]
target = "water"
effect = "none"

[day_night]
target = "lamp"
transition_speed = 2.0

[knob]
target = "knob"
sounds = ["click"]

[oven]
fade_in = "click"
main = "hum"
fade_out = "click"

[squeak]

[note]
target = "bell"
envelope = [[0.0, 0.0], [0.01, 1.0], [0.05, 0.5], [0.1, 0.5], [0.3, 0.0]]

[footsteps]
interval_secs = 0.2
surfaces = { grass = "Grass" }
zones = [
    { clips = ["step"] },
    { name = "Grass", clips = ["step"], pitch = [0.8, 1.0] },
]

[[interval_players]]
clip = "birds"
min_secs = 1.0
max_secs = 2.0

[[emitters]]
area = "Pond"
clip = "hum"

[[clickables]]
target = "bucket"
clips = ["click"]
"#;

fn world(seed: u64) -> (Soundscape, ClipMixer) {
    let config = SoundscapeConfig::from_toml(WORLD).unwrap();
    let clips = ClipBank::from_config(&config, &mut TonesOnly).unwrap();
    Soundscape::build(&config, clips, SAMPLE_RATE as f32, seed).unwrap()
}

/// Tick once and render the matching stretch of audio.
fn run(s: &mut Soundscape, mixer: &mut ClipMixer, ticks: usize) -> Vec<f32> {
    let frames = (TICK * SAMPLE_RATE as f32) as usize;
    let mut out = Vec::with_capacity(frames * ticks);
    let mut buf = vec![0.0f32; frames];
    for _ in 0..ticks {
        s.tick(TICK).unwrap();
        buf.fill(0.0);
        mixer.render(&mut buf, 1);
        out.extend_from_slice(&buf);
    }
    out
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len().max(1) as f32).sqrt()
}

// ============================================================================
// Music and ambience
// ============================================================================

#[test]
fn starts_with_first_zone_audible() {
    let (mut s, mut mixer) = world(1);
    let audio = run(&mut s, &mut mixer, 4);
    assert!(rms(&audio) > 0.01);
    assert_eq!(s.music().current_zone().name, "Meadow");
}

#[test]
fn zone_change_completes_and_resumes_later() {
    let (mut s, mut mixer) = world(1);
    run(&mut s, &mut mixer, 10);
    s.enter_area("Cave").unwrap();
    run(&mut s, &mut mixer, 12);
    assert_eq!(s.music().current_zone().name, "Cave");
    let meadow = &s.music().zones()[0];
    assert!(meadow.resume_at > 0.5, "saved {}", meadow.resume_at);

    s.enter_area("Meadow").unwrap();
    run(&mut s, &mut mixer, 12);
    assert_eq!(s.music().current_zone().name, "Meadow");
    assert!(s.music().zones()[1].resume_at > 0.0);
}

#[test]
fn lamp_switches_night_ambience() {
    let (mut s, mut mixer) = world(1);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    s.subscribe(move |e: &SoundscapeEvent| sink.lock().unwrap().push(*e));

    s.click("lamp").unwrap();
    run(&mut s, &mut mixer, 30);

    assert_eq!(s.day_night().unwrap().time(), TimeOfDay::Night);
    assert_eq!(s.day_night().unwrap().opacity(), 0.0);
    assert_eq!(s.ambient().unwrap().current(), TimeOfDay::Night);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![SoundscapeEvent::TimeChanged(TimeOfDay::Night)]
    );
}

// ============================================================================
// Effects and snapshots
// ============================================================================

#[test]
fn pond_ducks_music_then_recovers() {
    let (mut s, mut mixer) = world(1);
    s.enter_area("Pond").unwrap();
    run(&mut s, &mut mixer, 10);
    assert_eq!(mixer.buses().music, 0.4);
    assert_eq!(mixer.buses().effects, 0.2);

    s.exit_area("Pond").unwrap();
    run(&mut s, &mut mixer, 10);
    assert_eq!(mixer.buses().music, 1.0);
}

#[test]
fn potion_then_water_round_trip() {
    let (mut s, mut mixer) = world(1);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    s.subscribe(move |e: &SoundscapeEvent| sink.lock().unwrap().push(*e));

    s.click("potion").unwrap();
    run(&mut s, &mut mixer, 12);
    let effects = s.player_effects().unwrap();
    assert_eq!(effects.current(), PlayerEffect::Poisoned);
    assert_eq!(effects.color(), [0.2, 0.8, 0.2, 0.4]);
    assert_eq!(mixer.buses().music, 0.6);
    assert!(mixer.squeak().unwrap().volume() > 0.0);

    s.click("water").unwrap();
    run(&mut s, &mut mixer, 12);
    assert_eq!(s.player_effects().unwrap().current(), PlayerEffect::None);
    assert_eq!(mixer.squeak().unwrap().volume(), 0.0);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn drunk_is_not_configured() {
    let (mut s, _) = world(1);
    assert!(matches!(
        s.request_effect(PlayerEffect::Drunk),
        Err(EngineError::UnknownEffect(PlayerEffect::Drunk))
    ));
}

// ============================================================================
// Interactables
// ============================================================================

#[test]
fn knob_cycles_oven() {
    let (mut s, mut mixer) = world(1);
    s.click("knob").unwrap();
    assert_eq!(s.knob().unwrap().position(), KnobPosition::On);
    run(&mut s, &mut mixer, 6);
    assert_eq!(s.oven().unwrap().state(), OvenState::MainClip);

    s.click("knob").unwrap();
    assert_eq!(s.knob().unwrap().position(), KnobPosition::Off);
    run(&mut s, &mut mixer, 6);
    assert_eq!(s.oven().unwrap().state(), OvenState::Stopped);
}

#[test]
fn bell_sounds_then_releases() {
    let (mut s, mut mixer) = world(1);
    s.click("bell").unwrap();
    assert!(s.note().unwrap().is_held());
    run(&mut s, &mut mixer, 1);
    assert!(mixer.note().unwrap().is_sounding());
    assert!(!s.note().unwrap().is_held());
    run(&mut s, &mut mixer, 10);
    assert!(!mixer.note().unwrap().is_sounding());
}

#[test]
fn bucket_and_unknown_targets() {
    let (mut s, mut mixer) = world(1);
    s.click("bucket").unwrap();
    s.click("teapot").unwrap();
    let mut buf = vec![0.0f32; 16];
    mixer.render(&mut buf, 1);
    assert_eq!(mixer.active_one_shots(), 1);
}

#[test]
fn footsteps_follow_movement() {
    let (mut s, mut mixer) = world(1);
    s.set_surface(Some("grass"));
    s.set_moving(true);
    run(&mut s, &mut mixer, 1);
    assert_eq!(s.footsteps().unwrap().zone(), "Grass");
    assert!(mixer.active_one_shots() >= 1);

    s.set_moving(false);
    run(&mut s, &mut mixer, 1);
    s.set_surface(None);
    assert_eq!(s.footsteps().unwrap().zone(), "Grass");
}

// ============================================================================
// Determinism and robustness
// ============================================================================

#[test]
fn same_seed_renders_same_audio() {
    let script = |s: &mut Soundscape, mixer: &mut ClipMixer| {
        s.set_moving(true);
        s.click("bucket").unwrap();
        let mut audio = run(s, mixer, 10);
        s.enter_area("Cave").unwrap();
        audio.extend(run(s, mixer, 10));
        audio
    };
    let (mut a, mut ma) = world(42);
    let (mut b, mut mb) = world(42);
    assert_eq!(script(&mut a, &mut ma), script(&mut b, &mut mb));
}

#[derive(Debug, Clone)]
enum Input {
    Enter(&'static str),
    Exit(&'static str),
    Click(&'static str),
    Effect(PlayerEffect),
    Moving(bool),
    Tick(u8),
}

fn input_strategy() -> impl Strategy<Value = Input> {
    let areas = prop::sample::select(vec!["Meadow", "Cave", "Pond"]);
    let targets = prop::sample::select(vec!["lamp", "knob", "bell", "potion", "water", "bucket"]);
    prop_oneof![
        areas.clone().prop_map(Input::Enter),
        areas.prop_map(Input::Exit),
        targets.prop_map(Input::Click),
        prop::sample::select(vec![PlayerEffect::None, PlayerEffect::Poisoned])
            .prop_map(Input::Effect),
        any::<bool>().prop_map(Input::Moving),
        (1u8..8).prop_map(Input::Tick),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Any input sequence keeps the engine consistent and the output finite.
    #[test]
    fn random_sessions_stay_finite(inputs in prop::collection::vec(input_strategy(), 1..40)) {
        let (mut s, mut mixer) = world(7);
        for input in inputs {
            match input {
                Input::Enter(area) => s.enter_area(area).unwrap(),
                Input::Exit(area) => s.exit_area(area).unwrap(),
                Input::Click(target) => s.click(target).unwrap(),
                Input::Effect(effect) => {
                    s.request_effect(effect).unwrap();
                }
                Input::Moving(moving) => s.set_moving(moving),
                Input::Tick(n) => {
                    let audio = run(&mut s, &mut mixer, usize::from(n));
                    prop_assert!(audio.iter().all(|x| x.is_finite()));
                }
            }
            let buses = s.blender().current();
            prop_assert!((0.0..=1.0).contains(&buses.music));
            prop_assert!((0.0..=1.0).contains(&buses.effects));
            let opacity = s.day_night().unwrap().opacity();
            prop_assert!((0.0..=1.0).contains(&opacity));
        }
    }
}
