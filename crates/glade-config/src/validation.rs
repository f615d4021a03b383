//! Startup validation of a parsed [`SoundscapeConfig`].
//!
//! Every check runs; problems are collected and reported together so a
//! broken config can be fixed in one pass.

use std::collections::HashSet;

use glade_core::EnvelopeCurve;
use thiserror::Error;

use crate::soundscape::{ClipRef, DEFAULT_FOOTSTEP_ZONE, PlayerEffect, SoundscapeConfig};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A list that needs at least one entry is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Config path of the list.
        field: String,
    },

    /// Two entries share a name.
    #[error("{field}: duplicate name '{name}'")]
    Duplicate {
        /// Config path of the list.
        field: String,
        /// The repeated name.
        name: String,
    },

    /// A clip name that is not in `[[clips]]`.
    #[error("{field}: unknown clip '{clip}'")]
    UnknownClip {
        /// Config path of the reference.
        field: String,
        /// The missing clip name.
        clip: String,
    },

    /// A snapshot name that is not in `[[snapshots]]`.
    #[error("{field}: unknown snapshot '{snapshot}'")]
    UnknownSnapshot {
        /// Config path of the reference.
        field: String,
        /// The missing snapshot name.
        snapshot: String,
    },

    /// A required entry is absent.
    #[error("{field}: missing required entry '{name}'")]
    MissingEntry {
        /// Config path of the list.
        field: String,
        /// Name of the entry that must be present.
        name: String,
    },

    /// A number outside its allowed range.
    #[error("{field}: value {value} {reason}")]
    OutOfRange {
        /// Config path of the value.
        field: String,
        /// The offending value.
        value: f32,
        /// What the value must satisfy.
        reason: String,
    },

    /// Anything else that makes an entry unusable.
    #[error("{field}: {reason}")]
    Invalid {
        /// Config path of the entry.
        field: String,
        /// What is wrong.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a whole soundscape.
///
/// Returns the single problem found, or [`ValidationError::Multiple`] when
/// there are several.
pub fn validate(config: &SoundscapeConfig) -> ValidationResult<()> {
    let mut v = Validator::new(config);
    v.check_clips();
    v.check_music();
    v.check_ambient();
    v.check_snapshots();
    v.check_effect_zone();
    v.check_player_effects();
    v.check_one_shot_sections();
    v.check_synths();
    v.check_footsteps();
    v.check_click_targets();
    v.finish()
}

struct Validator<'a> {
    config: &'a SoundscapeConfig,
    clip_names: HashSet<&'a str>,
    errors: Vec<ValidationError>,
}

impl<'a> Validator<'a> {
    fn new(config: &'a SoundscapeConfig) -> Self {
        Self {
            config,
            clip_names: config.clips.iter().map(|c| c.name.as_str()).collect(),
            errors: Vec::new(),
        }
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }

    fn push(&mut self, e: ValidationError) {
        self.errors.push(e);
    }

    fn require_clip(&mut self, field: impl Into<String>, clip: &str) {
        if !self.clip_names.contains(clip) {
            self.push(ValidationError::UnknownClip {
                field: field.into(),
                clip: clip.to_string(),
            });
        }
    }

    fn require_clips(&mut self, field: &str, clips: &[String]) {
        if clips.is_empty() {
            self.push(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        for clip in clips {
            self.require_clip(field, clip);
        }
    }

    fn require_snapshot(&mut self, field: impl Into<String>, name: &str) {
        if self.config.snapshot(name).is_none() {
            self.push(ValidationError::UnknownSnapshot {
                field: field.into(),
                snapshot: name.to_string(),
            });
        }
    }

    fn require(&mut self, ok: bool, field: impl Into<String>, value: f32, reason: &str) {
        if !ok || value.is_nan() {
            self.push(ValidationError::OutOfRange {
                field: field.into(),
                value,
                reason: reason.to_string(),
            });
        }
    }

    fn positive(&mut self, field: impl Into<String>, value: f32) {
        self.require(value > 0.0 && value.is_finite(), field, value, "must be > 0");
    }

    fn non_negative(&mut self, field: impl Into<String>, value: f32) {
        self.require(value >= 0.0 && value.is_finite(), field, value, "must be >= 0");
    }

    fn unique<'n>(&mut self, field: &str, names: impl IntoIterator<Item = &'n str>) {
        let mut seen = HashSet::new();
        for name in names {
            if name.is_empty() {
                self.push(ValidationError::Invalid {
                    field: field.to_string(),
                    reason: "name must not be empty".to_string(),
                });
            } else if !seen.insert(name) {
                self.push(ValidationError::Duplicate {
                    field: field.to_string(),
                    name: name.to_string(),
                });
            }
        }
    }

    fn clip_ref(&mut self, field: &str, r: &ClipRef) {
        self.require_clip(format!("{field}.clip"), &r.clip);
        self.non_negative(format!("{field}.volume"), r.volume);
    }

    fn check_clips(&mut self) {
        let config = self.config;
        if config.sample_rate == 0 {
            self.push(ValidationError::OutOfRange {
                field: "sample_rate".into(),
                value: 0.0,
                reason: "must be > 0".into(),
            });
        }
        self.unique("clips", config.clips.iter().map(|c| c.name.as_str()));
        for clip in &config.clips {
            let field = format!("clips.{}", clip.name);
            match (&clip.path, &clip.tone) {
                (Some(_), None) => {}
                (None, Some(tone)) => {
                    self.positive(format!("{field}.tone.frequency"), tone.frequency);
                    self.positive(format!("{field}.tone.length_secs"), tone.length_secs);
                    self.non_negative(format!("{field}.tone.amplitude"), tone.amplitude);
                }
                _ => self.push(ValidationError::Invalid {
                    field,
                    reason: "exactly one of `path` or `tone` is required".into(),
                }),
            }
        }
    }

    fn check_music(&mut self) {
        let config = self.config;
        let music = &config.music;
        if music.zones.is_empty() {
            self.push(ValidationError::Empty {
                field: "music.zones".into(),
            });
        }
        self.positive("music.speed", music.speed);
        self.unique("music.zones", music.zones.iter().map(|z| z.name.as_str()));

        let mut clips = HashSet::new();
        for zone in &music.zones {
            let field = format!("music.zones.{}", zone.name);
            self.require_clip(format!("{field}.clip"), &zone.clip);
            self.non_negative(format!("{field}.volume"), zone.volume);
            if !clips.insert(zone.clip.as_str()) {
                self.push(ValidationError::Invalid {
                    field,
                    reason: format!("clip '{}' is already used by another zone", zone.clip),
                });
            }
        }
    }

    fn check_ambient(&mut self) {
        let config = self.config;
        let Some(ambient) = &config.ambient else {
            return;
        };
        self.positive("ambient.speed", ambient.speed);
        self.clip_ref("ambient.day", &ambient.day);
        self.clip_ref("ambient.night", &ambient.night);
        if ambient.day.clip == ambient.night.clip {
            self.push(ValidationError::Invalid {
                field: "ambient".into(),
                reason: "day and night must use different clips".into(),
            });
        }
    }

    fn check_snapshots(&mut self) {
        let config = self.config;
        self.unique("snapshots", config.snapshots.iter().map(|s| s.name.as_str()));
        for s in &config.snapshots {
            let field = format!("snapshots.{}", s.name);
            self.non_negative(format!("{field}.music"), s.music);
            self.non_negative(format!("{field}.ambient"), s.ambient);
            self.non_negative(format!("{field}.effects"), s.effects);
            self.non_negative(format!("{field}.synth"), s.synth);
        }
    }

    fn check_effect_zone(&mut self) {
        let config = self.config;
        let Some(zone) = &config.effect_zone else {
            return;
        };
        self.require_snapshot("effect_zone.no_effect_snapshot", &zone.no_effect_snapshot);
        self.require_snapshot("effect_zone.effect_snapshot", &zone.effect_snapshot);
        self.non_negative("effect_zone.transition_secs", zone.transition_secs);
        if zone.area.is_empty() {
            self.push(ValidationError::Invalid {
                field: "effect_zone.area".into(),
                reason: "name must not be empty".into(),
            });
        }
    }

    fn check_player_effects(&mut self) {
        let config = self.config;
        let effects = &config.player_effects;
        if !effects.is_empty() && !effects.iter().any(|e| e.effect == PlayerEffect::None) {
            self.push(ValidationError::MissingEntry {
                field: "player_effects".into(),
                name: PlayerEffect::None.to_string(),
            });
        }
        let mut seen = HashSet::new();
        for e in effects {
            let field = format!("player_effects.{}", e.effect);
            if !seen.insert(e.effect) {
                self.push(ValidationError::Duplicate {
                    field: "player_effects".into(),
                    name: e.effect.to_string(),
                });
            }
            self.require_snapshot(format!("{field}.snapshot"), &e.snapshot);
            self.require_clips(&format!("{field}.sounds"), &e.sounds);
            self.non_negative(format!("{field}.transition_secs"), e.transition_secs);
            for (i, c) in e.color.iter().enumerate() {
                self.require(
                    (0.0..=1.0).contains(c),
                    format!("{field}.color[{i}]"),
                    *c,
                    "must be within [0, 1]",
                );
            }
        }
        for t in &config.effect_triggers {
            if !seen.contains(&t.effect) {
                self.push(ValidationError::MissingEntry {
                    field: format!("effect_triggers.{}", t.target),
                    name: t.effect.to_string(),
                });
            }
        }
    }

    fn check_one_shot_sections(&mut self) {
        let config = self.config;
        if let Some(dn) = &config.day_night {
            self.positive("day_night.transition_speed", dn.transition_speed);
        }
        if let Some(knob) = &config.knob {
            self.require_clips("knob.sounds", &knob.sounds);
            self.non_negative("knob.material_speed", knob.material_speed);
            self.non_negative("knob.volume", knob.volume);
        }
        if let Some(oven) = &config.oven {
            self.require_clip("oven.fade_in", &oven.fade_in);
            self.require_clip("oven.main", &oven.main);
            self.require_clip("oven.fade_out", &oven.fade_out);
            self.non_negative("oven.volume", oven.volume);
        }
        for (i, p) in config.interval_players.iter().enumerate() {
            let field = format!("interval_players[{i}]");
            self.require_clip(format!("{field}.clip"), &p.clip);
            self.non_negative(format!("{field}.min_secs"), p.min_secs);
            self.require(
                p.max_secs >= p.min_secs,
                format!("{field}.max_secs"),
                p.max_secs,
                "must be >= min_secs",
            );
            self.non_negative(format!("{field}.volume"), p.volume);
        }
        for (i, e) in config.emitters.iter().enumerate() {
            let field = format!("emitters[{i}]");
            self.require_clip(format!("{field}.clip"), &e.clip);
            self.non_negative(format!("{field}.volume"), e.volume);
        }
        for c in &config.clickables {
            let field = format!("clickables.{}", c.target);
            self.require_clips(&format!("{field}.clips"), &c.clips);
            self.non_negative(format!("{field}.volume"), c.volume);
        }
    }

    fn check_synths(&mut self) {
        let config = self.config;
        if let Some(sq) = &config.squeak {
            self.positive("squeak.pitch", sq.pitch);
            self.non_negative("squeak.max_volume", sq.max_volume);
        }
        if let Some(note) = &config.note {
            self.positive("note.frequency", note.frequency);
            self.non_negative("note.gain", note.gain);
            self.non_negative("note.release_after_secs", note.release_after_secs);
            let points: Vec<(f32, f32)> = note.envelope.iter().map(|p| (p[0], p[1])).collect();
            if let Err(e) = EnvelopeCurve::from_points(&points) {
                self.push(ValidationError::Invalid {
                    field: "note.envelope".into(),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn check_footsteps(&mut self) {
        let config = self.config;
        let Some(steps) = &config.footsteps else {
            return;
        };
        self.positive("footsteps.interval_secs", steps.interval_secs);
        if !steps.zones.iter().any(|z| z.name == DEFAULT_FOOTSTEP_ZONE) {
            self.push(ValidationError::MissingEntry {
                field: "footsteps.zones".into(),
                name: DEFAULT_FOOTSTEP_ZONE.into(),
            });
        }
        for z in &steps.zones {
            let field = format!("footsteps.zones.{}", z.name);
            self.require_clips(&format!("{field}.clips"), &z.clips);
            self.positive(format!("{field}.pitch[0]"), z.pitch[0]);
            self.require(
                z.pitch[1] >= z.pitch[0],
                format!("{field}.pitch[1]"),
                z.pitch[1],
                "must be >= pitch[0]",
            );
            self.non_negative(format!("{field}.volume[0]"), z.volume[0]);
            self.require(
                z.volume[1] >= z.volume[0],
                format!("{field}.volume[1]"),
                z.volume[1],
                "must be >= volume[0]",
            );
        }
        for (surface, zone) in &steps.surfaces {
            if !steps.zones.iter().any(|z| &z.name == zone) {
                self.push(ValidationError::MissingEntry {
                    field: format!("footsteps.surfaces.{surface}"),
                    name: zone.clone(),
                });
            }
        }
    }

    fn check_click_targets(&mut self) {
        let config = self.config;
        let targets = config.click_targets();
        self.unique("click targets", targets);
    }
}
