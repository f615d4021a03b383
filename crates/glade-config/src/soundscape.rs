//! Soundscape file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::validation::validate;

/// Name of the footstep zone used until a known surface is hit.
pub const DEFAULT_FOOTSTEP_ZONE: &str = "Default";

/// Everything the engine needs to build a soundscape.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
///
/// [[clips]]
/// name = "meadow"
/// path = "audio/meadow.wav"
///
/// [[clips]]
/// name = "cave"
/// tone = { frequency = 110.0, length_secs = 8.0 }
///
/// [music]
/// speed = 0.5
/// zones = [
///     { name = "Meadow", clip = "meadow" },
///     { name = "Cave", clip = "cave", volume = 0.7 },
/// ]
/// ```
///
/// The first music zone is the one playing at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SoundscapeConfig {
    /// Output sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Clip table; every other section refers to clips by name.
    #[serde(default)]
    pub clips: Vec<ClipConfig>,

    /// Crossfaded music zones.
    pub music: MusicConfig,

    /// Day and night ambience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient: Option<AmbientConfig>,

    /// Named bus-gain sets.
    #[serde(default)]
    pub snapshots: Vec<SnapshotConfig>,

    /// Area that blends to an effect snapshot while occupied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_zone: Option<EffectZoneConfig>,

    /// Player status effects. Must contain `none` when non-empty.
    #[serde(default)]
    pub player_effects: Vec<PlayerEffectConfig>,

    /// Click targets that request a player effect.
    #[serde(default)]
    pub effect_triggers: Vec<EffectTriggerConfig>,

    /// Click-triggered day/night blackout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_night: Option<DayNightConfig>,

    /// Oven knob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knob: Option<KnobConfig>,

    /// Oven sound driven by the knob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oven: Option<OvenConfig>,

    /// Synthesized squeak heard while poisoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squeak: Option<SqueakConfig>,

    /// Clickable synthesized note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteConfig>,

    /// Footstep sounds per surface zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footsteps: Option<FootstepsConfig>,

    /// Clips replayed after random pauses.
    #[serde(default)]
    pub interval_players: Vec<IntervalPlayerConfig>,

    /// Looping clips audible only inside an area.
    #[serde(default)]
    pub emitters: Vec<EmitterConfig>,

    /// Click targets that play a random clip.
    #[serde(default)]
    pub clickables: Vec<ClickableConfig>,

    /// Directory that relative clip paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_volume() -> f32 {
    1.0
}

/// Where a clip's samples come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClipConfig {
    /// Name other sections refer to.
    pub name: String,
    /// WAV file, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Procedural sine tone, for files-free setups and tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<ToneConfig>,
}

/// A generated sine clip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ToneConfig {
    /// Frequency in Hz.
    pub frequency: f32,
    /// Length in seconds.
    pub length_secs: f32,
    /// Peak amplitude.
    #[serde(default = "default_tone_amplitude")]
    pub amplitude: f32,
}

fn default_tone_amplitude() -> f32 {
    0.25
}

/// A clip reference with a volume multiplier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClipRef {
    /// Clip name.
    pub clip: String,
    /// Volume once fully faded in.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// Music zones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MusicConfig {
    /// Crossfade progress per second.
    #[serde(default = "default_music_speed")]
    pub speed: f32,
    /// Zones in priority order; the first is the default.
    pub zones: Vec<MusicZoneConfig>,
}

fn default_music_speed() -> f32 {
    0.5
}

/// One music zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MusicZoneConfig {
    /// Area name that selects this zone.
    pub name: String,
    /// Clip to loop.
    pub clip: String,
    /// Volume multiplier.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// Day and night ambience.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AmbientConfig {
    /// Crossfade progress per second.
    #[serde(default = "default_ambient_speed")]
    pub speed: f32,
    /// Daytime loop.
    pub day: ClipRef,
    /// Nighttime loop.
    pub night: ClipRef,
}

fn default_ambient_speed() -> f32 {
    0.25
}

/// Named mixer bus gains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Snapshot name.
    pub name: String,
    /// Music bus gain.
    #[serde(default = "default_volume")]
    pub music: f32,
    /// Ambience bus gain.
    #[serde(default = "default_volume")]
    pub ambient: f32,
    /// One-shot effects bus gain.
    #[serde(default = "default_volume")]
    pub effects: f32,
    /// Synthesizer bus gain.
    #[serde(default = "default_volume")]
    pub synth: f32,
}

/// Area that swaps snapshots on enter and exit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EffectZoneConfig {
    /// Area name.
    pub area: String,
    /// Snapshot outside the area.
    #[serde(default = "default_no_effect_snapshot")]
    pub no_effect_snapshot: String,
    /// Snapshot inside the area.
    pub effect_snapshot: String,
    /// Blend duration in seconds.
    #[serde(default = "default_effect_zone_secs")]
    pub transition_secs: f32,
}

fn default_no_effect_snapshot() -> String {
    "No Effects".to_string()
}

fn default_effect_zone_secs() -> f32 {
    0.25
}

/// Player status effects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PlayerEffect {
    /// No effect.
    None,
    /// Poisoned: squeak fades in.
    Poisoned,
    /// Drunk.
    Drunk,
}

impl PlayerEffect {
    /// Lowercase name as used in config files and scripts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Poisoned => "poisoned",
            Self::Drunk => "drunk",
        }
    }
}

impl std::fmt::Display for PlayerEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayerEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "poisoned" => Ok(Self::Poisoned),
            "drunk" => Ok(Self::Drunk),
            other => Err(format!("unknown player effect '{other}'")),
        }
    }
}

/// How one player effect looks and sounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlayerEffectConfig {
    /// Which effect this configures.
    pub effect: PlayerEffect,
    /// Overlay tint as RGBA in `[0, 1]`.
    #[serde(default)]
    pub color: [f32; 4],
    /// Snapshot to blend to.
    pub snapshot: String,
    /// One of these plays when the effect begins.
    pub sounds: Vec<String>,
    /// Blend duration in seconds.
    #[serde(default = "default_player_effect_secs")]
    pub transition_secs: f32,
}

fn default_player_effect_secs() -> f32 {
    0.5
}

/// Click target that requests a player effect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EffectTriggerConfig {
    /// Click target name.
    pub target: String,
    /// Effect to request.
    pub effect: PlayerEffect,
}

/// Day/night blackout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DayNightConfig {
    /// Click target name.
    pub target: String,
    /// Transition progress per second.
    #[serde(default = "default_volume")]
    pub transition_speed: f32,
}

/// Oven knob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KnobConfig {
    /// Click target name.
    pub target: String,
    /// One of these plays per turn; its length sets the turn duration.
    pub sounds: Vec<String>,
    /// Material blend progress per second.
    #[serde(default = "default_knob_speed")]
    pub material_speed: f32,
    /// Knob one-shot volume.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_knob_speed() -> f32 {
    0.1
}

/// Fade-in / loop / fade-out clip triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OvenConfig {
    /// One-shot played when turning on.
    pub fade_in: String,
    /// Loop played while on.
    pub main: String,
    /// One-shot played when turning off.
    pub fade_out: String,
    /// Output volume.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// Squeak synthesizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SqueakConfig {
    /// Pitch in Hz.
    #[serde(default = "default_squeak_pitch")]
    pub pitch: f32,
    /// Volume when fully faded in.
    #[serde(default = "default_squeak_volume")]
    pub max_volume: f32,
}

impl Default for SqueakConfig {
    fn default() -> Self {
        Self {
            pitch: default_squeak_pitch(),
            max_volume: default_squeak_volume(),
        }
    }
}

fn default_squeak_pitch() -> f32 {
    1000.0
}

fn default_squeak_volume() -> f32 {
    0.05
}

/// Clickable synthesized note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NoteConfig {
    /// Click target name.
    pub target: String,
    /// Oscillator frequency in Hz.
    #[serde(default = "default_note_frequency")]
    pub frequency: f32,
    /// Output gain.
    #[serde(default = "default_squeak_volume")]
    pub gain: f32,
    /// Release once no click arrived for this long.
    #[serde(default = "default_release_after")]
    pub release_after_secs: f32,
    /// Five `[time, value]` breakpoints: attack-left, attack-right,
    /// decay-right, sustain-right, release-right.
    pub envelope: Vec<[f32; 2]>,
}

fn default_note_frequency() -> f32 {
    440.0
}

fn default_release_after() -> f32 {
    0.008
}

/// Footstep system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FootstepsConfig {
    /// Seconds between steps while moving.
    #[serde(default = "default_step_interval")]
    pub interval_secs: f32,
    /// Surface name → footstep zone name.
    #[serde(default)]
    pub surfaces: BTreeMap<String, String>,
    /// Sound sets; several may share a zone name.
    pub zones: Vec<FootstepZoneConfig>,
}

fn default_step_interval() -> f32 {
    0.4
}

/// One footstep sound set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FootstepZoneConfig {
    /// Zone name.
    #[serde(default = "default_footstep_zone")]
    pub name: String,
    /// Clips to pick from.
    pub clips: Vec<String>,
    /// Pitch range `[min, max]`.
    #[serde(default = "default_pitch_range")]
    pub pitch: [f32; 2],
    /// Volume range `[min, max]`.
    #[serde(default = "default_volume_range")]
    pub volume: [f32; 2],
}

fn default_footstep_zone() -> String {
    DEFAULT_FOOTSTEP_ZONE.to_string()
}

fn default_pitch_range() -> [f32; 2] {
    [0.9, 1.1]
}

fn default_volume_range() -> [f32; 2] {
    [0.8, 1.1]
}

/// Clip replayed after a random pause.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IntervalPlayerConfig {
    /// Clip to play.
    pub clip: String,
    /// Shortest pause in seconds.
    #[serde(default = "default_interval_min")]
    pub min_secs: f32,
    /// Longest pause in seconds.
    #[serde(default = "default_interval_max")]
    pub max_secs: f32,
    /// Volume.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_interval_min() -> f32 {
    20.0
}

fn default_interval_max() -> f32 {
    30.0
}

/// Looping clip muted outside its area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EmitterConfig {
    /// Area name.
    pub area: String,
    /// Clip to loop.
    pub clip: String,
    /// Volume.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// Click target playing a random clip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClickableConfig {
    /// Click target name.
    pub target: String,
    /// Clips to pick from.
    pub clips: Vec<String>,
    /// Volume.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl SoundscapeConfig {
    /// Load and validate a configuration file.
    ///
    /// Relative clip paths are resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let mut config = Self::from_toml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(toml_str)?;
        validate(&config)?;
        Ok(config)
    }

    /// Parse a TOML string without validating it.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write(path, e))?;
        Ok(())
    }

    /// Clip entry by name.
    pub fn clip(&self, name: &str) -> Option<&ClipConfig> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// Snapshot entry by name.
    pub fn snapshot(&self, name: &str) -> Option<&SnapshotConfig> {
        self.snapshots.iter().find(|s| s.name == name)
    }

    /// Path of a file-backed clip, resolved against [`base_dir`](Self::base_dir).
    pub fn resolve_clip_path(&self, clip: &ClipConfig) -> Option<PathBuf> {
        let path = clip.path.as_ref()?;
        Some(match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.clone(),
        })
    }

    /// Every click target name, in section order.
    pub fn click_targets(&self) -> Vec<&str> {
        let mut targets = Vec::new();
        if let Some(dn) = &self.day_night {
            targets.push(dn.target.as_str());
        }
        if let Some(knob) = &self.knob {
            targets.push(knob.target.as_str());
        }
        if let Some(note) = &self.note {
            targets.push(note.target.as_str());
        }
        targets.extend(self.effect_triggers.iter().map(|t| t.target.as_str()));
        targets.extend(self.clickables.iter().map(|c| c.target.as_str()));
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [[clips]]
        name = "meadow"
        tone = { frequency = 220.0, length_secs = 2.0 }

        [music]
        zones = [{ name = "Meadow", clip = "meadow" }]
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = SoundscapeConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.music.speed, 0.5);
        assert_eq!(config.music.zones[0].volume, 1.0);
        assert!(config.ambient.is_none());
        let tone = config.clips[0].tone.unwrap();
        assert_eq!(tone.amplitude, 0.25);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml = format!("{MINIMAL}\nloudness = 11\n");
        assert!(matches!(
            SoundscapeConfig::parse(&toml),
            Err(ConfigError::Syntax(_))
        ));
    }

    #[test]
    fn player_effect_names_are_lowercase() {
        let cfg: EffectTriggerConfig =
            toml::from_str("target = \"potion\"\neffect = \"poisoned\"").unwrap();
        assert_eq!(cfg.effect, PlayerEffect::Poisoned);
        assert_eq!("Drunk".parse::<PlayerEffect>(), Ok(PlayerEffect::Drunk));
        assert!("sleepy".parse::<PlayerEffect>().is_err());
    }

    #[test]
    fn footstep_zone_defaults() {
        let zone: FootstepZoneConfig = toml::from_str("clips = [\"step\"]").unwrap();
        assert_eq!(zone.name, DEFAULT_FOOTSTEP_ZONE);
        assert_eq!(zone.pitch, [0.9, 1.1]);
        assert_eq!(zone.volume, [0.8, 1.1]);
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let mut config = SoundscapeConfig::parse(MINIMAL).unwrap();
        config.base_dir = Some(PathBuf::from("/worlds/forest"));
        let clip = ClipConfig {
            name: "x".into(),
            path: Some(PathBuf::from("audio/x.wav")),
            tone: None,
        };
        assert_eq!(
            config.resolve_clip_path(&clip),
            Some(PathBuf::from("/worlds/forest/audio/x.wav"))
        );
    }

    #[test]
    fn toml_round_trip_preserves_config() {
        let config = SoundscapeConfig::from_toml(MINIMAL).unwrap();
        let text = config.to_toml().unwrap();
        assert_eq!(SoundscapeConfig::parse(&text).unwrap(), config);
    }
}
