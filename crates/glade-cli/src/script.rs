//! Timed input scripts.
//!
//! One action per line, prefixed with the time in seconds it fires at:
//!
//! ```text
//! # walk into the cave and light the lamp
//! 0.0  moving on
//! 0.5  surface Gravel
//! 2.0  enter-zone Cave
//! 3.5  click Lamp
//! 4.0  effect poisoned
//! 6.0  exit-zone Pond
//! ```
//!
//! Blank lines and `#` comments are ignored. Everything after the action
//! keyword is its argument, so names may contain spaces.

use std::path::Path;
use std::str::FromStr;

use glade_config::PlayerEffect;
use glade_engine::Soundscape;

/// Script parse failure, with the 1-based line it occurred on.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("failed to read script {path}: {source}")]
    Read {
        /// Script path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },
}

/// A single scripted input.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Player walks into an area.
    EnterZone(String),
    /// Player leaves an area.
    ExitZone(String),
    /// Player clicks a target.
    Click(String),
    /// Request a player effect.
    Effect(PlayerEffect),
    /// Start or stop walking.
    Moving(bool),
    /// Surface under the player; `None` for nothing hit.
    Surface(Option<String>),
}

/// An action and the time it fires at.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Seconds from the start of the session.
    pub at: f64,
    /// What happens.
    pub action: Action,
}

/// Cues ordered by time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    cues: Vec<Cue>,
    next: usize,
}

impl Script {
    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        text.parse()
    }

    /// All cues in firing order.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Time of the last cue, or 0.
    pub fn end(&self) -> f64 {
        self.cues.last().map_or(0.0, |c| c.at)
    }

    /// Apply every cue due at `now` that has not fired yet.
    ///
    /// Engine errors are logged and skipped so one bad cue does not end the
    /// session.
    pub fn apply_due(&mut self, now: f64, soundscape: &mut Soundscape) {
        while let Some(cue) = self.cues.get(self.next) {
            if cue.at > now {
                break;
            }
            tracing::debug!(at = cue.at, action = ?cue.action, "cue");
            if let Err(err) = apply(&cue.action, soundscape) {
                tracing::warn!(at = cue.at, %err, "cue failed");
            }
            self.next += 1;
        }
    }
}

fn apply(action: &Action, soundscape: &mut Soundscape) -> glade_engine::Result<()> {
    match action {
        Action::EnterZone(name) => soundscape.enter_area(name),
        Action::ExitZone(name) => soundscape.exit_area(name),
        Action::Click(target) => soundscape.click(target),
        Action::Effect(effect) => soundscape.request_effect(*effect).map(|_| ()),
        Action::Moving(moving) => {
            soundscape.set_moving(*moving);
            Ok(())
        }
        Action::Surface(surface) => {
            soundscape.set_surface(surface.as_deref());
            Ok(())
        }
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cues = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let cue = parse_cue(line).map_err(|message| ScriptError::Parse {
                line: index + 1,
                message,
            })?;
            cues.push(cue);
        }
        // Stable, so same-time cues keep their file order.
        cues.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(Self { cues, next: 0 })
    }
}

fn parse_cue(line: &str) -> Result<Cue, String> {
    let (time, rest) = split_word(line);
    let at: f64 = time
        .parse()
        .map_err(|_| format!("invalid time '{time}'"))?;
    if !at.is_finite() || at < 0.0 {
        return Err(format!("time must be a non-negative number, got {time}"));
    }

    let (keyword, arg) = split_word(rest);
    let need_arg = || {
        if arg.is_empty() {
            Err(format!("'{keyword}' needs an argument"))
        } else {
            Ok(arg.to_string())
        }
    };

    let action = match keyword {
        "enter-zone" => Action::EnterZone(need_arg()?),
        "exit-zone" => Action::ExitZone(need_arg()?),
        "click" => Action::Click(need_arg()?),
        "effect" => Action::Effect(PlayerEffect::from_str(&need_arg()?)?),
        "moving" => Action::Moving(match arg {
            "on" | "true" | "yes" => true,
            "off" | "false" | "no" => false,
            other => return Err(format!("expected on/off after 'moving', got '{other}'")),
        }),
        "surface" => Action::Surface(match arg {
            "" | "none" => None,
            name => Some(name.to_string()),
        }),
        "" => return Err("missing action".to_string()),
        other => return Err(format!("unknown action '{other}'")),
    };
    Ok(Cue { at, action })
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}
