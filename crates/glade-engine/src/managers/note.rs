//! Click-held synth note.

use std::sync::Arc;

use glade_synth::NoteGate;

use crate::error::Result;
use crate::tick::{TickContext, Tickable};

/// Presses the note on click and releases it once clicks stop arriving.
#[derive(Debug, Clone)]
pub struct NoteTrigger {
    target: String,
    gate: Arc<NoteGate>,
    release_after: f32,
    release_at: Option<f64>,
}

impl NoteTrigger {
    /// Drive the note behind `gate`.
    pub fn new(target: impl Into<String>, gate: Arc<NoteGate>, release_after: f32) -> Self {
        Self {
            target: target.into(),
            gate,
            release_after,
            release_at: None,
        }
    }

    /// Click target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Press (or keep holding) the note.
    pub fn click(&mut self, now: f64) {
        self.gate.press();
        self.release_at = Some(now + f64::from(self.release_after));
    }

    /// Whether the gate is held.
    pub fn is_held(&self) -> bool {
        self.gate.is_held()
    }
}

impl Tickable for NoteTrigger {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        if self.release_at.is_some_and(|at| ctx.now >= at) {
            self.gate.release();
            self.release_at = None;
        }
        Ok(())
    }
}
