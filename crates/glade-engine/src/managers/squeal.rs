//! Fades the squeak voice with the poisoned effect.

use std::sync::Arc;

use glade_config::PlayerEffect;
use glade_synth::SqueakControl;

/// Maps player effect transitions onto squeak fade requests.
#[derive(Debug, Clone)]
pub struct PoisonSquealTrigger {
    control: Arc<SqueakControl>,
}

impl PoisonSquealTrigger {
    /// Drive the voice behind `control`.
    pub fn new(control: Arc<SqueakControl>) -> Self {
        Self { control }
    }

    /// Listener for `PlayerEffectTransitionBegin`.
    pub fn on_player_effect(&self, target: PlayerEffect, transition_secs: f32) {
        match target {
            PlayerEffect::None => self.control.stop(transition_secs),
            PlayerEffect::Poisoned => self.control.begin(transition_secs),
            PlayerEffect::Drunk => {}
        }
    }
}
