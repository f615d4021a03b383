//! Day and night ambience, crossfaded when the time of day changes.

use glade_config::AmbientConfig;
use glade_core::{CrossfadeEntry, Crossfader};

use super::publish_pair;
use crate::clips::ClipBank;
use crate::error::Result;
use crate::event::TimeOfDay;
use crate::mixer::Bus;
use crate::tick::{TickContext, Tickable};

/// Crossfades between the day and night ambience loops.
#[derive(Debug, Clone)]
pub struct AmbientSoundManager {
    day: CrossfadeEntry,
    night: CrossfadeEntry,
    crossfader: Crossfader<TimeOfDay>,
    slots: [usize; 2],
}

impl AmbientSoundManager {
    /// Start the day loop on mixer `slots`.
    pub fn new(config: &AmbientConfig, clips: &ClipBank, slots: [usize; 2]) -> Result<Self> {
        let day_clip = clips.id(&config.day.clip)?;
        let day = CrossfadeEntry {
            clip: day_clip,
            length: clips.length_secs(day_clip),
            volume: config.day.volume,
            resume_at: 0.0,
        };
        let night_clip = clips.id(&config.night.clip)?;
        let night = CrossfadeEntry {
            clip: night_clip,
            length: clips.length_secs(night_clip),
            volume: config.night.volume,
            resume_at: 0.0,
        };
        Ok(Self {
            day,
            night,
            crossfader: Crossfader::new(TimeOfDay::Day, &day, config.speed),
            slots,
        })
    }

    /// Listener for `TimeChanged`.
    pub fn on_time_changed(&mut self, time: TimeOfDay) {
        tracing::debug!(%time, "ambience requested");
        self.crossfader.request(time);
    }

    /// Ambience currently output.
    pub fn current(&self) -> TimeOfDay {
        self.crossfader.current()
    }

    /// The underlying crossfader.
    pub fn crossfader(&self) -> &Crossfader<TimeOfDay> {
        &self.crossfader
    }
}

impl Tickable for AmbientSoundManager {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let (day, night) = (self.day, self.night);
        let done = self.crossfader.tick(ctx.dt, |t| match t {
            TimeOfDay::Day => day,
            TimeOfDay::Night => night,
        })?;
        if let Some(done) = done {
            tracing::debug!(to = %done.to, "ambience crossfade complete");
        }
        publish_pair(self.crossfader.channels(), self.slots, Bus::Ambient, ctx.out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::test_support::Harness;
    use glade_config::ClipRef;

    fn manager() -> AmbientSoundManager {
        let mut clips = ClipBank::new(100);
        clips.insert("birds", vec![0.0; 100]);
        clips.insert("crickets", vec![0.0; 100]);
        let config = AmbientConfig {
            speed: 0.25,
            day: ClipRef {
                clip: "birds".into(),
                volume: 1.0,
            },
            night: ClipRef {
                clip: "crickets".into(),
                volume: 0.75,
            },
        };
        AmbientSoundManager::new(&config, &clips, [2, 3]).unwrap()
    }

    #[test]
    fn time_change_fades_to_night() {
        let mut m = manager();
        let mut h = Harness::new();
        m.on_time_changed(TimeOfDay::Night);
        for _ in 0..3 {
            h.tick(&mut m, 1.0).unwrap();
        }
        assert!(m.crossfader().is_transitioning());
        h.tick(&mut m, 1.0).unwrap();
        assert_eq!(m.current(), TimeOfDay::Night);

        let volumes: Vec<f32> = m
            .crossfader()
            .channels()
            .iter()
            .map(|(_, c)| c.effective_volume())
            .collect();
        assert!(volumes.contains(&0.75));
    }

    #[test]
    fn back_and_forth_request_mid_fade_is_queued() {
        let mut m = manager();
        let mut h = Harness::new();
        m.on_time_changed(TimeOfDay::Night);
        h.tick(&mut m, 1.0).unwrap();
        m.on_time_changed(TimeOfDay::Day);
        for _ in 0..3 {
            h.tick(&mut m, 1.0).unwrap();
        }
        assert_eq!(m.current(), TimeOfDay::Night);
        for _ in 0..4 {
            h.tick(&mut m, 1.0).unwrap();
        }
        assert_eq!(m.current(), TimeOfDay::Day);
    }
}
