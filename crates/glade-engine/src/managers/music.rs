//! Music zones crossfaded on area enter.

use glade_config::MusicConfig;
use glade_core::{ClipId, CrossfadeEntry, Crossfader};

use super::publish_pair;
use crate::clips::ClipBank;
use crate::error::{EngineError, Result};
use crate::mixer::Bus;
use crate::tick::{TickContext, Tickable};

/// One zone of the zone table.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicZone {
    /// Area name.
    pub name: String,
    /// Looping clip.
    pub clip: ClipId,
    /// Clip length in seconds.
    pub length: f32,
    /// Volume once faded in.
    pub volume: f32,
    /// Where playback resumes on the next fade in, in `[0, length)`.
    pub resume_at: f32,
}

/// Crossfades between music zones, resuming each zone where it left off.
#[derive(Debug, Clone)]
pub struct MusicZoneManager {
    zones: Vec<MusicZone>,
    crossfader: Crossfader<usize>,
    slots: [usize; 2],
}

impl MusicZoneManager {
    /// Start the first zone at full volume on mixer `slots`.
    pub fn new(config: &MusicConfig, clips: &ClipBank, slots: [usize; 2]) -> Result<Self> {
        let zones = config
            .zones
            .iter()
            .map(|z| {
                let clip = clips.id(&z.clip)?;
                Ok(MusicZone {
                    name: z.name.clone(),
                    clip,
                    length: clips.length_secs(clip),
                    volume: z.volume,
                    resume_at: 0.0,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let first = zones
            .first()
            .ok_or_else(|| EngineError::UnknownZone(String::new()))?;
        let crossfader = Crossfader::new(0, &entry(first), config.speed);

        tracing::info!(zone = %first.name, zones = zones.len(), "music zones ready");
        Ok(Self {
            zones,
            crossfader,
            slots,
        })
    }

    /// Index of a zone by area name.
    pub fn zone_index(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.name == name)
    }

    /// Whether `name` is a music zone.
    pub fn has_zone(&self, name: &str) -> bool {
        self.zone_index(name).is_some()
    }

    /// Request a fade to the zone named `name`.
    pub fn enter_zone(&mut self, name: &str) -> Result<()> {
        let index = self
            .zone_index(name)
            .ok_or_else(|| EngineError::UnknownZone(name.to_string()))?;
        tracing::debug!(zone = name, "music zone requested");
        self.crossfader.request(index);
        Ok(())
    }

    /// Zone currently output.
    pub fn current_zone(&self) -> &MusicZone {
        &self.zones[self.crossfader.current()]
    }

    /// Most recently requested zone.
    pub fn target_zone(&self) -> &MusicZone {
        &self.zones[self.crossfader.target()]
    }

    /// Zone table.
    pub fn zones(&self) -> &[MusicZone] {
        &self.zones
    }

    /// The underlying crossfader.
    pub fn crossfader(&self) -> &Crossfader<usize> {
        &self.crossfader
    }
}

impl Tickable for MusicZoneManager {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let zones = &self.zones;
        let completion = self.crossfader.tick(ctx.dt, |i| entry(&zones[i]))?;
        if let Some(done) = completion {
            let from = &mut self.zones[done.from];
            from.resume_at = done.saved_offset;
            tracing::debug!(
                from = %from.name,
                saved_offset = done.saved_offset,
                "music crossfade complete"
            );
        }
        publish_pair(self.crossfader.channels(), self.slots, Bus::Music, ctx.out);
        Ok(())
    }
}

fn entry(zone: &MusicZone) -> CrossfadeEntry {
    CrossfadeEntry {
        clip: zone.clip,
        length: zone.length,
        volume: zone.volume,
        resume_at: zone.resume_at,
    }
}
