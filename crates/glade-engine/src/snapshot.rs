//! Named bus-gain snapshots and the blender that moves between them.

use std::collections::HashMap;

use glade_config::SnapshotConfig;
use glade_core::clamp01;

use crate::error::{EngineError, Result};
use crate::mixer::BusGains;

/// Snapshot name → bus gains.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTable {
    gains: HashMap<String, BusGains>,
}

impl SnapshotTable {
    /// Build from `[[snapshots]]`.
    pub fn from_config(snapshots: &[SnapshotConfig]) -> Self {
        Self {
            gains: snapshots
                .iter()
                .map(|s| (s.name.clone(), BusGains::from(s)))
                .collect(),
        }
    }

    /// Gains of a snapshot.
    pub fn get(&self, name: &str) -> Result<BusGains> {
        self.gains
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownSnapshot(name.to_string()))
    }
}

/// Linear blend of the mixer buses towards a target snapshot.
///
/// A new blend always starts from the gains currently heard, so a blend
/// requested halfway through another one does not jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotBlender {
    from: BusGains,
    to: BusGains,
    current: BusGains,
    elapsed: f32,
    duration: f32,
}

impl SnapshotBlender {
    /// Settled at `initial`.
    pub fn new(initial: BusGains) -> Self {
        Self {
            from: initial,
            to: initial,
            current: initial,
            elapsed: 0.0,
            duration: 0.0,
        }
    }

    /// Gains heard now.
    pub fn current(&self) -> BusGains {
        self.current
    }

    /// Gains being blended to.
    pub fn target(&self) -> BusGains {
        self.to
    }

    /// Whether a blend is in progress.
    pub fn is_blending(&self) -> bool {
        self.elapsed < self.duration
    }

    /// Start blending to `target` over `secs` seconds.
    ///
    /// A non-positive duration jumps straight to `target`.
    pub fn blend_to(&mut self, target: BusGains, secs: f32) {
        self.from = self.current;
        self.to = target;
        self.elapsed = 0.0;
        if secs > 0.0 {
            self.duration = secs;
        } else {
            self.duration = 0.0;
            self.current = target;
        }
    }

    /// Advance by `dt` seconds. Returns `true` if the gains changed.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.is_blending() {
            return false;
        }
        self.elapsed += dt;
        let t = clamp01(self.elapsed / self.duration);
        self.current = if t >= 1.0 {
            self.to
        } else {
            BusGains::lerp(&self.from, &self.to, t)
        };
        true
    }
}

impl Default for SnapshotBlender {
    fn default() -> Self {
        Self::new(BusGains::UNITY)
    }
}
