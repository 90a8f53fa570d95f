use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Engine timing parameters, all expressed in ticks of the virtual clock.
#[derive(Clone, Debug, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accrual ticks per second of game time (default: 10).
    pub ticks_per_second: u32,
    /// Ticks between achievement polls (default: 10, once per second).
    pub achievement_poll_ticks: u32,
    /// Ticks between autosaves (default: 100, every ten seconds).
    pub autosave_ticks: u32,
    /// Ticks an undrained notification stays queued (default: 40).
    pub notification_ticks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 10,
            achievement_poll_ticks: 10,
            autosave_ticks: 100,
            notification_ticks: 40,
        }
    }
}

impl EngineConfig {
    /// Seconds of game time covered by one tick.
    pub fn tick_seconds(&self) -> f64 {
        1.0 / f64::from(self.ticks_per_second.max(1))
    }

    /// Copy with zero intervals raised to one tick.
    pub fn sanitized(mut self) -> Self {
        self.ticks_per_second = self.ticks_per_second.max(1);
        self.achievement_poll_ticks = self.achievement_poll_ticks.max(1);
        self.autosave_ticks = self.autosave_ticks.max(1);
        self.notification_ticks = self.notification_ticks.max(1);
        self
    }
}
