//! Outbound notifications and save requests.
//!
//! The presentation layer drains [`EventQueue`]; anything it leaves behind
//! expires after the configured lifetime so toasts never pile up. Save
//! requests sit in [`SaveOutbox`] until the host hands them to a writer.

use bevy_ecs::prelude::Resource;
use idle_core::AchievementId;
use persistence::Snapshot;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveReason {
    Periodic,
    Prestige,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    AchievementUnlocked { id: AchievementId, name: String },
    /// The capstone was bought; a rebirth is waiting for confirmation.
    RebirthOffered { prestige_level: u32 },
    PrestigeCompleted { prestige_level: u32 },
    Saved { reason: SaveReason },
}

/// An event stamped with the tick it was raised on.
#[derive(Clone, Debug, PartialEq)]
pub struct StampedEvent {
    pub tick: u64,
    pub expires_at: u64,
    pub event: GameEvent,
}

#[derive(Debug, Default, Resource)]
pub struct EventQueue {
    pending: VecDeque<StampedEvent>,
}

impl EventQueue {
    pub fn push(&mut self, tick: u64, lifetime: u32, event: GameEvent) {
        self.pending.push_back(StampedEvent {
            tick,
            expires_at: tick + u64::from(lifetime),
            event,
        });
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<StampedEvent> {
        self.pending.drain(..).collect()
    }

    /// Drop events whose lifetime has run out at `now`.
    pub fn expire(&mut self, now: u64) {
        self.pending.retain(|e| e.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveRequest {
    pub tick: u64,
    pub reason: SaveReason,
    pub snapshot: Snapshot,
}

#[derive(Debug, Default, Resource)]
pub struct SaveOutbox {
    requests: Vec<SaveRequest>,
}

impl SaveOutbox {
    pub fn push(&mut self, request: SaveRequest) {
        self.requests.push(request);
    }

    pub fn drain(&mut self) -> Vec<SaveRequest> {
        std::mem::take(&mut self.requests)
    }
}
