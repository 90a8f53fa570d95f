//! Resources and recurring jobs driven by one fixed-rate schedule.
//!
//! Every tick runs, in order: clock advance, accrual, the achievement poll
//! (once per `achievement_poll_ticks`), the autosave (once per
//! `autosave_ticks`) and notification expiry.

use crate::accrual::accrue;
use crate::config::EngineConfig;
use crate::events::{EventQueue, GameEvent, SaveOutbox, SaveReason, SaveRequest};
use crate::prestige::PrestigePhase;
use crate::progress;
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use idle_core::{Catalog, GameState};
use std::sync::Arc;
use tracing::debug;

/// Read-only catalog shared with commands.
#[derive(Clone, Debug, Resource)]
pub struct CatalogRes(pub Arc<Catalog>);

/// The single live copy of mutable game state.
#[derive(Clone, Debug, Resource)]
pub struct Ledger(pub GameState);

/// Virtual clock: ticks completed since the engine started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Resource)]
pub struct Clock {
    pub tick: u64,
}

fn every(interval: u32, tick: u64) -> bool {
    tick % u64::from(interval.max(1)) == 0
}

pub fn advance_clock(mut clock: ResMut<Clock>) {
    clock.tick += 1;
}

pub fn accrual_system(
    catalog: Res<CatalogRes>,
    config: Res<EngineConfig>,
    phase: Res<PrestigePhase>,
    mut ledger: ResMut<Ledger>,
) {
    if phase.is_pending() {
        return;
    }
    accrue(&catalog.0, &mut ledger.0, config.tick_seconds());
}

pub fn poll_due(clock: Res<Clock>, config: Res<EngineConfig>) -> bool {
    every(config.achievement_poll_ticks, clock.tick)
}

pub fn achievement_poll_system(
    catalog: Res<CatalogRes>,
    config: Res<EngineConfig>,
    clock: Res<Clock>,
    mut ledger: ResMut<Ledger>,
    mut events: ResMut<EventQueue>,
) {
    for a in progress::evaluate(&catalog.0, &mut ledger.0) {
        events.push(
            clock.tick,
            config.notification_ticks,
            GameEvent::AchievementUnlocked {
                id: a.id.clone(),
                name: a.name.clone(),
            },
        );
    }
}

pub fn autosave_due(clock: Res<Clock>, config: Res<EngineConfig>, phase: Res<PrestigePhase>) -> bool {
    // A pending reset has paid for the capstone but not reborn yet; saving it
    // would strand the payment on reload.
    !phase.is_pending() && every(config.autosave_ticks, clock.tick)
}

pub fn autosave_system(
    config: Res<EngineConfig>,
    clock: Res<Clock>,
    ledger: Res<Ledger>,
    mut outbox: ResMut<SaveOutbox>,
    mut events: ResMut<EventQueue>,
) {
    debug!(tick = clock.tick, "autosave");
    outbox.push(SaveRequest {
        tick: clock.tick,
        reason: SaveReason::Periodic,
        snapshot: persistence::serialize(&ledger.0),
    });
    events.push(
        clock.tick,
        config.notification_ticks,
        GameEvent::Saved {
            reason: SaveReason::Periodic,
        },
    );
}

pub fn expire_events_system(clock: Res<Clock>, mut events: ResMut<EventQueue>) {
    events.expire(clock.tick);
}

/// Build the per-tick schedule. Runs single-threaded: every job touches the
/// same ledger.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            advance_clock,
            accrual_system,
            achievement_poll_system.run_if(poll_due),
            autosave_system.run_if(autosave_due),
            expire_events_system,
        )
            .chain(),
    );
    schedule
}
