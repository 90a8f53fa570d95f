#![deny(warnings)]

//! ECS runtime for the banana economy.
//!
//! [`Engine`] owns a `bevy_ecs` [`World`] holding the catalog, the live
//! [`GameState`] and the engine's bookkeeping resources, plus the per-tick
//! [`Schedule`]. Every tick and every command takes `&mut Engine`, so each
//! one is applied as a whole before the next begins.

pub mod accrual;
pub mod commands;
pub mod config;
pub mod events;
pub mod prestige;
pub mod progress;
pub mod systems;

pub use commands::{CommandError, Purchase};
pub use config::EngineConfig;
pub use events::{EventQueue, GameEvent, SaveOutbox, SaveReason, SaveRequest, StampedEvent};
pub use prestige::PrestigePhase;
pub use systems::{build_schedule, CatalogRes, Clock, Ledger};

use bevy_ecs::prelude::*;
use idle_core::{
    AchievementId, Catalog, GameState, MinionSkin, ProducerDef, ProducerId, RunState, UpgradeDef,
    UpgradeId,
};
use idle_econ::{effective_rate, BuyAmount, Quote, RebirthPreview};
use persistence::Snapshot;
use std::sync::Arc;
use tracing::debug;

/// Totals reported back after a successful command.
pub type Totals = RunState;

pub struct Engine {
    world: World,
    schedule: Schedule,
}

impl Engine {
    pub fn new(catalog: Arc<Catalog>, state: GameState, config: EngineConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(CatalogRes(catalog));
        world.insert_resource(Ledger(state));
        world.insert_resource(config.sanitized());
        world.insert_resource(Clock::default());
        world.insert_resource(PrestigePhase::default());
        world.insert_resource(EventQueue::default());
        world.insert_resource(SaveOutbox::default());
        Self {
            world,
            schedule: build_schedule(),
        }
    }

    /// Fresh game on the built-in catalog with default timing.
    pub fn with_defaults() -> Self {
        let catalog = Arc::new(idle_core::default_catalog());
        let state = GameState::new(&catalog);
        Self::new(catalog, state, EngineConfig::default())
    }

    /// Run one tick of the schedule.
    pub fn tick(&mut self) {
        self.schedule.run(&mut self.world);
    }

    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Advance by whole ticks covering `seconds` of game time.
    pub fn advance_seconds(&mut self, seconds: f64) {
        let ticks = (seconds * f64::from(self.config().ticks_per_second)).round();
        if ticks.is_finite() && ticks > 0.0 {
            self.advance(ticks as u64);
        }
    }

    pub fn purchase_producer(
        &mut self,
        id: &ProducerId,
        quantity: u32,
    ) -> Result<Option<Totals>, CommandError> {
        let catalog = self.catalog_arc();
        let mut phase = self.phase();
        let bought = {
            let mut ledger = self.world.resource_mut::<Ledger>();
            commands::purchase_producer(&catalog, &mut ledger.0, &mut phase, id, quantity)?
        };
        *self.world.resource_mut::<PrestigePhase>() = phase;
        let Some(bought) = bought else {
            return Ok(None);
        };
        if let Purchase::Capstone { .. } = bought {
            let next = self.state().run.prestige_level + 1;
            self.notify(GameEvent::RebirthOffered {
                prestige_level: next,
            });
        }
        Ok(Some(self.after_command()))
    }

    /// Buy under a store buy mode. `Max` buys as many as the balance covers.
    pub fn purchase_with(
        &mut self,
        id: &ProducerId,
        amount: BuyAmount,
    ) -> Result<Option<Totals>, CommandError> {
        let quote = self
            .quote(id, amount)
            .ok_or_else(|| CommandError::UnknownProducer(id.clone()))?;
        if !quote.affordable {
            return Ok(None);
        }
        self.purchase_producer(id, quote.quantity)
    }

    pub fn purchase_upgrade(&mut self, id: &UpgradeId) -> Result<Option<Totals>, CommandError> {
        let catalog = self.catalog_arc();
        let phase = self.phase();
        let bought = {
            let mut ledger = self.world.resource_mut::<Ledger>();
            commands::purchase_upgrade(&catalog, &mut ledger.0, phase, id)?
        };
        Ok(bought.map(|_| self.after_command()))
    }

    pub fn perform_click(&mut self) -> Option<Totals> {
        let catalog = self.catalog_arc();
        let phase = self.phase();
        let earned = {
            let mut ledger = self.world.resource_mut::<Ledger>();
            commands::perform_click(&catalog, &mut ledger.0, phase)
        };
        earned.map(|_| self.after_command())
    }

    /// Confirm a pending rebirth. Queues a save of the fresh run.
    pub fn rebirth(&mut self) -> Option<Totals> {
        let mut phase = self.phase();
        let level = {
            let mut ledger = self.world.resource_mut::<Ledger>();
            prestige::rebirth(&mut ledger.0, &mut phase)
        }?;
        *self.world.resource_mut::<PrestigePhase>() = phase;
        self.notify(GameEvent::PrestigeCompleted {
            prestige_level: level,
        });
        let snapshot = self.snapshot();
        let tick = self.now();
        self.world.resource_mut::<SaveOutbox>().push(SaveRequest {
            tick,
            reason: SaveReason::Prestige,
            snapshot,
        });
        self.notify(GameEvent::Saved {
            reason: SaveReason::Prestige,
        });
        Some(self.after_command())
    }

    /// Set the music volume, clamped into [0, 1]. Returns the stored value.
    pub fn set_music_volume(&mut self, volume: f64) -> f64 {
        let mut ledger = self.world.resource_mut::<Ledger>();
        ledger.0.settings.music_volume = volume;
        ledger.0.settings = ledger.0.settings.clone().clamped();
        ledger.0.settings.music_volume
    }

    pub fn set_sfx_volume(&mut self, volume: f64) -> f64 {
        let mut ledger = self.world.resource_mut::<Ledger>();
        ledger.0.settings.sfx_volume = volume;
        ledger.0.settings = ledger.0.settings.clone().clamped();
        ledger.0.settings.sfx_volume
    }

    pub fn state(&self) -> &GameState {
        &self.world.resource::<Ledger>().0
    }

    pub fn catalog(&self) -> &Catalog {
        &self.world.resource::<CatalogRes>().0
    }

    pub fn config(&self) -> &EngineConfig {
        self.world.resource::<EngineConfig>()
    }

    pub fn phase(&self) -> PrestigePhase {
        *self.world.resource::<PrestigePhase>()
    }

    /// Ticks run so far.
    pub fn now(&self) -> u64 {
        self.world.resource::<Clock>().tick
    }

    /// Displayed passive income per second, prestige included.
    pub fn banana_per_second(&self) -> f64 {
        effective_rate(self.catalog(), self.state())
    }

    pub fn click_value(&self) -> f64 {
        idle_econ::click_value(self.catalog(), self.state())
    }

    /// Price quote for a producer under a buy mode; `None` for unknown ids.
    pub fn quote(&self, id: &ProducerId, amount: BuyAmount) -> Option<Quote> {
        let producer = self.catalog().producer(id)?;
        let state = self.state();
        Some(idle_econ::quote(
            producer,
            state.owned(id),
            amount,
            state.run.current,
            state.run.prestige_level,
        ))
    }

    pub fn rebirth_preview(&self) -> Option<RebirthPreview> {
        let capstone = self.catalog().capstone()?;
        Some(idle_econ::rebirth_preview(capstone, self.state().run.prestige_level))
    }

    pub fn minion_skin(&self) -> MinionSkin {
        self.state().minion_skin(self.catalog())
    }

    pub fn visible_producers(&self) -> Vec<&ProducerDef> {
        self.catalog()
            .visible_producers(self.state().run.prestige_level)
            .collect()
    }

    pub fn available_upgrades(&self) -> Vec<&UpgradeDef> {
        self.state().available_upgrades(self.catalog()).collect()
    }

    /// Fresh persistence projection of the live state.
    pub fn snapshot(&self) -> Snapshot {
        persistence::serialize(self.state())
    }

    pub fn drain_events(&mut self) -> Vec<StampedEvent> {
        self.world.resource_mut::<EventQueue>().drain()
    }

    pub fn drain_saves(&mut self) -> Vec<SaveRequest> {
        self.world.resource_mut::<SaveOutbox>().drain()
    }

    fn catalog_arc(&self) -> Arc<Catalog> {
        Arc::clone(&self.world.resource::<CatalogRes>().0)
    }

    fn notify(&mut self, event: GameEvent) {
        let tick = self.now();
        let lifetime = self.config().notification_ticks;
        self.world.resource_mut::<EventQueue>().push(tick, lifetime, event);
    }

    /// Unlock whatever the command just made reachable and report totals.
    fn after_command(&mut self) -> Totals {
        let catalog = self.catalog_arc();
        let unlocked: Vec<(AchievementId, String)> = {
            let mut ledger = self.world.resource_mut::<Ledger>();
            progress::evaluate(&catalog, &mut ledger.0)
                .into_iter()
                .map(|a| (a.id.clone(), a.name.clone()))
                .collect()
        };
        for (id, name) in unlocked {
            self.notify(GameEvent::AchievementUnlocked { id, name });
        }
        let totals = self.state().run.clone();
        debug!(current = totals.current, cumulative = totals.cumulative, "command applied");
        totals
    }
}
