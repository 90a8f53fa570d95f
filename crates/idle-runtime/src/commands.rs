//! Player commands against plain state.
//!
//! Each command is all-or-nothing. `Ok(None)` means the command was a
//! legitimate no-op (cannot afford, not revealed yet, reset pending);
//! `Err` means the caller broke the contract (unknown id, zero quantity).

use crate::prestige::{self, PrestigePhase};
use idle_core::{Catalog, GameState, ProducerId, UpgradeId};
use idle_econ::{bulk_cost, click_value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown producer: {0}")]
    UnknownProducer(ProducerId),
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(UpgradeId),
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// What a successful producer purchase did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Purchase {
    Units { quantity: u32, cost: f64 },
    Capstone { cost: f64 },
}

pub fn purchase_producer(
    catalog: &Catalog,
    state: &mut GameState,
    phase: &mut PrestigePhase,
    id: &ProducerId,
    quantity: u32,
) -> Result<Option<Purchase>, CommandError> {
    let producer = catalog
        .producer(id)
        .ok_or_else(|| CommandError::UnknownProducer(id.clone()))?;
    if quantity == 0 {
        return Err(CommandError::ZeroQuantity);
    }
    if phase.is_pending() || !state.producer_visible(producer) {
        return Ok(None);
    }
    if producer.capstone {
        return Ok(prestige::purchase_capstone(producer, state, phase)
            .map(|cost| Purchase::Capstone { cost }));
    }
    let owned = state.owned(id);
    let cost = bulk_cost(producer, owned, quantity, state.run.prestige_level);
    if !state.spend(cost) {
        debug!(producer = %id, quantity, cost, "cannot afford producer");
        return Ok(None);
    }
    state.producers.insert(id.clone(), owned.saturating_add(quantity));
    debug!(producer = %id, quantity, cost, "producer bought");
    Ok(Some(Purchase::Units { quantity, cost }))
}

/// Buy a revealed, unowned upgrade. Returns the price paid.
pub fn purchase_upgrade(
    catalog: &Catalog,
    state: &mut GameState,
    phase: PrestigePhase,
    id: &UpgradeId,
) -> Result<Option<f64>, CommandError> {
    let upgrade = catalog
        .upgrade(id)
        .ok_or_else(|| CommandError::UnknownUpgrade(id.clone()))?;
    if phase.is_pending() || !state.upgrade_available(upgrade) {
        return Ok(None);
    }
    if !state.spend(upgrade.cost) {
        debug!(upgrade = %id, cost = upgrade.cost, "cannot afford upgrade");
        return Ok(None);
    }
    state.upgrades.insert(id.clone());
    debug!(upgrade = %id, cost = upgrade.cost, "upgrade bought");
    Ok(Some(upgrade.cost))
}

/// Credit one click. Returns the amount earned.
pub fn perform_click(catalog: &Catalog, state: &mut GameState, phase: PrestigePhase) -> Option<f64> {
    if phase.is_pending() {
        return None;
    }
    let amount = click_value(catalog, state);
    state.earn(amount);
    Some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::default_catalog;

    fn setup(bananas: f64) -> (Catalog, GameState) {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        state.earn(bananas);
        (catalog, state)
    }

    #[test]
    fn buys_units_at_bulk_price() {
        let (catalog, mut state) = setup(100.0);
        let mut phase = PrestigePhase::Active;
        let id = ProducerId::new("minion_intern");
        let got = purchase_producer(&catalog, &mut state, &mut phase, &id, 2).unwrap();
        // 15 + 17.25, floored once
        assert_eq!(got, Some(Purchase::Units { quantity: 2, cost: 32.0 }));
        assert_eq!(state.owned(&id), 2);
        assert_eq!(state.run.current, 68.0);
        assert_eq!(state.run.cumulative, 100.0);
    }

    #[test]
    fn unaffordable_purchase_changes_nothing() {
        let (catalog, mut state) = setup(10.0);
        let before = state.clone();
        let mut phase = PrestigePhase::Active;
        let id = ProducerId::new("banana_tree");
        assert_eq!(purchase_producer(&catalog, &mut state, &mut phase, &id, 1), Ok(None));
        assert_eq!(state, before);
    }

    #[test]
    fn precondition_violations_are_errors() {
        let (catalog, mut state) = setup(1e6);
        let mut phase = PrestigePhase::Active;
        let ghost = ProducerId::new("ghost");
        assert_eq!(
            purchase_producer(&catalog, &mut state, &mut phase, &ghost, 1),
            Err(CommandError::UnknownProducer(ghost))
        );
        let tree = ProducerId::new("banana_tree");
        assert_eq!(
            purchase_producer(&catalog, &mut state, &mut phase, &tree, 0),
            Err(CommandError::ZeroQuantity)
        );
        let nope = UpgradeId::new("nope");
        assert_eq!(
            purchase_upgrade(&catalog, &mut state, phase, &nope),
            Err(CommandError::UnknownUpgrade(nope))
        );
    }

    #[test]
    fn prestige_gated_producer_is_hidden() {
        let (catalog, mut state) = setup(1e9);
        let mut phase = PrestigePhase::Active;
        let id = ProducerId::new("time_machine");
        assert_eq!(purchase_producer(&catalog, &mut state, &mut phase, &id, 1), Ok(None));
        state.run.prestige_level = 1;
        assert!(purchase_producer(&catalog, &mut state, &mut phase, &id, 1)
            .unwrap()
            .is_some());
    }

    #[test]
    fn upgrade_needs_reveal_and_is_one_shot() {
        let (catalog, mut state) = setup(40.0);
        let id = UpgradeId::new("banana_peeler");
        state.run.current = 1_000.0;
        assert_eq!(purchase_upgrade(&catalog, &mut state, PrestigePhase::Active, &id), Ok(None));
        state.earn(20.0);
        assert_eq!(
            purchase_upgrade(&catalog, &mut state, PrestigePhase::Active, &id),
            Ok(Some(100.0))
        );
        assert_eq!(purchase_upgrade(&catalog, &mut state, PrestigePhase::Active, &id), Ok(None));
        assert_eq!(state.run.current, 920.0);
    }

    #[test]
    fn pending_reset_blocks_everything() {
        let (catalog, mut state) = setup(1e6);
        let before = state.clone();
        let mut phase = PrestigePhase::ResetPending;
        let tree = ProducerId::new("banana_tree");
        assert_eq!(purchase_producer(&catalog, &mut state, &mut phase, &tree, 1), Ok(None));
        assert_eq!(
            purchase_upgrade(&catalog, &mut state, phase, &UpgradeId::new("banana_peeler")),
            Ok(None)
        );
        assert_eq!(perform_click(&catalog, &mut state, phase), None);
        assert_eq!(state, before);
    }

    #[test]
    fn click_earns_click_value() {
        let (catalog, mut state) = setup(0.0);
        assert_eq!(perform_click(&catalog, &mut state, PrestigePhase::Active), Some(1.0));
        assert_eq!(state.run.cumulative, 1.0);
    }
}
