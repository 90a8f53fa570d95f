//! Prestige controller.
//!
//! Buying the capstone deducts its price and parks the run in
//! [`PrestigePhase::ResetPending`]. Nothing else mutates state until
//! [`rebirth`] wipes the run and returns to [`PrestigePhase::Active`].

use bevy_ecs::prelude::Resource;
use idle_core::{GameState, ProducerDef};
use idle_econ::capstone_cost;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Resource)]
pub enum PrestigePhase {
    #[default]
    Active,
    ResetPending,
}

impl PrestigePhase {
    pub fn is_pending(self) -> bool {
        self == PrestigePhase::ResetPending
    }
}

/// Buy the capstone. Returns the price paid, or `None` when the run is
/// already pending a reset or the price is out of reach.
pub fn purchase_capstone(
    capstone: &ProducerDef,
    state: &mut GameState,
    phase: &mut PrestigePhase,
) -> Option<f64> {
    debug_assert!(capstone.capstone);
    if phase.is_pending() {
        return None;
    }
    let cost = capstone_cost(capstone, state.run.prestige_level);
    if !state.spend(cost) {
        return None;
    }
    *phase = PrestigePhase::ResetPending;
    info!(cost, prestige_level = state.run.prestige_level, "capstone bought, rebirth offered");
    Some(cost)
}

/// Complete a pending rebirth. Returns the new prestige level, or `None`
/// when no capstone purchase is pending.
pub fn rebirth(state: &mut GameState, phase: &mut PrestigePhase) -> Option<u32> {
    if !phase.is_pending() {
        return None;
    }
    state.reset_for_rebirth();
    *phase = PrestigePhase::Active;
    info!(prestige_level = state.run.prestige_level, "rebirth completed");
    Some(state.run.prestige_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::{default_catalog, AchievementId, ProducerId, UpgradeId};

    #[test]
    fn capstone_then_rebirth() {
        let catalog = default_catalog();
        let capstone = catalog.capstone().unwrap();
        let mut state = GameState::new(&catalog);
        let mut phase = PrestigePhase::Active;
        state.earn(capstone.base_cost + 5.0);
        state.producers.insert(ProducerId::new("banana_farm"), 9);
        state.upgrades.insert(UpgradeId::new("fart_gun"));
        state.achievements.insert(AchievementId::new("banana_empire"));

        assert_eq!(purchase_capstone(capstone, &mut state, &mut phase), Some(capstone.base_cost));
        assert!(phase.is_pending());
        assert_eq!(state.run.current, 5.0);
        assert_eq!(purchase_capstone(capstone, &mut state, &mut phase), None);

        assert_eq!(rebirth(&mut state, &mut phase), Some(1));
        assert_eq!(phase, PrestigePhase::Active);
        assert_eq!(state.run.current, 0.0);
        assert_eq!(state.run.cumulative, 0.0);
        assert!(state.producers.values().all(|&n| n == 0));
        assert!(state.upgrades.is_empty());
        assert!(state.is_unlocked(&AchievementId::new("banana_empire")));
    }

    #[test]
    fn rebirth_without_capstone_is_noop() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        state.earn(10.0);
        let mut phase = PrestigePhase::Active;
        assert_eq!(rebirth(&mut state, &mut phase), None);
        assert_eq!(state.run.current, 10.0);
        assert_eq!(state.run.prestige_level, 0);
    }

    #[test]
    fn capstone_price_rises_per_level() {
        let catalog = default_catalog();
        let capstone = catalog.capstone().unwrap();
        let mut state = GameState::new(&catalog);
        state.run.prestige_level = 1;
        state.earn(capstone.base_cost);
        let mut phase = PrestigePhase::Active;
        assert_eq!(purchase_capstone(capstone, &mut state, &mut phase), None);
        state.earn(capstone.base_cost * 13.0);
        assert_eq!(
            purchase_capstone(capstone, &mut state, &mut phase),
            Some(capstone.base_cost * 14.0)
        );
    }
}
