//! Achievement tracking. Each achievement moves locked -> unlocked once and
//! never back.

use idle_core::{AchievementCondition, AchievementDef, Catalog, GameState};
use tracing::info;

/// Whether a condition holds for the current state.
pub fn condition_met(condition: &AchievementCondition, state: &GameState) -> bool {
    match condition {
        AchievementCondition::TotalBananas { threshold } => state.run.cumulative >= *threshold,
        AchievementCondition::ProducerOwned { producer, count } => state.owned(producer) >= *count,
        AchievementCondition::PrestigeLevel { level } => state.run.prestige_level >= *level,
    }
}

/// Still-locked achievements whose condition now holds, in catalog order.
pub fn newly_satisfied<'a>(catalog: &'a Catalog, state: &GameState) -> Vec<&'a AchievementDef> {
    catalog
        .achievements
        .iter()
        .filter(|a| !state.is_unlocked(&a.id) && condition_met(&a.condition, state))
        .collect()
}

/// Run one evaluation pass: unlock everything newly satisfied and return it.
pub fn evaluate<'a>(catalog: &'a Catalog, state: &mut GameState) -> Vec<&'a AchievementDef> {
    let unlocked = newly_satisfied(catalog, state);
    for a in &unlocked {
        info!(achievement = %a.id, "achievement unlocked");
        state.achievements.insert(a.id.clone());
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::{default_catalog, AchievementId, ProducerId};

    #[test]
    fn reports_every_simultaneous_unlock_once() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        state.earn(20_000.0);
        state.producers.insert(ProducerId::new("minion_intern"), 10);

        let ids: Vec<_> = evaluate(&catalog, &mut state)
            .into_iter()
            .map(|a| a.id.0.as_str())
            .collect();
        assert_eq!(ids, ["first_bunch", "banana_hoarder", "intern_army"]);
        assert!(evaluate(&catalog, &mut state).is_empty());
    }

    #[test]
    fn unlocks_survive_conditions_lapsing() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        state.earn(150.0);
        evaluate(&catalog, &mut state);
        state.reset_for_rebirth();
        let again = evaluate(&catalog, &mut state);
        assert!(state.is_unlocked(&AchievementId::new("first_bunch")));
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].id, AchievementId::new("reborn"));
    }
}
