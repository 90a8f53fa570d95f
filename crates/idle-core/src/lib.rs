#![deny(warnings)]

//! Core domain models and invariants for Banana Tycoon.
//!
//! This crate defines the immutable catalog (producers, upgrades,
//! achievements), the mutable game state that the engine owns, and
//! validation helpers that guard catalog invariants.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

pub mod catalog;

pub use catalog::{default_catalog, MOON_HEIST};

/// Prestige level at which the game switches to its "infinite" presentation
/// and the galaxy skin.
pub const INFINITE_MODE_LEVEL: u32 = 10;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a producer, e.g. "banana_farm".
    ProducerId
);
string_id!(
    /// Unique identifier for a one-shot upgrade, e.g. "px41_serum".
    UpgradeId
);
string_id!(
    /// Unique identifier for an achievement.
    AchievementId
);

/// Cosmetic tier of the clickable minion, derived from progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinionSkin {
    #[default]
    Default,
    Purple,
    Galaxy,
}

/// A repeatable purchase that raises passive production.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProducerDef {
    pub id: ProducerId,
    pub name: String,
    pub description: String,
    /// Price of the first unit.
    pub base_cost: f64,
    /// Bananas per second contributed by each owned unit.
    pub base_rate: f64,
    /// Minimum prestige level before the producer is offered.
    pub unlock_prestige_level: u32,
    /// The capstone is bought once per run and triggers the rebirth offer.
    /// It has no owned counter.
    pub capstone: bool,
}

/// A one-shot purchase that multiplies click yield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    pub name: String,
    pub description: String,
    pub cost: f64,
    /// Multiplier applied to the base click (> 1).
    pub multiplier: f64,
    /// Cumulative bananas earned this run before the upgrade is revealed.
    pub unlock_total_threshold: f64,
    pub unlock_prestige_level: u32,
    /// Cosmetic change granted while owned.
    pub skin: Option<MinionSkin>,
}

/// Condition that unlocks an achievement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementCondition {
    /// Cumulative bananas this run reach the threshold.
    TotalBananas { threshold: f64 },
    /// A specific producer's owned count reaches the threshold.
    ProducerOwned { producer: ProducerId, count: u32 },
    /// Prestige level reaches the threshold.
    PrestigeLevel { level: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub condition: AchievementCondition,
}

/// Immutable definitions of everything purchasable or unlockable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub producers: Vec<ProducerDef>,
    pub upgrades: Vec<UpgradeDef>,
    pub achievements: Vec<AchievementDef>,
}

impl Catalog {
    pub fn producer(&self, id: &ProducerId) -> Option<&ProducerDef> {
        self.producers.iter().find(|p| &p.id == id)
    }

    pub fn upgrade(&self, id: &UpgradeId) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|u| &u.id == id)
    }

    pub fn achievement(&self, id: &AchievementId) -> Option<&AchievementDef> {
        self.achievements.iter().find(|a| &a.id == id)
    }

    /// The single capstone producer, if the catalog defines one.
    pub fn capstone(&self) -> Option<&ProducerDef> {
        self.producers.iter().find(|p| p.capstone)
    }

    /// Producers with an owned counter (everything except the capstone).
    pub fn ordinary_producers(&self) -> impl Iterator<Item = &ProducerDef> {
        self.producers.iter().filter(|p| !p.capstone)
    }

    /// Producers offered at the given prestige level, in catalog order.
    pub fn visible_producers(&self, prestige_level: u32) -> impl Iterator<Item = &ProducerDef> {
        self.producers
            .iter()
            .filter(move |p| prestige_level >= p.unlock_prestige_level)
    }
}

/// Spendable and lifetime totals for the current run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Spendable bananas (>= 0).
    pub current: f64,
    /// Bananas earned this run; never reduced by spending.
    pub cumulative: f64,
    /// Number of completed rebirths.
    pub prestige_level: u32,
}

/// Audio preferences carried in saves. Volumes are within [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub music_volume: f64,
    pub sfx_volume: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.5,
            sfx_volume: 0.5,
        }
    }
}

impl Settings {
    /// Clamp both volumes into [0, 1]; non-finite values fall back to defaults.
    pub fn clamped(self) -> Self {
        let d = Settings::default();
        Self {
            music_volume: clamp_volume(self.music_volume, d.music_volume),
            sfx_volume: clamp_volume(self.sfx_volume, d.sfx_volume),
        }
    }
}

fn clamp_volume(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// All mutable game state. The catalog is kept separately and never changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameState {
    pub run: RunState,
    /// Owned count per ordinary producer.
    pub producers: BTreeMap<ProducerId, u32>,
    /// Owned one-shot upgrades.
    pub upgrades: BTreeSet<UpgradeId>,
    /// Unlocked achievements; survives rebirth.
    pub achievements: BTreeSet<AchievementId>,
    pub settings: Settings,
}

impl GameState {
    /// Fresh zero state with an entry for every ordinary producer.
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            producers: catalog
                .ordinary_producers()
                .map(|p| (p.id.clone(), 0))
                .collect(),
            ..Self::default()
        }
    }

    pub fn owned(&self, id: &ProducerId) -> u32 {
        self.producers.get(id).copied().unwrap_or(0)
    }

    pub fn owns_upgrade(&self, id: &UpgradeId) -> bool {
        self.upgrades.contains(id)
    }

    pub fn is_unlocked(&self, id: &AchievementId) -> bool {
        self.achievements.contains(id)
    }

    pub fn unlock_count(&self) -> usize {
        self.achievements.len()
    }

    /// Credit earned bananas to both spendable and lifetime totals.
    pub fn earn(&mut self, amount: f64) {
        debug_assert!(amount.is_finite() && amount >= 0.0, "earn({amount})");
        self.run.current += amount;
        self.run.cumulative += amount;
    }

    /// Deduct `cost` if affordable. Returns false and leaves state untouched
    /// otherwise.
    pub fn spend(&mut self, cost: f64) -> bool {
        if self.run.current < cost {
            return false;
        }
        self.run.current = (self.run.current - cost).max(0.0);
        true
    }

    /// Upgrades revealed for purchase: unowned, threshold reached, prestige gate met.
    pub fn available_upgrades<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl Iterator<Item = &'a UpgradeDef> + 'a {
        catalog.upgrades.iter().filter(move |u| self.upgrade_available(u))
    }

    pub fn upgrade_available(&self, u: &UpgradeDef) -> bool {
        !self.owns_upgrade(&u.id)
            && self.run.cumulative >= u.unlock_total_threshold
            && self.run.prestige_level >= u.unlock_prestige_level
    }

    pub fn producer_visible(&self, p: &ProducerDef) -> bool {
        self.run.prestige_level >= p.unlock_prestige_level
    }

    pub fn infinite_mode(&self) -> bool {
        self.run.prestige_level >= INFINITE_MODE_LEVEL
    }

    /// Highest cosmetic tier earned so far.
    pub fn minion_skin(&self, catalog: &Catalog) -> MinionSkin {
        if self.infinite_mode() {
            return MinionSkin::Galaxy;
        }
        let purple = catalog
            .upgrades
            .iter()
            .any(|u| u.skin == Some(MinionSkin::Purple) && self.owns_upgrade(&u.id));
        if purple {
            MinionSkin::Purple
        } else {
            MinionSkin::Default
        }
    }

    /// Wipe run progress and bump the prestige level. Achievements and
    /// settings are kept.
    pub fn reset_for_rebirth(&mut self) {
        self.run.current = 0.0;
        self.run.cumulative = 0.0;
        self.run.prestige_level += 1;
        for owned in self.producers.values_mut() {
            *owned = 0;
        }
        self.upgrades.clear();
    }
}

/// Catalog invariant violations.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("expected exactly one capstone producer, found {0}")]
    CapstoneCount(usize),
    #[error("non-finite or non-positive price on {0}")]
    InvalidPrice(String),
    #[error("production rate must be finite and >= 0 on {0}")]
    InvalidRate(String),
    #[error("upgrade multiplier must be > 1 on {0}")]
    MultiplierTooLow(String),
    #[error("achievement {achievement} references unknown producer {producer}")]
    UnknownProducer {
        achievement: String,
        producer: String,
    },
}

/// Validate a producer definition in isolation.
pub fn validate_producer(p: &ProducerDef) -> Result<(), CatalogError> {
    if !p.base_cost.is_finite() || p.base_cost <= 0.0 {
        return Err(CatalogError::InvalidPrice(p.id.0.clone()));
    }
    if !p.base_rate.is_finite() || p.base_rate < 0.0 {
        return Err(CatalogError::InvalidRate(p.id.0.clone()));
    }
    Ok(())
}

/// Validate an upgrade definition in isolation.
pub fn validate_upgrade(u: &UpgradeDef) -> Result<(), CatalogError> {
    if !u.cost.is_finite() || u.cost <= 0.0 {
        return Err(CatalogError::InvalidPrice(u.id.0.clone()));
    }
    if !u.multiplier.is_finite() || u.multiplier <= 1.0 {
        return Err(CatalogError::MultiplierTooLow(u.id.0.clone()));
    }
    Ok(())
}

/// Validate the catalog, including cross-references from achievements.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogError> {
    let mut producer_ids: BTreeSet<&ProducerId> = BTreeSet::new();
    for p in &catalog.producers {
        validate_producer(p)?;
        if !producer_ids.insert(&p.id) {
            return Err(CatalogError::DuplicateId(p.id.0.clone()));
        }
    }
    let capstones = catalog.producers.iter().filter(|p| p.capstone).count();
    if capstones != 1 {
        return Err(CatalogError::CapstoneCount(capstones));
    }

    let mut upgrade_ids: BTreeSet<&UpgradeId> = BTreeSet::new();
    for u in &catalog.upgrades {
        validate_upgrade(u)?;
        if !upgrade_ids.insert(&u.id) {
            return Err(CatalogError::DuplicateId(u.id.0.clone()));
        }
    }

    let mut achievement_ids: BTreeSet<&AchievementId> = BTreeSet::new();
    for a in &catalog.achievements {
        if !achievement_ids.insert(&a.id) {
            return Err(CatalogError::DuplicateId(a.id.0.clone()));
        }
        if let AchievementCondition::ProducerOwned { producer, .. } = &a.condition {
            if !producer_ids.contains(producer) {
                return Err(CatalogError::UnknownProducer {
                    achievement: a.id.0.clone(),
                    producer: producer.0.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn farm() -> ProducerDef {
        ProducerDef {
            id: ProducerId::new("farm"),
            name: "Farm".to_string(),
            description: String::new(),
            base_cost: 10.0,
            base_rate: 1.0,
            unlock_prestige_level: 0,
            capstone: false,
        }
    }

    #[test]
    fn default_catalog_is_valid() {
        validate_catalog(&default_catalog()).unwrap();
    }

    #[test]
    fn moon_heist_is_the_capstone() {
        let catalog = default_catalog();
        assert_eq!(catalog.capstone().unwrap().id.as_str(), MOON_HEIST);
    }

    #[test]
    fn new_state_tracks_every_ordinary_producer() {
        let catalog = default_catalog();
        let state = GameState::new(&catalog);
        let capstone = catalog.capstone().unwrap();
        assert_eq!(state.producers.len(), catalog.producers.len() - 1);
        assert!(!state.producers.contains_key(&capstone.id));
        assert!(state.producers.values().all(|&n| n == 0));
    }

    #[test]
    fn duplicate_producer_rejected() {
        let mut catalog = default_catalog();
        catalog.producers.push(catalog.producers[0].clone());
        assert_eq!(
            validate_catalog(&catalog),
            Err(CatalogError::DuplicateId(catalog.producers[0].id.0.clone()))
        );
    }

    #[test]
    fn missing_capstone_rejected() {
        let mut catalog = default_catalog();
        catalog.producers.retain(|p| !p.capstone);
        assert_eq!(validate_catalog(&catalog), Err(CatalogError::CapstoneCount(0)));
    }

    #[test]
    fn achievement_must_reference_known_producer() {
        let mut catalog = default_catalog();
        catalog.achievements.push(AchievementDef {
            id: AchievementId::new("ghost"),
            name: "Ghost".to_string(),
            description: String::new(),
            condition: AchievementCondition::ProducerOwned {
                producer: ProducerId::new("nope"),
                count: 1,
            },
        });
        assert!(matches!(
            validate_catalog(&catalog),
            Err(CatalogError::UnknownProducer { .. })
        ));
    }

    #[test]
    fn spend_is_all_or_nothing() {
        let mut state = GameState::default();
        state.earn(50.0);
        assert!(!state.spend(60.0));
        assert_eq!(state.run.current, 50.0);
        assert!(state.spend(20.0));
        assert_eq!(state.run.current, 30.0);
        assert_eq!(state.run.cumulative, 50.0);
    }

    #[test]
    fn rebirth_reset_keeps_achievements_and_settings() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        state.earn(1_000.0);
        state.producers.insert(ProducerId::new("minion_intern"), 12);
        state.upgrades.insert(UpgradeId::new("banana_peeler"));
        state.achievements.insert(AchievementId::new("first_bunch"));
        state.settings.music_volume = 0.1;

        state.reset_for_rebirth();

        assert_eq!(state.run, RunState { current: 0.0, cumulative: 0.0, prestige_level: 1 });
        assert!(state.producers.values().all(|&n| n == 0));
        assert!(state.upgrades.is_empty());
        assert!(state.is_unlocked(&AchievementId::new("first_bunch")));
        assert_eq!(state.settings.music_volume, 0.1);
    }

    #[test]
    fn skin_follows_serum_and_prestige() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        assert_eq!(state.minion_skin(&catalog), MinionSkin::Default);
        state.upgrades.insert(UpgradeId::new("px41_serum"));
        assert_eq!(state.minion_skin(&catalog), MinionSkin::Purple);
        state.run.prestige_level = INFINITE_MODE_LEVEL;
        assert!(state.infinite_mode());
        assert_eq!(state.minion_skin(&catalog), MinionSkin::Galaxy);
    }

    #[test]
    fn upgrade_reveal_needs_threshold_and_prestige() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        let gated = catalog
            .upgrades
            .iter()
            .find(|u| u.unlock_prestige_level > 0)
            .unwrap();
        state.run.cumulative = gated.unlock_total_threshold;
        assert!(!state.upgrade_available(gated));
        state.run.prestige_level = gated.unlock_prestige_level;
        assert!(state.upgrade_available(gated));
        state.upgrades.insert(gated.id.clone());
        assert!(!state.upgrade_available(gated));
    }

    #[test]
    fn visible_producers_respect_prestige_gate() {
        let catalog = default_catalog();
        let at_zero = catalog.visible_producers(0).count();
        let at_five = catalog.visible_producers(5).count();
        assert!(at_zero < at_five);
        assert_eq!(at_five, catalog.producers.len());
    }

    #[test]
    fn catalog_serde_roundtrip() {
        let catalog = default_catalog();
        let s = serde_json::to_string_pretty(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&s).unwrap();
        assert_eq!(back, catalog);
    }

    proptest! {
        #[test]
        fn settings_clamp_into_unit_range(m in -10.0f64..10.0, s in -10.0f64..10.0) {
            let c = Settings { music_volume: m, sfx_volume: s }.clamped();
            prop_assert!((0.0..=1.0).contains(&c.music_volume));
            prop_assert!((0.0..=1.0).contains(&c.sfx_volume));
        }

        #[test]
        fn positive_producers_validate(cost in 0.01f64..1e12, rate in 0.0f64..1e6) {
            let p = ProducerDef { base_cost: cost, base_rate: rate, ..farm() };
            prop_assert!(validate_producer(&p).is_ok());
        }
    }

    #[test]
    fn non_finite_volume_falls_back() {
        let c = Settings { music_volume: f64::NAN, sfx_volume: f64::INFINITY }.clamped();
        assert_eq!(c, Settings::default());
    }
}
