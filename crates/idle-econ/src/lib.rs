#![deny(warnings)]

//! Economic models: production, pricing and click yield for Banana Tycoon.
//!
//! This module provides pure, deterministic helpers for:
//! - Passive production rate with the achievement bonus
//! - Geometric bulk pricing and its closed-form inverse (max affordable)
//! - Capstone pricing scaled by prestige level
//! - Click yield coupling upgrades, production and prestige
//!
//! Every function is total. Unknown ids never reach this layer: callers look
//! definitions up in the catalog first.

use idle_core::{Catalog, GameState, ProducerDef};

/// Price ratio between consecutive units of an ordinary producer.
pub const COST_GROWTH: f64 = 1.15;
/// Capstone price ratio per prestige level.
pub const CAPSTONE_GROWTH: f64 = 14.0;
/// Share of the production rate added to every click.
pub const CLICK_RATE_SHARE: f64 = 0.05;
/// Achievement bonus per unlock, in tenths.
const BONUS_TENTHS_PER_UNLOCK: usize = 1;
/// Largest gap below an integer still treated as rounding noise.
const FLOOR_SNAP: f64 = 1e-7;

/// Floor that lifts values sitting just under an integer onto it, so
/// `9.999999999999998` prices as `10`. The gap is absolute: real fractions
/// of large prices are always floored.
fn floor_tolerant(x: f64) -> f64 {
    let up = x.ceil();
    if up - x <= FLOOR_SNAP {
        up
    } else {
        x.floor()
    }
}

/// Production multiplier from unlocked achievements: `1 + 0.10 * count`,
/// additive. Computed in tenths so three unlocks give exactly `1.3`.
pub fn achievement_bonus(unlock_count: usize) -> f64 {
    (10 + unlock_count * BONUS_TENTHS_PER_UNLOCK) as f64 / 10.0
}

/// Global multiplier granted by prestige: `1 + level`.
pub fn prestige_multiplier(prestige_level: u32) -> f64 {
    1.0 + f64::from(prestige_level)
}

/// Sum of `owned * base_rate` over ordinary producers, before bonuses.
pub fn raw_production(catalog: &Catalog, state: &GameState) -> f64 {
    catalog
        .ordinary_producers()
        .map(|p| f64::from(state.owned(&p.id)) * p.base_rate)
        .sum()
}

/// Bananas per second before the prestige multiplier.
pub fn production_rate(catalog: &Catalog, state: &GameState) -> f64 {
    raw_production(catalog, state) * achievement_bonus(state.unlock_count())
}

/// Bananas per second actually accrued, including the prestige multiplier.
pub fn effective_rate(catalog: &Catalog, state: &GameState) -> f64 {
    production_rate(catalog, state) * prestige_multiplier(state.run.prestige_level)
}

/// Bananas accrued over `dt_seconds` at the given rate.
pub fn tick_delta(production_rate: f64, prestige_level: u32, dt_seconds: f64) -> f64 {
    production_rate * prestige_multiplier(prestige_level) * dt_seconds
}

/// Unfloored price of the next single unit given `owned` units.
pub fn unit_price(producer: &ProducerDef, owned: u32) -> f64 {
    producer.base_cost * COST_GROWTH.powf(f64::from(owned))
}

/// Capstone price at a prestige level: `base * 14^level`.
pub fn capstone_cost(producer: &ProducerDef, prestige_level: u32) -> f64 {
    producer.base_cost * CAPSTONE_GROWTH.powf(f64::from(prestige_level))
}

/// Cost of buying `quantity` units on top of `owned`.
///
/// Ordinary producers follow a geometric series with ratio 1.15:
/// `floor(base * 1.15^owned * (1.15^q - 1) / 0.15)`, which equals the sum of
/// the successive unfloored unit prices. The capstone ignores `quantity` and
/// `owned` and costs `base * 14^prestige_level`.
pub fn bulk_cost(producer: &ProducerDef, owned: u32, quantity: u32, prestige_level: u32) -> f64 {
    if producer.capstone {
        return capstone_cost(producer, prestige_level);
    }
    if quantity == 0 {
        return 0.0;
    }
    let series = (COST_GROWTH.powf(f64::from(quantity)) - 1.0) / (COST_GROWTH - 1.0);
    floor_tolerant(unit_price(producer, owned) * series)
}

/// Largest quantity whose bulk cost fits in `current`.
///
/// Solves the geometric series in closed form, then nudges the estimate so
/// that `bulk_cost(n) <= current < bulk_cost(n + 1)` holds exactly. The
/// capstone yields 1 when affordable, else 0.
pub fn max_affordable(producer: &ProducerDef, owned: u32, current: f64, prestige_level: u32) -> u32 {
    if producer.capstone {
        return u32::from(current >= capstone_cost(producer, prestige_level));
    }
    if !current.is_finite() || current <= 0.0 {
        return 0;
    }
    let first = unit_price(producer, owned);
    let estimate = ((current * (COST_GROWTH - 1.0) / first + 1.0).ln() / COST_GROWTH.ln()).floor();
    let mut n = if estimate.is_finite() && estimate > 0.0 {
        estimate.min(f64::from(u32::MAX - 1)) as u32
    } else {
        0
    };
    let cost = |q: u32| bulk_cost(producer, owned, q, prestige_level);
    while n > 0 && cost(n) > current {
        n -= 1;
    }
    while n < u32::MAX - 1 && cost(n + 1) <= current {
        n += 1;
    }
    n
}

/// Bananas granted by one click.
///
/// `(1 * product(multipliers) * achievement_bonus + 0.05 * production_rate)
/// * (1 + prestige_level)`. The achievement bonus is already inside
/// `production_rate` and is applied again to the base click.
pub fn click_yield<I>(
    upgrade_multipliers: I,
    production_rate: f64,
    prestige_level: u32,
    achievement_bonus: f64,
) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let multiplier: f64 = upgrade_multipliers.into_iter().product();
    (multiplier * achievement_bonus + production_rate * CLICK_RATE_SHARE)
        * prestige_multiplier(prestige_level)
}

/// Click yield for the current state.
pub fn click_value(catalog: &Catalog, state: &GameState) -> f64 {
    let multipliers = catalog
        .upgrades
        .iter()
        .filter(|u| state.owns_upgrade(&u.id))
        .map(|u| u.multiplier);
    click_yield(
        multipliers,
        production_rate(catalog, state),
        state.run.prestige_level,
        achievement_bonus(state.unlock_count()),
    )
}

/// Store buy-mode selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuyAmount {
    One,
    Ten,
    Hundred,
    Max,
}

/// Price quote for a producer under a buy mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quote {
    pub quantity: u32,
    pub cost: f64,
    pub affordable: bool,
}

/// Quote a purchase. `Max` falls back to a single unit (unaffordable) when
/// nothing fits; the capstone always quotes one unit.
pub fn quote(
    producer: &ProducerDef,
    owned: u32,
    amount: BuyAmount,
    current: f64,
    prestige_level: u32,
) -> Quote {
    let quantity = if producer.capstone {
        1
    } else {
        match amount {
            BuyAmount::One => 1,
            BuyAmount::Ten => 10,
            BuyAmount::Hundred => 100,
            BuyAmount::Max => max_affordable(producer, owned, current, prestige_level).max(1),
        }
    };
    let cost = bulk_cost(producer, owned, quantity, prestige_level);
    Quote {
        quantity,
        cost,
        affordable: current >= cost,
    }
}

/// What the next rebirth offers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RebirthPreview {
    pub prestige_level: u32,
    pub current_multiplier: f64,
    pub next_multiplier: f64,
    /// Capstone price in the current run.
    pub capstone_cost: f64,
}

pub fn rebirth_preview(capstone: &ProducerDef, prestige_level: u32) -> RebirthPreview {
    RebirthPreview {
        prestige_level,
        current_multiplier: prestige_multiplier(prestige_level),
        next_multiplier: prestige_multiplier(prestige_level + 1),
        capstone_cost: capstone_cost(capstone, prestige_level),
    }
}
