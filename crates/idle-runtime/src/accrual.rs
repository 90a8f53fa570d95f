use idle_core::{Catalog, GameState};
use idle_econ::{production_rate, tick_delta};

/// Apply `dt_seconds` of passive production. Returns the amount credited.
pub fn accrue(catalog: &Catalog, state: &mut GameState, dt_seconds: f64) -> f64 {
    let delta = tick_delta(
        production_rate(catalog, state),
        state.run.prestige_level,
        dt_seconds,
    );
    if delta > 0.0 {
        state.earn(delta);
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::{default_catalog, ProducerId};

    #[test]
    fn ten_ticks_make_one_second() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        state.producers.insert(ProducerId::new("banana_tree"), 2);
        for _ in 0..10 {
            accrue(&catalog, &mut state, 0.1);
        }
        assert!((state.run.current - 2.0).abs() < 1e-9);
        assert!((state.run.cumulative - 2.0).abs() < 1e-9);
    }

    #[test]
    fn nothing_owned_accrues_nothing() {
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        assert_eq!(accrue(&catalog, &mut state, 0.1), 0.0);
        assert_eq!(state.run.cumulative, 0.0);
    }
}
