//! Competition Tests
//!
//! Critical invariants tested:
//! - The rival never changes the player's season (separate RNG)
//! - The rival faces the same adjusted returns as the player
//! - The rival's curve is scored like the player's and reaches the record
//! - Rival decisions are reproducible per seed

use sector_sim_core_rs::competition::{RivalPortfolio, RivalStrategy, RIVAL_SEED_SALT};
use sector_sim_core_rs::orchestrator::{Orchestrator, SeasonConfig};
use sector_sim_core_rs::scoring::ScoreCard;
use sector_sim_core_rs::{Allocation, MacroState, RngManager, Sector};

// ============================================================================
// Test Helpers
// ============================================================================

fn config(seed: u64, weeks: usize, rival: Option<RivalStrategy>) -> SeasonConfig {
    let mut config = SeasonConfig::new(seed);
    config.weeks = weeks;
    config.rival = rival;
    config
}

fn run(config: SeasonConfig) -> Orchestrator {
    let mut orch = Orchestrator::new(config).unwrap();
    while !orch.is_complete() {
        orch.play_week(Allocation::concentrated(Sector::Tech)).unwrap();
    }
    orch
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn test_rival_does_not_change_player_season() {
    let solo = run(config(42, 10, None));
    assert!(solo.rival().is_none());

    for strategy in RivalStrategy::ALL {
        let with_rival = run(config(42, 10, Some(strategy)));
        assert_eq!(with_rival.curve(), solo.curve(), "{}", strategy);
        assert_eq!(with_rival.rng_state(), solo.rng_state());
        assert_eq!(with_rival.event_log(), solo.event_log());
    }
}

#[test]
fn test_rival_faces_player_returns() {
    let mut orch = Orchestrator::new(config(7, 6, Some(RivalStrategy::MacroTimer))).unwrap();
    let mut previous_value = 1_000_000.0;

    while !orch.is_complete() {
        let report = orch.play_week(Allocation::equal_weight()).unwrap();
        let rival = report.rival.clone().unwrap();
        assert_eq!(rival.week, report.week);
        assert_eq!(rival.name, "Regime Alpha Partners");
        rival.allocation.validate().unwrap();

        let expected: f64 = rival
            .allocation
            .contributions(&report.adjusted_returns)
            .values()
            .iter()
            .sum();
        assert_eq!(rival.portfolio_return, expected);
        assert_eq!(rival.value, previous_value * (1.0 + expected));
        previous_value = rival.value;
    }

    let rival_curve = orch.rival().unwrap().curve();
    for (player, rival) in orch.curve().points().iter().zip(rival_curve.points()) {
        assert_eq!(player.adjusted_returns, rival.adjusted_returns);
        assert_eq!(player.macro_state, rival.macro_state);
    }
}

#[test]
fn test_rival_decides_before_seeing_the_week() {
    for seed in [1, 2, 3] {
        let orch = run(config(seed, 2, Some(RivalStrategy::Defensive)));
        let points = orch.rival().unwrap().curve().points();

        // Week 1: initial state, no history, fresh rival RNG
        let mut rng = RngManager::new(seed ^ RIVAL_SEED_SALT);
        let week_1 = RivalStrategy::Defensive.decide(&MacroState::initial(), &[], &mut rng);
        assert_eq!(points[0].allocation, week_1);

        // Week 2: week 1's state and returns only
        let week_2 = RivalStrategy::Defensive.decide(
            &points[0].macro_state,
            &[points[0].adjusted_returns],
            &mut rng,
        );
        assert_eq!(points[1].allocation, week_2);
    }
}

// ============================================================================
// Scoring and records
// ============================================================================

#[test]
fn test_rival_scored_and_recorded() {
    let orch = run(config(99, 8, Some(RivalStrategy::Value)));
    let record = orch.season_record();
    let rival = record.rival.clone().unwrap();

    assert_eq!(rival.strategy, RivalStrategy::Value);
    assert_eq!(rival.name, "Contrarian Capital");
    assert_eq!(rival.curve.len(), 8);
    assert_eq!(
        rival.scorecard.unwrap(),
        ScoreCard::compute(&rival.curve, orch.config().risk_free_rate).unwrap()
    );

    let json = serde_json::to_string(&record).unwrap();
    let back: sector_sim_core_rs::SeasonRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.rival, record.rival);
}

#[test]
fn test_solo_record_has_no_rival() {
    let orch = run(config(99, 2, None));
    assert!(orch.season_record().rival.is_none());
}

#[test]
fn test_rival_is_reproducible() {
    let a = run(config(5, 12, Some(RivalStrategy::Momentum)));
    let b = run(config(5, 12, Some(RivalStrategy::Momentum)));
    assert_eq!(a.rival(), b.rival());

    let other_seed = run(config(6, 12, Some(RivalStrategy::Momentum)));
    assert_ne!(a.rival().unwrap().curve(), other_seed.rival().unwrap().curve());
}

#[test]
fn test_fresh_rival_starts_at_starting_value() {
    let rival = RivalPortfolio::new(RivalStrategy::Defensive, 3, 250_000.0);
    assert_eq!(rival.current_value(), 250_000.0);
    assert!(rival.curve().is_empty());
    assert!(rival.scorecard(0.0).is_err());
}
