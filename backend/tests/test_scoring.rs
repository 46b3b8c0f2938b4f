//! Scoring Engine Tests
//!
//! Critical invariants tested:
//! - CAGR annualizes over 52 weeks
//! - MaxDrawdown always in [0, 1], zero for non-decreasing curves
//! - Sharpe is 0 (not NaN, not an error) for zero-volatility curves
//! - Grades are monotonic with fixed inclusive thresholds
//! - Scoring is idempotent

use sector_sim_core_rs::orchestrator::{Orchestrator, SeasonConfig};
use sector_sim_core_rs::scoring::{
    annualized_volatility, cagr, composite_score, drawdown_series, max_drawdown, sharpe_ratio,
    weekly_returns, LetterGrade, ScoreCard, GRADE_A, GRADE_A_PLUS, GRADE_B, GRADE_C, GRADE_D,
    ROLLING_WINDOW,
};
use sector_sim_core_rs::{Allocation, MacroState, ReturnModel, RngManager, Sector, SectorReturns};

// ============================================================================
// Test Helpers
// ============================================================================

/// Same return for every sector, every week
struct ConstantReturns(f64);

impl ReturnModel for ConstantReturns {
    fn generate(&self, _state: &MacroState, _rng: &mut RngManager) -> SectorReturns {
        SectorReturns::new([self.0; Sector::COUNT])
    }
}

/// Alternating +r / -r
struct Alternating(f64);

impl ReturnModel for Alternating {
    fn generate(&self, _state: &MacroState, rng: &mut RngManager) -> SectorReturns {
        // Parity of one draw decides the sign
        let sign = if rng.next() % 2 == 0 { 1.0 } else { -1.0 };
        SectorReturns::new([sign * self.0; Sector::COUNT])
    }
}

fn quiet_config(weeks: usize) -> SeasonConfig {
    let mut config = SeasonConfig::new(42);
    config.weeks = weeks;
    config.shock_probability = 0.0;
    config
}

fn play_season(model: Box<dyn ReturnModel>, weeks: usize) -> Orchestrator {
    let mut orch = Orchestrator::new(quiet_config(weeks))
        .unwrap()
        .with_return_model(model)
        .unwrap();
    while !orch.is_complete() {
        orch.play_week(Allocation::equal_weight()).unwrap();
    }
    orch
}

// ============================================================================
// Metric functions
// ============================================================================

#[test]
fn test_cagr_examples() {
    assert!((cagr(1_000_000.0, 1_100_000.0, 52) - 0.10).abs() < 1e-12);
    assert!((cagr(1_000_000.0, 1_000_000.0 * 1.01f64.powi(26), 26) - (1.01f64.powi(52) - 1.0)).abs() < 1e-9);
    assert!(cagr(1_000_000.0, 900_000.0, 26) < 0.0);
}

#[test]
fn test_drawdown_bounds() {
    let curves: [&[f64]; 4] = [
        &[100.0, 101.0, 102.0, 102.0, 150.0],
        &[100.0, 50.0, 25.0, 1.0],
        &[100.0, 120.0, 60.0, 130.0, 65.0],
        &[100.0],
    ];
    for values in curves {
        let dd = max_drawdown(values);
        assert!((0.0..=1.0).contains(&dd), "drawdown {}", dd);
        assert!(drawdown_series(values).iter().all(|d| (0.0..=1.0).contains(d)));
    }

    assert_eq!(max_drawdown(curves[0]), 0.0);
    assert!((max_drawdown(curves[1]) - 0.99).abs() < 1e-12);
    assert!((max_drawdown(curves[2]) - 0.5).abs() < 1e-12);
}

#[test]
fn test_drawdown_uses_running_peak_not_global_peak() {
    // Later peak of 200 must not create a drawdown for earlier points
    let series = drawdown_series(&[100.0, 90.0, 200.0, 150.0]);
    assert!((series[1] - 0.10).abs() < 1e-12);
    assert!((series[3] - 0.25).abs() < 1e-12);
}

#[test]
fn test_sharpe_examples() {
    let returns = [0.01, -0.005, 0.02, 0.0, 0.015];
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let expected = (mean * 52.0 - 0.02) / annualized_volatility(&returns);
    assert!((sharpe_ratio(&returns, 0.02) - expected).abs() < 1e-12);

    assert_eq!(sharpe_ratio(&[0.0; 10], 0.0), 0.0);
}

#[test]
fn test_grade_thresholds_are_inclusive() {
    let cases = [
        (GRADE_A_PLUS, LetterGrade::APlus),
        (GRADE_A, LetterGrade::A),
        (GRADE_B, LetterGrade::B),
        (GRADE_C, LetterGrade::C),
        (GRADE_D, LetterGrade::D),
    ];
    for (threshold, grade) in cases {
        assert_eq!(LetterGrade::from_composite(threshold), grade);
        assert!(LetterGrade::from_composite(threshold - 1e-9) < grade);
    }
    assert_eq!(LetterGrade::from_composite(-5.0), LetterGrade::F);
}

#[test]
fn test_composite_blend() {
    // Sharpe 2, CAGR 20% => 1.5 + 0.5
    assert!((composite_score(2.0, 0.20) - 2.0).abs() < 1e-12);
    // CAGR term capped at -2
    assert!((composite_score(0.0, -0.9) + 0.5).abs() < 1e-12);
}

// ============================================================================
// ScoreCard over a played season
// ============================================================================

#[test]
fn test_zero_return_season() {
    let orch = play_season(Box::new(ConstantReturns(0.0)), 26);
    let card = orch.scorecard().unwrap();

    assert_eq!(card.weeks, 26);
    assert_eq!(card.final_value, card.initial_value);
    assert_eq!(card.cagr, 0.0);
    assert_eq!(card.max_drawdown, 0.0);
    assert_eq!(card.annualized_volatility, 0.0);
    assert_eq!(card.sharpe_ratio, 0.0);
    assert_eq!(card.grade, LetterGrade::D);
}

#[test]
fn test_constant_gain_season() {
    let orch = play_season(Box::new(ConstantReturns(0.01)), 10);
    let card = orch.scorecard().unwrap();

    assert!((card.total_return - (1.01f64.powi(10) - 1.0)).abs() < 1e-9);
    assert!((card.cagr - (1.01f64.powi(52) - 1.0)).abs() < 1e-9);
    assert_eq!(card.max_drawdown, 0.0);
    // Flat weekly returns: volatility ~0, Sharpe falls back to 0
    assert!(card.annualized_volatility < 1e-10);
    assert_eq!(card.sharpe_ratio, 0.0);
}

#[test]
fn test_scorecard_is_idempotent() {
    let orch = play_season(Box::new(Alternating(0.03)), 26);
    let first = orch.scorecard().unwrap();
    let second = orch.scorecard().unwrap();
    assert_eq!(first, second);

    let direct = ScoreCard::compute(orch.curve(), orch.config().risk_free_rate).unwrap();
    assert_eq!(first, direct);
    assert!(first.annualized_volatility > 0.0);
    assert!((0.0..=1.0).contains(&first.max_drawdown));
}

#[test]
fn test_scorecard_matches_metric_functions() {
    let orch = play_season(Box::new(Alternating(0.02)), 12);
    let card = orch.scorecard().unwrap();
    let values = orch.curve().values();
    let returns = weekly_returns(&values);

    assert_eq!(card.max_drawdown, max_drawdown(&values));
    assert_eq!(card.annualized_volatility, annualized_volatility(&returns));
    assert_eq!(card.sharpe_ratio, sharpe_ratio(&returns, 0.0));
    assert_eq!(card.grade, LetterGrade::from_composite(card.composite));
}

#[test]
fn test_analytics_series_lengths() {
    let orch = play_season(Box::new(Alternating(0.02)), 8);
    let analytics = orch.analytics();

    let weeks = orch.curve().len();

    assert_eq!(weeks, 8);
    assert_eq!(analytics.weekly_returns.len(), weeks);
    assert_eq!(analytics.drawdowns.len(), weeks);
    assert_eq!(analytics.rolling_volatility.len(), weeks);
    assert_eq!(analytics.rolling_sharpe.len(), weeks);
    assert_eq!(analytics.concentration.len(), weeks);
    assert!(analytics.concentration.iter().all(|c| (c - 0.2).abs() < 1e-12));

    // Week i's drawdown matches the curve point
    for (point, dd) in orch.curve().points().iter().zip(&analytics.drawdowns) {
        let peak = orch.curve().values()[..=point.week]
            .iter()
            .cloned()
            .fold(f64::MIN, f64::max);
        assert!((dd - (peak - point.value) / peak).abs() < 1e-12);
    }

    let window = ROLLING_WINDOW.min(weeks);
    assert_eq!(
        analytics.rolling_volatility[weeks - 1],
        annualized_volatility(&analytics.weekly_returns[weeks - window..])
    );
}

#[test]
fn test_short_season_has_rolling_analytics() {
    let orch = play_season(Box::new(Alternating(0.02)), 3);
    let analytics = orch.analytics();

    assert_eq!(analytics.rolling_volatility.len(), 3);
    assert_eq!(analytics.rolling_sharpe.len(), 3);
    assert_eq!(analytics.drawdowns.len(), 3);
    assert_eq!(analytics.rolling_volatility[0], 0.0);
}

#[test]
fn test_scorecard_json_round_trip() {
    let orch = play_season(Box::new(Alternating(0.02)), 4);
    let card = orch.scorecard().unwrap();
    let json = serde_json::to_string(&card).unwrap();
    let back: ScoreCard = serde_json::from_str(&json).unwrap();
    assert_eq!(card, back);
}
