//! Scoring engine
//!
//! Pure functions over an equity curve. Nothing here holds state, so scoring
//! the same curve twice always gives the same [`ScoreCard`].
//!
//! Degenerate inputs return sentinels instead of dividing by zero:
//! - fewer than two weekly returns: volatility 0
//! - volatility below [`MIN_VOLATILITY`]: Sharpe 0
//! - no completed weeks: CAGR 0, drawdown 0
//!
//! Only [`ScoreCard::compute`] refuses an empty curve, since a grade for a
//! season that never started is meaningless.

use crate::models::allocation::Allocation;
use crate::models::equity::EquityCurve;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Annualization base
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Below this annualized volatility, Sharpe is reported as 0
pub const MIN_VOLATILITY: f64 = 1e-10;

/// Window used by the rolling analytics
pub const ROLLING_WINDOW: usize = 4;

/// Weight of Sharpe in the composite score
pub const SHARPE_WEIGHT: f64 = 0.75;
/// Weight of the CAGR term in the composite score
pub const CAGR_WEIGHT: f64 = 0.25;
/// CAGR that scores 1.0 in the composite
pub const CAGR_BENCHMARK: f64 = 0.10;
/// Cap on the CAGR term, both signs
pub const CAGR_TERM_LIMIT: f64 = 2.0;

/// Minimum composite score per grade
pub const GRADE_A_PLUS: f64 = 3.0;
pub const GRADE_A: f64 = 2.0;
pub const GRADE_B: f64 = 1.5;
pub const GRADE_C: f64 = 0.8;
pub const GRADE_D: f64 = 0.0;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error("Cannot score an empty equity curve")]
    EmptyCurve,

    #[error("Initial value must be positive, got {0}")]
    InvalidInitialValue(f64),
}

/// Week-over-week returns of a value series
pub fn weekly_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|pair| {
            if pair[0] > 0.0 {
                pair[1] / pair[0] - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Compound annual growth rate over `weeks` weeks
pub fn cagr(initial_value: f64, final_value: f64, weeks: usize) -> f64 {
    if weeks == 0 || initial_value <= 0.0 {
        return 0.0;
    }
    if final_value <= 0.0 {
        return -1.0;
    }
    (final_value / initial_value).powf(WEEKS_PER_YEAR / weeks as f64) - 1.0
}

/// Largest peak-to-trough decline, as a fraction in [0, 1]
pub fn max_drawdown(values: &[f64]) -> f64 {
    drawdown_series(values)
        .into_iter()
        .fold(0.0, f64::max)
}

/// Drawdown from the running peak at each point
pub fn drawdown_series(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            if peak > 0.0 {
                ((peak - value) / peak).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1)
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Sample stdev of weekly returns times sqrt(52)
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    sample_std_dev(returns) * WEEKS_PER_YEAR.sqrt()
}

/// (mean weekly return × 52 − risk-free rate) / annualized volatility
///
/// 0 when volatility is below [`MIN_VOLATILITY`].
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let volatility = annualized_volatility(returns);
    if volatility < MIN_VOLATILITY {
        return 0.0;
    }
    (mean(returns) * WEEKS_PER_YEAR - risk_free_rate) / volatility
}

/// Blend of Sharpe and benchmark-relative CAGR used for grading
pub fn composite_score(sharpe: f64, cagr: f64) -> f64 {
    let cagr_term = (cagr / CAGR_BENCHMARK).clamp(-CAGR_TERM_LIMIT, CAGR_TERM_LIMIT);
    SHARPE_WEIGHT * sharpe + CAGR_WEIGHT * cagr_term
}

/// Trailing segment ending at each index, at most `window` long
///
/// The first segments are shorter than `window`.
fn trailing_windows(returns: &[f64], window: usize) -> impl Iterator<Item = &[f64]> + '_ {
    (0..returns.len()).map(move |i| &returns[(i + 1).saturating_sub(window)..=i])
}

/// Annualized volatility over the trailing `window`, one value per week
///
/// Weeks whose segment holds fewer than two returns get 0. A zero `window`
/// gives an empty series.
pub fn rolling_volatility(returns: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    trailing_windows(returns, window)
        .map(annualized_volatility)
        .collect()
}

/// Sharpe ratio over the trailing `window`, one value per week
pub fn rolling_sharpe(returns: &[f64], window: usize, risk_free_rate: f64) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    trailing_windows(returns, window)
        .map(|w| sharpe_ratio(w, risk_free_rate))
        .collect()
}

/// Herfindahl-Hirschman index of an allocation
///
/// 0.2 for equal weights across five sectors, 1.0 for a single sector.
pub fn concentration(allocation: &Allocation) -> f64 {
    allocation.weights().iter().map(|w| w * w).sum()
}

/// Season grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl LetterGrade {
    /// Monotonic in `composite`; each threshold is inclusive
    pub fn from_composite(composite: f64) -> Self {
        if composite >= GRADE_A_PLUS {
            LetterGrade::APlus
        } else if composite >= GRADE_A {
            LetterGrade::A
        } else if composite >= GRADE_B {
            LetterGrade::B
        } else if composite >= GRADE_C {
            LetterGrade::C
        } else if composite >= GRADE_D {
            LetterGrade::D
        } else {
            // NaN lands here too
            LetterGrade::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season performance summary
///
/// Derived data only; recompute it from the curve whenever needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub initial_value: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub weeks: usize,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub composite: f64,
    pub grade: LetterGrade,
}

impl ScoreCard {
    pub fn compute(curve: &EquityCurve, risk_free_rate: f64) -> Result<Self, ScoringError> {
        if curve.is_empty() {
            return Err(ScoringError::EmptyCurve);
        }
        let initial_value = curve.initial_value();
        if initial_value.is_nan() || initial_value <= 0.0 {
            return Err(ScoringError::InvalidInitialValue(initial_value));
        }

        let values = curve.values();
        let returns = weekly_returns(&values);
        let final_value = curve.current_value();
        let weeks = curve.len();

        let cagr = cagr(initial_value, final_value, weeks);
        let sharpe = sharpe_ratio(&returns, risk_free_rate);
        let composite = composite_score(sharpe, cagr);

        Ok(Self {
            initial_value,
            final_value,
            total_return: final_value / initial_value - 1.0,
            weeks,
            cagr,
            max_drawdown: max_drawdown(&values),
            annualized_volatility: annualized_volatility(&returns),
            sharpe_ratio: sharpe,
            composite,
            grade: LetterGrade::from_composite(composite),
        })
    }
}

/// Per-week analytics series for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
///
/// Every series holds one entry per completed week, index `i` being week
/// `i + 1`.
pub struct SeasonAnalytics {
    pub weekly_returns: Vec<f64>,
    /// Drawdown from peak at the end of each week
    pub drawdowns: Vec<f64>,
    pub rolling_volatility: Vec<f64>,
    pub rolling_sharpe: Vec<f64>,
    /// Allocation concentration per week
    pub concentration: Vec<f64>,
}

impl SeasonAnalytics {
    pub fn compute(curve: &EquityCurve, risk_free_rate: f64) -> Self {
        let values = curve.values();
        let returns = weekly_returns(&values);
        Self {
            rolling_volatility: rolling_volatility(&returns, ROLLING_WINDOW),
            rolling_sharpe: rolling_sharpe(&returns, ROLLING_WINDOW, risk_free_rate),
            drawdowns: drawdown_series(&values).into_iter().skip(1).collect(),
            concentration: curve
                .points()
                .iter()
                .map(|p| concentration(&p.allocation))
                .collect(),
            weekly_returns: returns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::market::Sector;

    #[test]
    fn test_weekly_returns() {
        let r = weekly_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
        assert!(weekly_returns(&[100.0]).is_empty());
    }

    #[test]
    fn test_cagr_annualizes_over_52_weeks() {
        assert!((cagr(100.0, 110.0, 52) - 0.10).abs() < 1e-12);
        assert!((cagr(100.0, 110.0, 26) - 0.21).abs() < 1e-12);
        assert_eq!(cagr(100.0, 100.0, 13), 0.0);
        assert_eq!(cagr(100.0, 150.0, 0), 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let dd = max_drawdown(&[100.0, 110.0, 105.0, 120.0, 100.0, 115.0]);
        assert!((dd - 20.0 / 120.0).abs() < 1e-12);
        assert_eq!(max_drawdown(&[100.0, 100.0, 101.0, 130.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_volatility_needs_two_returns() {
        assert_eq!(annualized_volatility(&[]), 0.0);
        assert_eq!(annualized_volatility(&[0.05]), 0.0);

        // Sample stdev of [0.01, -0.01] is sqrt(0.0002)
        let vol = annualized_volatility(&[0.01, -0.01]);
        assert!((vol - 0.0002f64.sqrt() * 52f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_zero_volatility_sentinel() {
        assert_eq!(sharpe_ratio(&[0.0, 0.0, 0.0], 0.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.02), 0.0);
        assert_eq!(sharpe_ratio(&[], 0.0), 0.0);
    }

    #[test]
    fn test_sharpe_sign() {
        assert!(sharpe_ratio(&[0.02, 0.01, 0.03, 0.0], 0.0) > 0.0);
        assert!(sharpe_ratio(&[-0.02, -0.01, -0.03, 0.0], 0.0) < 0.0);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(LetterGrade::from_composite(3.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_composite(2.999), LetterGrade::A);
        assert_eq!(LetterGrade::from_composite(2.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_composite(1.999), LetterGrade::B);
        assert_eq!(LetterGrade::from_composite(1.5), LetterGrade::B);
        assert_eq!(LetterGrade::from_composite(1.499), LetterGrade::C);
        assert_eq!(LetterGrade::from_composite(0.8), LetterGrade::C);
        assert_eq!(LetterGrade::from_composite(0.799), LetterGrade::D);
        assert_eq!(LetterGrade::from_composite(0.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_composite(-0.001), LetterGrade::F);
        assert_eq!(LetterGrade::from_composite(f64::NAN), LetterGrade::F);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let mut previous = LetterGrade::F;
        for i in -100..=400 {
            let grade = LetterGrade::from_composite(i as f64 / 100.0);
            assert!(grade >= previous);
            previous = grade;
        }
    }

    #[test]
    fn test_composite_caps_cagr_term() {
        assert!((composite_score(0.0, 10.0) - CAGR_WEIGHT * CAGR_TERM_LIMIT).abs() < 1e-12);
        assert!((composite_score(1.0, 0.10) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&LetterGrade::APlus).unwrap(), "\"A+\"");
        assert_eq!(LetterGrade::B.to_string(), "B");
    }

    #[test]
    fn test_empty_curve_is_rejected() {
        let curve = EquityCurve::new(1_000_000.0);
        assert_eq!(ScoreCard::compute(&curve, 0.0), Err(ScoringError::EmptyCurve));
    }

    #[test]
    fn test_rolling_windows() {
        let returns = [0.01, 0.02, -0.01, 0.0, 0.03, -0.02];
        let vol = rolling_volatility(&returns, 4);
        let sharpe = rolling_sharpe(&returns, 4, 0.0);
        assert_eq!(vol.len(), returns.len());
        assert_eq!(sharpe.len(), returns.len());

        // Single-return segment
        assert_eq!(vol[0], 0.0);
        assert_eq!(sharpe[0], 0.0);

        // Short segment at the start, then full trailing windows
        assert_eq!(vol[1], annualized_volatility(&returns[..2]));
        assert_eq!(vol[2], annualized_volatility(&returns[..3]));
        assert_eq!(vol[5], annualized_volatility(&returns[2..6]));
        assert_eq!(sharpe[4], sharpe_ratio(&returns[1..5], 0.0));

        assert_eq!(rolling_volatility(&returns[..3], 4).len(), 3);
        assert!(rolling_volatility(&[], 4).is_empty());
        assert!(rolling_volatility(&returns, 0).is_empty());
    }

    #[test]
    fn test_concentration() {
        assert!((concentration(&Allocation::equal_weight()) - 0.2).abs() < 1e-12);
        assert_eq!(concentration(&Allocation::concentrated(Sector::Energy)), 1.0);
    }
}
