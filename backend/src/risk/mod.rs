//! Risk committee
//!
//! After each week resolves, the orchestrator hands a read-only
//! [`WeekSnapshot`] to a [`RiskCommittee`]. The returned [`Assessment`] is for
//! display and logging; nothing in it flows back into the engine.
//!
//! # Committee Interface
//!
//! ```rust
//! use sector_sim_core_rs::risk::{Assessment, RiskCommittee, WeekSnapshot};
//!
//! struct AlwaysCalm;
//!
//! impl RiskCommittee for AlwaysCalm {
//!     fn assess(&mut self, _snapshot: &WeekSnapshot) -> Assessment {
//!         Assessment::new(1, Vec::new())
//!     }
//! }
//! ```
//!
//! [`RulesBasedCommittee`] is the built-in implementation. Anything else
//! (a model-backed reviewer, a scripted test double) plugs in through the
//! same trait.

use crate::market::shocks::ShockEvent;
use crate::models::allocation::Allocation;
use crate::models::market::{MacroState, RateDirection, Regime, Sector, SectorReturns};
use serde::{Deserialize, Serialize};

pub const MIN_RISK_SCORE: u8 = 1;
pub const MAX_RISK_SCORE: u8 = 10;

/// What a committee gets to see after a week resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSnapshot {
    pub week: usize,
    pub total_weeks: usize,
    pub macro_state: MacroState,
    /// Returns the portfolio actually earned (after any shock)
    pub returns: SectorReturns,
    pub shock: Option<ShockEvent>,
    pub allocation: Allocation,
    pub value: f64,
    pub peak_value: f64,
    /// Decline from peak, non-negative fraction
    pub drawdown: f64,
}

/// Committee verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// 1 (prudent) ..= 10 (alarming)
    pub risk_score: u8,
    pub critique: String,
    pub warnings: Vec<String>,
}

impl Assessment {
    /// Clamps the score and builds the standard critique text
    pub fn new(risk_score: u8, warnings: Vec<String>) -> Self {
        let risk_score = risk_score.clamp(MIN_RISK_SCORE, MAX_RISK_SCORE);
        let tone = match risk_score {
            1..=3 => "The committee finds your allocation prudent.",
            4..=6 => "The committee has some concerns about your positioning.",
            7..=8 => "The committee strongly advises reconsidering this allocation.",
            _ => "The committee is alarmed by this allocation's risk profile.",
        };

        let mut parts = vec![tone.to_string()];
        parts.extend(warnings.iter().cloned());
        parts.push(format!("Overall risk assessment: {}/10.", risk_score));

        Self {
            risk_score,
            critique: parts.join(" "),
            warnings,
        }
    }
}

/// Capability to review a resolved week
pub trait RiskCommittee: Send + Sync {
    fn assess(&mut self, snapshot: &WeekSnapshot) -> Assessment;
}

/// Threshold rules over the snapshot
///
/// Rules, each adding to a base score of 1:
/// 1. Concentration: any sector above 60% (+3) or 40% (+2)
/// 2. Regime alignment: cyclicals above 60% during a recession (+2)
/// 3. Volatility exposure: any sector above 35% in High/Crisis volatility (+1)
/// 4. Rate sensitivity: Tech above 35% while rates rise (+1)
/// 5. Drawdown proximity: more than 15% below peak (+1)
/// 6. Diversification: no sector above 30% (−1, floor 1)
#[derive(Debug, Clone)]
pub struct RulesBasedCommittee {
    pub extreme_concentration: f64,
    pub high_concentration: f64,
    pub recession_cyclical_limit: f64,
    pub stressed_weight_limit: f64,
    pub rising_rate_tech_limit: f64,
    pub drawdown_alert: f64,
    pub diversified_limit: f64,
}

impl Default for RulesBasedCommittee {
    fn default() -> Self {
        Self {
            extreme_concentration: 0.60,
            high_concentration: 0.40,
            recession_cyclical_limit: 0.60,
            stressed_weight_limit: 0.35,
            rising_rate_tech_limit: 0.35,
            drawdown_alert: 0.15,
            diversified_limit: 0.30,
        }
    }
}

impl RulesBasedCommittee {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RiskCommittee for RulesBasedCommittee {
    fn assess(&mut self, snapshot: &WeekSnapshot) -> Assessment {
        let allocation = &snapshot.allocation;
        let state = &snapshot.macro_state;
        let mut score: i32 = 1;
        let mut warnings = Vec::new();

        for (sector, weight) in allocation.iter() {
            if weight > self.extreme_concentration {
                score += 3;
                warnings.push(format!(
                    "CRITICAL: {} at {:.0}% -- extreme concentration.",
                    sector,
                    weight * 100.0
                ));
            } else if weight > self.high_concentration {
                score += 2;
                warnings.push(format!(
                    "WARNING: {} at {:.0}% -- high concentration.",
                    sector,
                    weight * 100.0
                ));
            }
        }

        let cyclical: f64 = Sector::ALL
            .into_iter()
            .filter(|s| s.is_cyclical())
            .map(|s| allocation.weight(s))
            .sum();
        if state.regime == Regime::Recession && cyclical > self.recession_cyclical_limit {
            score += 2;
            warnings.push(format!(
                "Cyclical exposure ({:.0}%) is high for a recession regime.",
                cyclical * 100.0
            ));
        }

        if state.volatility.is_stressed() && allocation.max_weight() > self.stressed_weight_limit {
            score += 1;
            warnings.push("High volatility environment -- consider diversifying.".to_string());
        }

        let tech = allocation.weight(Sector::Tech);
        if state.rate_direction == RateDirection::Rising && tech > self.rising_rate_tech_limit {
            score += 1;
            warnings.push(format!(
                "Heavy tech ({:.0}%) during rising rates increases sensitivity.",
                tech * 100.0
            ));
        }

        if snapshot.drawdown > self.drawdown_alert {
            score += 1;
            warnings.push(format!(
                "Portfolio is {:.1}% below peak -- consider defensive positioning.",
                snapshot.drawdown * 100.0
            ));
        }

        if allocation.max_weight() <= self.diversified_limit {
            score = (score - 1).max(1);
        }

        let score = score.clamp(MIN_RISK_SCORE as i32, MAX_RISK_SCORE as i32) as u8;
        Assessment::new(score, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::market::VolatilityLevel;

    fn snapshot(allocation: Allocation, macro_state: MacroState, drawdown: f64) -> WeekSnapshot {
        WeekSnapshot {
            week: 1,
            total_weeks: 26,
            macro_state,
            returns: SectorReturns::zero(),
            shock: None,
            allocation,
            value: 1_000_000.0 * (1.0 - drawdown),
            peak_value: 1_000_000.0,
            drawdown,
        }
    }

    #[test]
    fn test_diversified_portfolio_is_prudent() {
        let mut committee = RulesBasedCommittee::new();
        let a = committee.assess(&snapshot(Allocation::equal_weight(), MacroState::initial(), 0.0));
        assert_eq!(a.risk_score, 1);
        assert!(a.warnings.is_empty());
        assert!(a.critique.starts_with("The committee finds your allocation prudent."));
    }

    #[test]
    fn test_all_in_tech_in_a_stressed_recession() {
        let state = MacroState::new(Regime::Recession, RateDirection::Rising, VolatilityLevel::Crisis);
        let mut committee = RulesBasedCommittee::new();
        let a = committee.assess(&snapshot(Allocation::concentrated(Sector::Tech), state, 0.20));

        // 1 + 3 concentration + 2 cyclical + 1 vol + 1 rates + 1 drawdown
        assert_eq!(a.risk_score, 9);
        assert_eq!(a.warnings.len(), 5);
        assert!(a.critique.ends_with("Overall risk assessment: 9/10."));
        assert!(a
            .warnings
            .iter()
            .any(|w| w.starts_with("Portfolio is 20.0% below peak")));
        assert!(a.warnings.iter().all(|w| !w.contains("-20")));
    }

    #[test]
    fn test_defensive_concentration_in_recession() {
        let state = MacroState::new(Regime::Recession, RateDirection::Falling, VolatilityLevel::Normal);
        let alloc = Allocation::new([0.0, 0.0, 0.1, 0.5, 0.4]).unwrap();
        let mut committee = RulesBasedCommittee::new();
        let a = committee.assess(&snapshot(alloc, state, 0.0));

        // Consumer at 50% only; cyclicals are 40%
        assert_eq!(a.risk_score, 3);
        assert_eq!(a.warnings.len(), 1);
    }

    #[test]
    fn test_assessment_clamps_score() {
        assert_eq!(Assessment::new(0, vec![]).risk_score, 1);
        assert_eq!(Assessment::new(42, vec![]).risk_score, 10);
    }
}
