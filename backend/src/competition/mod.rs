//! Competition layer: a rival manager playing the same season
//!
//! The rival faces the player's adjusted returns week by week and keeps its
//! own equity curve, scored the same way as the player's. Its jitter comes
//! from a separate RNG derived from the season seed, so adding or removing a
//! rival never changes the season's draws.

pub mod rival;

pub use rival::{RivalStrategy, TRAILING_WINDOW};

use crate::models::allocation::Allocation;
use crate::models::equity::{EquityCurve, EquityCurvePoint};
use crate::models::market::{MacroState, SectorReturns};
use crate::orchestrator::WeekReport;
use crate::rng::RngManager;
use crate::scoring::{ScoreCard, ScoringError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mixed into the season seed to seed the rival's RNG
pub const RIVAL_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// The rival's side of one resolved week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivalWeek {
    pub week: usize,
    pub name: String,
    pub strategy: RivalStrategy,
    pub allocation: Allocation,
    pub portfolio_return: f64,
    pub value: f64,
}

/// Rival's portfolio over the season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivalPortfolio {
    strategy: RivalStrategy,
    rng: RngManager,
    curve: EquityCurve,
}

impl RivalPortfolio {
    pub fn new(strategy: RivalStrategy, season_seed: u64, starting_value: f64) -> Self {
        Self {
            strategy,
            rng: RngManager::new(season_seed ^ RIVAL_SEED_SALT),
            curve: EquityCurve::new(starting_value),
        }
    }

    pub fn strategy(&self) -> RivalStrategy {
        self.strategy
    }

    pub fn name(&self) -> &'static str {
        self.strategy.fund_name()
    }

    pub fn curve(&self) -> &EquityCurve {
        &self.curve
    }

    pub fn current_value(&self) -> f64 {
        self.curve.current_value()
    }

    /// Play the week the player just resolved
    ///
    /// The allocation is chosen from the macro state and returns of earlier
    /// weeks only, then applied to this week's adjusted returns.
    pub fn process_week(&mut self, report: &WeekReport) -> RivalWeek {
        let state = self
            .curve
            .last()
            .map_or_else(MacroState::initial, |p| p.macro_state);
        let history: Vec<SectorReturns> = self
            .curve
            .points()
            .iter()
            .map(|p| p.adjusted_returns)
            .collect();

        let allocation = self.strategy.decide(&state, &history, &mut self.rng);
        let contributions = allocation.contributions(&report.adjusted_returns);
        let portfolio_return: f64 = contributions.values().iter().sum();
        let value = self.curve.current_value() * (1.0 + portfolio_return);

        self.curve.append(EquityCurvePoint {
            week: report.week,
            value,
            portfolio_return,
            contributions,
            allocation,
            base_returns: report.base_returns,
            adjusted_returns: report.adjusted_returns,
            macro_state: report.macro_state,
            shock: report.shock.clone(),
        });
        debug!(
            week = report.week,
            rival = self.name(),
            portfolio_return,
            value,
            "rival week resolved"
        );

        RivalWeek {
            week: report.week,
            name: self.name().to_string(),
            strategy: self.strategy,
            allocation,
            portfolio_return,
            value,
        }
    }

    pub fn scorecard(&self, risk_free_rate: f64) -> Result<ScoreCard, ScoringError> {
        ScoreCard::compute(&self.curve, risk_free_rate)
    }

    pub fn record(&self, risk_free_rate: f64) -> RivalRecord {
        RivalRecord {
            name: self.name().to_string(),
            strategy: self.strategy,
            curve: self.curve.clone(),
            scorecard: self.scorecard(risk_free_rate).ok(),
        }
    }
}

/// Rival summary handed to persistence alongside the player's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivalRecord {
    pub name: String,
    pub strategy: RivalStrategy,
    pub curve: EquityCurve,
    /// `None` until at least one week is resolved
    pub scorecard: Option<ScoreCard>,
}
