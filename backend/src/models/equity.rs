//! Equity curve: the append-only ledger of resolved weeks
//!
//! One [`EquityCurvePoint`] is appended per resolved week and never modified
//! afterwards. The curve is the canonical history consumed by scoring,
//! checkpointing and the persistence collaborator.

use crate::market::shocks::ShockEvent;
use crate::models::allocation::Allocation;
use crate::models::market::{MacroState, SectorReturns};
use serde::{Deserialize, Serialize};

/// Everything that happened in one resolved week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    /// Week number (1-based)
    pub week: usize,

    /// Portfolio value at the end of the week
    pub value: f64,

    /// Portfolio return for the week
    pub portfolio_return: f64,

    /// Weight × adjusted return, per sector; sums to `portfolio_return`
    pub contributions: SectorReturns,

    /// Allocation the player submitted
    pub allocation: Allocation,

    /// Generator output before the shock
    pub base_returns: SectorReturns,

    /// Returns after the shock (equal to `base_returns` on quiet weeks)
    pub adjusted_returns: SectorReturns,

    /// Macro state the week was played under
    pub macro_state: MacroState,

    /// Shock that fired this week, if any
    pub shock: Option<ShockEvent>,
}

/// Ordered weekly history plus the starting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    initial_value: f64,
    points: Vec<EquityCurvePoint>,
}

impl EquityCurve {
    pub fn new(initial_value: f64) -> Self {
        Self {
            initial_value,
            points: Vec::new(),
        }
    }

    /// Append the next week
    ///
    /// Only the orchestrator writes to the curve.
    pub(crate) fn append(&mut self, point: EquityCurvePoint) {
        debug_assert_eq!(point.week, self.points.len() + 1, "weeks must be contiguous");
        self.points.push(point);
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    pub fn points(&self) -> &[EquityCurvePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&EquityCurvePoint> {
        self.points.last()
    }

    /// Number of completed weeks
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest portfolio value (the initial value before week 1)
    pub fn current_value(&self) -> f64 {
        self.points.last().map_or(self.initial_value, |p| p.value)
    }

    /// Value series including the starting value: `[v0, v1, ..., vN]`
    pub fn values(&self) -> Vec<f64> {
        std::iter::once(self.initial_value)
            .chain(self.points.iter().map(|p| p.value))
            .collect()
    }

    /// Highest value seen so far, starting value included
    pub fn peak(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.value)
            .fold(self.initial_value, f64::max)
    }

    /// Decline of the current value from the running peak, as a non-negative fraction
    pub fn current_drawdown(&self) -> f64 {
        let peak = self.peak();
        if peak <= 0.0 {
            return 0.0;
        }
        ((peak - self.current_value()) / peak).max(0.0)
    }
}
