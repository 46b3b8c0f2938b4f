//! Rival allocation strategies
//!
//! A strategy sees what the player sees when allocating: the macro state of
//! the last resolved week and the adjusted returns of earlier weeks. Its only
//! randomness is a small jitter drawn from the rival's own RNG.

use crate::models::allocation::Allocation;
use crate::models::market::{MacroState, Regime, Sector, SectorReturns};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weeks of history the trend strategies sum over
pub const TRAILING_WINDOW: usize = 4;

/// Jitter, in percentage points, on regime target weights
const TARGET_JITTER: f64 = 3.0;

/// Jitter on the equal-weight opening allocation
const OPENING_JITTER: f64 = 2.0;

/// Keeps the extreme sector of a trend ranking above zero weight
const TREND_OFFSET: f64 = 0.01;

/// Macro timer targets (percent) per regime, `Sector::ALL` order
const MACRO_TIMER_TARGETS: [[f64; Sector::COUNT]; Regime::COUNT] = [
    // Tech, Energy, Financials, Consumer, Industrials
    [25.0, 8.0, 12.0, 8.0, 22.0],  // Bull
    [8.0, 8.0, 20.0, 30.0, 10.0],  // Bear
    [5.0, 5.0, 12.0, 35.0, 13.0],  // Recession
    [12.0, 22.0, 20.0, 8.0, 18.0], // Recovery
];

/// Defensive targets (percent) per regime
const DEFENSIVE_TARGETS: [[f64; Sector::COUNT]; Regime::COUNT] = [
    [8.0, 8.0, 15.0, 28.0, 13.0],
    [5.0, 5.0, 15.0, 30.0, 13.0],
    [5.0, 5.0, 10.0, 30.0, 13.0],
    [10.0, 12.0, 15.0, 22.0, 15.0],
];

/// How a rival manager allocates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RivalStrategy {
    /// Overweights the sectors with the best trailing returns
    Momentum,
    /// Heavy in Consumer, regime-dependent tilt
    Defensive,
    /// Positions for the current regime
    MacroTimer,
    /// Contrarian: overweights the worst trailing performers
    Value,
}

impl RivalStrategy {
    pub const ALL: [RivalStrategy; 4] = [
        RivalStrategy::Momentum,
        RivalStrategy::Defensive,
        RivalStrategy::MacroTimer,
        RivalStrategy::Value,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RivalStrategy::Momentum => "momentum",
            RivalStrategy::Defensive => "defensive",
            RivalStrategy::MacroTimer => "macro_timer",
            RivalStrategy::Value => "value",
        }
    }

    /// Name of the fund running this strategy
    pub fn fund_name(self) -> &'static str {
        match self {
            RivalStrategy::Momentum => "Velocity Capital",
            RivalStrategy::Defensive => "Fortress Fund",
            RivalStrategy::MacroTimer => "Regime Alpha Partners",
            RivalStrategy::Value => "Contrarian Capital",
        }
    }

    /// Floor (percent) applied to every sector before normalising
    pub fn min_weight_pct(self) -> f64 {
        match self {
            RivalStrategy::Value => 10.0,
            _ => 5.0,
        }
    }

    /// Choose next week's allocation
    ///
    /// `history` holds the adjusted returns of the weeks resolved so far,
    /// oldest first. Draw count varies by strategy; the RNG must belong to
    /// the rival, never to the season.
    pub fn decide(
        self,
        state: &MacroState,
        history: &[SectorReturns],
        rng: &mut RngManager,
    ) -> Allocation {
        let raw = match self {
            RivalStrategy::Momentum => match trailing_returns(history) {
                Some(trailing) => chase(&trailing),
                None => opening_weights(rng),
            },
            RivalStrategy::Value => match trailing_returns(history) {
                Some(trailing) => fade(&trailing),
                None => opening_weights(rng),
            },
            RivalStrategy::Defensive => jittered(DEFENSIVE_TARGETS[state.regime.index()], rng),
            RivalStrategy::MacroTimer => jittered(MACRO_TIMER_TARGETS[state.regime.index()], rng),
        };
        normalize_weights(raw, self.min_weight_pct())
    }
}

impl fmt::Display for RivalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RivalStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RivalStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown rival strategy '{}', expected one of momentum, defensive, macro_timer, value",
                    s
                )
            })
    }
}

/// Uniform draw in [-amplitude, amplitude)
fn jitter(rng: &mut RngManager, amplitude: f64) -> f64 {
    (rng.next_f64() * 2.0 - 1.0) * amplitude
}

fn jittered(mut targets: [f64; Sector::COUNT], rng: &mut RngManager) -> [f64; Sector::COUNT] {
    for weight in targets.iter_mut() {
        *weight += jitter(rng, TARGET_JITTER);
    }
    targets
}

fn opening_weights(rng: &mut RngManager) -> [f64; Sector::COUNT] {
    let equal = 100.0 / Sector::COUNT as f64;
    std::array::from_fn(|_| equal + jitter(rng, OPENING_JITTER))
}

/// Cumulative return per sector over the last `TRAILING_WINDOW` weeks
///
/// `None` without history, or when every sector sums to exactly zero.
fn trailing_returns(history: &[SectorReturns]) -> Option<[f64; Sector::COUNT]> {
    let start = history.len().saturating_sub(TRAILING_WINDOW);
    let mut cumulative = [0.0; Sector::COUNT];
    for returns in &history[start..] {
        for (sector, value) in returns.iter() {
            cumulative[sector.index()] += value;
        }
    }
    if cumulative.iter().all(|v| *v == 0.0) {
        None
    } else {
        Some(cumulative)
    }
}

/// Weight proportional to trailing return above the worst sector
fn chase(trailing: &[f64; Sector::COUNT]) -> [f64; Sector::COUNT] {
    let worst = trailing.iter().copied().fold(f64::INFINITY, f64::min);
    proportional(trailing.map(|r| r - worst + TREND_OFFSET))
}

/// Weight proportional to trailing return below the best sector
fn fade(trailing: &[f64; Sector::COUNT]) -> [f64; Sector::COUNT] {
    let best = trailing.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    proportional(trailing.map(|r| best - r + TREND_OFFSET))
}

/// Scale positive scores to percentages
fn proportional(scores: [f64; Sector::COUNT]) -> [f64; Sector::COUNT] {
    let total: f64 = scores.iter().sum();
    scores.map(|s| s / total * 100.0)
}

/// Floor each weight at `min_pct`, then rescale to a fully invested allocation
fn normalize_weights(raw: [f64; Sector::COUNT], min_pct: f64) -> Allocation {
    let floored = raw.map(|w| w.max(min_pct));
    let total: f64 = floored.iter().sum();
    Allocation::from_weights(floored.map(|w| w / total))
}
