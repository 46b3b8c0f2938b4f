//! Market model types
//!
//! Sectors the player allocates across, the three macro axes, and the
//! per-week sector return vector.
//!
//! All enums carry an `ALL` table in a fixed order. That order is part of the
//! determinism contract: it is the order in which sector noise is drawn and
//! the row/column order of every transition matrix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Investable sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Tech,
    Energy,
    Financials,
    /// Consumer staples; the defensive sector
    Consumer,
    Industrials,
}

impl Sector {
    /// Number of sectors
    pub const COUNT: usize = 5;

    /// All sectors in canonical order
    pub const ALL: [Sector; Sector::COUNT] = [
        Sector::Tech,
        Sector::Energy,
        Sector::Financials,
        Sector::Consumer,
        Sector::Industrials,
    ];

    /// Position in `Sector::ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Sector::Tech => "Tech",
            Sector::Energy => "Energy",
            Sector::Financials => "Financials",
            Sector::Consumer => "Consumer",
            Sector::Industrials => "Industrials",
        }
    }

    /// Cyclical sectors (everything but the defensive Consumer sector and Financials)
    pub fn is_cyclical(self) -> bool {
        matches!(self, Sector::Tech | Sector::Energy | Sector::Industrials)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Macroeconomic regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Bull,
    Bear,
    Recession,
    Recovery,
}

impl Regime {
    pub const COUNT: usize = 4;

    pub const ALL: [Regime; Regime::COUNT] = [
        Regime::Bull,
        Regime::Bear,
        Regime::Recession,
        Regime::Recovery,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// One-line narrative for display collaborators
    pub fn description(self) -> &'static str {
        match self {
            Regime::Bull => "The economy is expanding. Risk appetite is strong.",
            Regime::Bear => "Markets are declining. Caution is warranted.",
            Regime::Recession => "Economic contraction underway. Defensive positioning advised.",
            Regime::Recovery => "Signs of recovery emerging. Opportunities abound.",
        }
    }
}

/// Interest rate trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDirection {
    Rising,
    Stable,
    Falling,
}

impl RateDirection {
    pub const COUNT: usize = 3;

    pub const ALL: [RateDirection; RateDirection::COUNT] = [
        RateDirection::Rising,
        RateDirection::Stable,
        RateDirection::Falling,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Market volatility level, ordered from calmest to most turbulent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    Low,
    Normal,
    Elevated,
    High,
    Crisis,
}

impl VolatilityLevel {
    pub const COUNT: usize = 5;

    pub const ALL: [VolatilityLevel; VolatilityLevel::COUNT] = [
        VolatilityLevel::Low,
        VolatilityLevel::Normal,
        VolatilityLevel::Elevated,
        VolatilityLevel::High,
        VolatilityLevel::Crisis,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// High or Crisis
    pub fn is_stressed(self) -> bool {
        self >= VolatilityLevel::High
    }
}

/// Snapshot of the macro environment for one week
///
/// Exactly one value per axis. Mutated only by the macro state machine at the
/// start of a week; every copy handed out is an immutable snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroState {
    pub regime: Regime,
    pub rate_direction: RateDirection,
    pub volatility: VolatilityLevel,
}

impl MacroState {
    pub fn new(regime: Regime, rate_direction: RateDirection, volatility: VolatilityLevel) -> Self {
        Self {
            regime,
            rate_direction,
            volatility,
        }
    }

    /// Fixed starting state of every season: Bull / Stable / Normal
    pub fn initial() -> Self {
        Self::new(Regime::Bull, RateDirection::Stable, VolatilityLevel::Normal)
    }
}

impl Default for MacroState {
    fn default() -> Self {
        Self::initial()
    }
}

/// One week of returns, one value per sector in `Sector::ALL` order
///
/// Returns are simple fractional returns (0.01 = +1%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorReturns {
    values: [f64; Sector::COUNT],
}

impl SectorReturns {
    pub fn new(values: [f64; Sector::COUNT]) -> Self {
        Self { values }
    }

    /// All sectors at 0%
    pub fn zero() -> Self {
        Self::new([0.0; Sector::COUNT])
    }

    pub fn get(&self, sector: Sector) -> f64 {
        self.values[sector.index()]
    }

    pub fn set(&mut self, sector: Sector, value: f64) {
        self.values[sector.index()] = value;
    }

    pub fn values(&self) -> &[f64; Sector::COUNT] {
        &self.values
    }

    /// Iterate `(sector, return)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Sector, f64)> + '_ {
        Sector::ALL.iter().map(move |s| (*s, self.values[s.index()]))
    }

    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}
