//! Sector return generation conditioned on the macro state
//!
//! Weekly return for sector `s`:
//!
//! ```text
//! mean = regime_mean[regime][s] + rate_mean_add[rate][s]
//! std  = regime_std[regime][s] * rate_std_mult[rate][s] * vol_multiplier[vol]
//! r    = clamp(mean + std * z_s, MIN_WEEKLY_RETURN, MAX_WEEKLY_RETURN)
//! ```
//!
//! with one independent standard normal `z_s` per sector, drawn in
//! `Sector::ALL` order. Consumer carries dampened loadings in every regime.

use crate::market::MatrixError;
use crate::models::market::{MacroState, RateDirection, Regime, Sector, SectorReturns, VolatilityLevel};
use crate::rng::RngManager;
use tracing::debug;

/// Lower clamp for any weekly sector return
pub const MIN_WEEKLY_RETURN: f64 = -0.30;

/// Upper clamp for any weekly sector return
pub const MAX_WEEKLY_RETURN: f64 = 0.30;

/// `SECTOR_PARAMS[regime][sector] = (weekly_mean, weekly_std)`
pub const SECTOR_PARAMS: [[(f64, f64); Sector::COUNT]; Regime::COUNT] = [
    // Bull: Tech, Energy, Financials, Consumer, Industrials
    [(0.020, 0.035), (0.012, 0.040), (0.015, 0.030), (0.010, 0.020), (0.013, 0.025)],
    // Bear
    [(-0.015, 0.045), (-0.010, 0.050), (-0.020, 0.040), (-0.005, 0.025), (-0.012, 0.035)],
    // Recession
    [(-0.025, 0.055), (-0.020, 0.060), (-0.030, 0.050), (-0.008, 0.030), (-0.022, 0.045)],
    // Recovery
    [(0.015, 0.040), (0.018, 0.045), (0.020, 0.035), (0.008, 0.022), (0.016, 0.030)],
];

/// `RATE_MODIFIERS[rate][sector] = (mean_additive, std_multiplier)`
pub const RATE_MODIFIERS: [[(f64, f64); Sector::COUNT]; RateDirection::COUNT] = [
    // Rising
    [(-0.003, 1.10), (0.002, 1.00), (0.005, 0.90), (-0.002, 1.05), (-0.001, 1.05)],
    // Stable
    [(0.0, 1.0), (0.0, 1.0), (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)],
    // Falling
    [(0.004, 0.95), (-0.001, 1.05), (-0.004, 1.10), (0.002, 0.95), (0.001, 0.98)],
];

/// Noise scale per volatility level; strictly increasing
pub const VOLATILITY_MULTIPLIERS: [f64; VolatilityLevel::COUNT] = [0.60, 1.00, 1.25, 1.50, 2.20];

/// Clamp a weekly return into the allowed band
pub fn clamp_return(value: f64) -> f64 {
    value.clamp(MIN_WEEKLY_RETURN, MAX_WEEKLY_RETURN)
}

/// Produces one week of sector returns from the macro state
///
/// Implementations must be pure functions of `(state, rng)`: no memory of
/// earlier weeks, finite output, and a fixed number of draws per call.
pub trait ReturnModel: Send + Sync {
    fn generate(&self, state: &MacroState, rng: &mut RngManager) -> SectorReturns;

    /// Startup check of the model's parameter tables
    fn validate(&self) -> Result<(), MatrixError> {
        Ok(())
    }
}

/// Regime/rate/volatility conditioned normal returns
///
/// Consumes two draws per sector (ten per week).
#[derive(Debug, Clone, Default)]
pub struct RegimeReturnModel;

impl RegimeReturnModel {
    pub fn new() -> Self {
        Self
    }

    /// Noise multiplier for a volatility level
    pub fn volatility_multiplier(level: VolatilityLevel) -> f64 {
        VOLATILITY_MULTIPLIERS[level.index()]
    }

    /// Effective `(mean, std)` for a sector under a macro state
    pub fn effective_params(state: &MacroState, sector: Sector) -> (f64, f64) {
        let (base_mean, base_std) = SECTOR_PARAMS[state.regime.index()][sector.index()];
        let (mean_add, std_mult) = RATE_MODIFIERS[state.rate_direction.index()][sector.index()];
        let vol = Self::volatility_multiplier(state.volatility);
        (base_mean + mean_add, base_std * std_mult * vol)
    }
}

impl ReturnModel for RegimeReturnModel {
    fn generate(&self, state: &MacroState, rng: &mut RngManager) -> SectorReturns {
        let mut returns = SectorReturns::zero();

        for sector in Sector::ALL {
            let (mean, std) = Self::effective_params(state, sector);
            let raw = rng.normal(mean, std);
            // Box-Muller output is finite; fall back to the drift if that ever changes
            let value = if raw.is_finite() { raw } else { mean };
            returns.set(sector, clamp_return(value));
        }

        debug!(regime = ?state.regime, volatility = ?state.volatility, returns = ?returns.values(), "sector returns generated");
        returns
    }

    fn validate(&self) -> Result<(), MatrixError> {
        for (r, row) in SECTOR_PARAMS.iter().enumerate() {
            for (s, (mean, std)) in row.iter().enumerate() {
                if !mean.is_finite() || !std.is_finite() || *std <= 0.0 {
                    return Err(MatrixError::InvalidParameter {
                        table: "sector_params",
                        name: format!("{:?}/{}", Regime::ALL[r], Sector::ALL[s]),
                        value: *std,
                    });
                }
            }
        }

        for (d, row) in RATE_MODIFIERS.iter().enumerate() {
            for (s, (_, mult)) in row.iter().enumerate() {
                if !mult.is_finite() || *mult <= 0.0 {
                    return Err(MatrixError::InvalidParameter {
                        table: "rate_modifiers",
                        name: format!("{:?}/{}", RateDirection::ALL[d], Sector::ALL[s]),
                        value: *mult,
                    });
                }
            }
        }

        let mut previous = 0.0;
        for (level, multiplier) in VolatilityLevel::ALL.iter().zip(VOLATILITY_MULTIPLIERS) {
            if multiplier <= previous {
                return Err(MatrixError::InvalidParameter {
                    table: "volatility_multipliers",
                    name: format!("{:?}", level),
                    value: multiplier,
                });
            }
            previous = multiplier;
        }

        Ok(())
    }
}
