//! Macro state machine
//!
//! Three Markov chains advance once per week, in this order:
//!
//! 1. **Regime**: row of the regime matrix for the current regime, blended
//!    toward a recession-heavy stress distribution when current volatility
//!    is Elevated or worse, then blended toward the pending shock bias.
//! 2. **Rate direction**: row for the current rate direction, weakly coupled
//!    to the regime drawn in step 1.
//! 3. **Volatility**: row for the current volatility level, weakly coupled
//!    to the regime drawn in step 1.
//!
//! Each step is a convex combination of valid distributions followed by one
//! categorical draw, so probabilities stay well-formed without any
//! renormalisation.

use crate::market::{blend, validate_distribution, MatrixError};
use crate::models::market::{MacroState, RateDirection, Regime, VolatilityLevel};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Square row-stochastic matrix indexed by the `ALL` order of its state enum
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix<const N: usize> {
    name: &'static str,
    rows: [[f64; N]; N],
}

impl<const N: usize> TransitionMatrix<N> {
    pub const fn new(name: &'static str, rows: [[f64; N]; N]) -> Self {
        Self { name, rows }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Distribution over next states given current state index `from`
    pub fn row(&self, from: usize) -> &[f64; N] {
        &self.rows[from]
    }

    /// Every row must be a probability distribution
    pub fn validate(&self) -> Result<(), MatrixError> {
        for (i, row) in self.rows.iter().enumerate() {
            validate_distribution(self.name, i, row)?;
        }
        Ok(())
    }
}

/// Regime transitions, rows/columns: Bull, Bear, Recession, Recovery
pub const REGIME_TRANSITION: TransitionMatrix<{ Regime::COUNT }> = TransitionMatrix::new(
    "regime",
    [
        [0.60, 0.20, 0.05, 0.15],
        [0.10, 0.50, 0.30, 0.10],
        [0.05, 0.15, 0.50, 0.30],
        [0.35, 0.10, 0.05, 0.50],
    ],
);

/// Rate direction transitions, rows/columns: Rising, Stable, Falling
pub const RATE_TRANSITION: TransitionMatrix<{ RateDirection::COUNT }> = TransitionMatrix::new(
    "rate_direction",
    [
        [0.70, 0.25, 0.05],
        [0.15, 0.70, 0.15],
        [0.05, 0.25, 0.70],
    ],
);

/// Volatility transitions, rows/columns: Low, Normal, Elevated, High, Crisis
pub const VOLATILITY_TRANSITION: TransitionMatrix<{ VolatilityLevel::COUNT }> =
    TransitionMatrix::new(
        "volatility",
        [
            [0.60, 0.30, 0.08, 0.02, 0.00],
            [0.15, 0.60, 0.17, 0.06, 0.02],
            [0.05, 0.25, 0.45, 0.20, 0.05],
            [0.02, 0.13, 0.30, 0.40, 0.15],
            [0.00, 0.05, 0.20, 0.35, 0.40],
        ],
    );

/// Rate direction the economy drifts toward in each regime (rows: regime)
pub const RATE_BY_REGIME: [[f64; RateDirection::COUNT]; Regime::COUNT] = [
    [0.50, 0.35, 0.15],
    [0.20, 0.30, 0.50],
    [0.05, 0.25, 0.70],
    [0.35, 0.45, 0.20],
];

/// Volatility the market drifts toward in each regime (rows: regime)
pub const VOLATILITY_BY_REGIME: [[f64; VolatilityLevel::COUNT]; Regime::COUNT] = [
    [0.35, 0.40, 0.15, 0.08, 0.02],
    [0.05, 0.25, 0.25, 0.30, 0.15],
    [0.02, 0.13, 0.20, 0.35, 0.30],
    [0.20, 0.40, 0.25, 0.12, 0.03],
];

/// Where stressed markets push the regime: mostly Recession, some Bear
pub const REGIME_STRESS_TARGET: [f64; Regime::COUNT] = [0.0, 0.35, 0.65, 0.0];

/// Blend weight of `REGIME_STRESS_TARGET`, indexed by current volatility
pub const REGIME_STRESS_WEIGHT: [f64; VolatilityLevel::COUNT] = [0.0, 0.0, 0.05, 0.10, 0.25];

/// Blend weight of the regime-driven drift in the rate and volatility chains
pub const REGIME_COUPLING: f64 = 0.35;

/// One-week nudge of the regime distribution left behind by a shock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeBias {
    /// Regime that becomes more likely
    pub toward: Regime,
    /// Blend weight in (0, 1]
    pub strength: f64,
}

impl RegimeBias {
    pub const fn new(toward: Regime, strength: f64) -> Self {
        Self { toward, strength }
    }

    pub fn validate(&self) -> Result<(), MatrixError> {
        if !(self.strength > 0.0 && self.strength <= 1.0) {
            return Err(MatrixError::InvalidParameter {
                table: "regime_bias",
                name: format!("{:?}", self.toward),
                value: self.strength,
            });
        }
        Ok(())
    }

    /// The bias as a distribution: all mass on `toward`
    fn target(&self) -> [f64; Regime::COUNT] {
        let mut target = [0.0; Regime::COUNT];
        target[self.toward.index()] = 1.0;
        target
    }
}

/// Markov dynamics for the three macro axes
///
/// Holds only static configuration; `advance` is a pure function of its
/// arguments and the RNG.
#[derive(Debug, Clone)]
pub struct MacroStateMachine {
    regime: TransitionMatrix<{ Regime::COUNT }>,
    rate: TransitionMatrix<{ RateDirection::COUNT }>,
    volatility: TransitionMatrix<{ VolatilityLevel::COUNT }>,
    coupling: f64,
}

impl Default for MacroStateMachine {
    fn default() -> Self {
        Self::new(REGIME_TRANSITION, RATE_TRANSITION, VOLATILITY_TRANSITION)
    }
}

impl MacroStateMachine {
    pub fn new(
        regime: TransitionMatrix<{ Regime::COUNT }>,
        rate: TransitionMatrix<{ RateDirection::COUNT }>,
        volatility: TransitionMatrix<{ VolatilityLevel::COUNT }>,
    ) -> Self {
        Self {
            regime,
            rate,
            volatility,
            coupling: REGIME_COUPLING,
        }
    }

    /// Override the regime coupling of the rate and volatility chains
    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    /// Check every table this machine samples from
    pub fn validate(&self) -> Result<(), MatrixError> {
        self.regime.validate()?;
        self.rate.validate()?;
        self.volatility.validate()?;
        for (i, row) in RATE_BY_REGIME.iter().enumerate() {
            validate_distribution("rate_by_regime", i, row)?;
        }
        for (i, row) in VOLATILITY_BY_REGIME.iter().enumerate() {
            validate_distribution("volatility_by_regime", i, row)?;
        }
        validate_distribution("regime_stress_target", 0, &REGIME_STRESS_TARGET)?;

        let weights = REGIME_STRESS_WEIGHT
            .iter()
            .enumerate()
            .map(|(i, w)| (format!("stress_weight[{}]", i), *w))
            .chain(std::iter::once(("coupling".to_string(), self.coupling)));
        for (name, value) in weights {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatrixError::InvalidParameter {
                    table: "macro_state_machine",
                    name,
                    value,
                });
            }
        }

        Ok(())
    }

    /// Distribution of next week's regime
    pub fn regime_distribution(
        &self,
        current: &MacroState,
        bias: Option<&RegimeBias>,
    ) -> [f64; Regime::COUNT] {
        let base = self.regime.row(current.regime.index());
        let stressed = blend(
            base,
            &REGIME_STRESS_TARGET,
            REGIME_STRESS_WEIGHT[current.volatility.index()],
        );
        match bias {
            Some(bias) => blend(&stressed, &bias.target(), bias.strength),
            None => stressed,
        }
    }

    /// Distribution of next week's rate direction
    pub fn rate_distribution(
        &self,
        current: &MacroState,
        next_regime: Regime,
    ) -> [f64; RateDirection::COUNT] {
        blend(
            self.rate.row(current.rate_direction.index()),
            &RATE_BY_REGIME[next_regime.index()],
            self.coupling,
        )
    }

    /// Distribution of next week's volatility level
    pub fn volatility_distribution(
        &self,
        current: &MacroState,
        next_regime: Regime,
    ) -> [f64; VolatilityLevel::COUNT] {
        blend(
            self.volatility.row(current.volatility.index()),
            &VOLATILITY_BY_REGIME[next_regime.index()],
            self.coupling,
        )
    }

    /// Advance one week
    ///
    /// Consumes exactly three draws: regime, rate direction, volatility.
    pub fn advance(
        &self,
        current: &MacroState,
        bias: Option<&RegimeBias>,
        rng: &mut RngManager,
    ) -> MacroState {
        let regime = Regime::ALL[rng.choose_weighted(&self.regime_distribution(current, bias))];
        let rate_direction =
            RateDirection::ALL[rng.choose_weighted(&self.rate_distribution(current, regime))];
        let volatility =
            VolatilityLevel::ALL[rng.choose_weighted(&self.volatility_distribution(current, regime))];

        let next = MacroState::new(regime, rate_direction, volatility);
        debug!(
            from = ?current,
            to = ?next,
            biased = bias.is_some(),
            "macro state advanced"
        );
        next
    }
}
