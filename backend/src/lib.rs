//! Sector Season Core - Rust Engine
//!
//! Deterministic market simulation for a 26-week, five-sector capital
//! allocation game.
//!
//! # Architecture
//!
//! - **rng**: Deterministic random number generation
//! - **core**: Season clock
//! - **models**: Domain types (MacroState, Allocation, EquityCurve, Event)
//! - **market**: Macro state machine, return generator, shock engine
//! - **scoring**: CAGR, drawdown, volatility, Sharpe, letter grade
//! - **risk**: Risk committee capability
//! - **competition**: Rival manager tracked over the same season
//! - **orchestrator**: Week state machine and checkpointing
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG per season)
//! 2. RNG draws happen in a fixed order: macro, returns, shock
//! 3. The equity curve is append-only; scoring is a pure function of it

// Module declarations
pub mod competition;
pub mod core;
pub mod market;
pub mod models;
pub mod orchestrator;
pub mod risk;
pub mod rng;
pub mod scoring;

// Re-exports for convenience
pub use competition::{RivalPortfolio, RivalRecord, RivalStrategy, RivalWeek};
pub use core::time::WeekClock;
pub use market::{
    regime::{MacroStateMachine, RegimeBias, TransitionMatrix},
    returns::{RegimeReturnModel, ReturnModel},
    shocks::{ShockCatalog, ShockEngine, ShockEvent, ShockKind},
    MatrixError,
};
pub use models::{
    allocation::{Allocation, AllocationError, WEIGHT_SUM_TOLERANCE},
    equity::{EquityCurve, EquityCurvePoint},
    event::{Event, EventLog},
    market::{MacroState, RateDirection, Regime, Sector, SectorReturns, VolatilityLevel},
};
pub use orchestrator::{
    Orchestrator, SeasonConfig, SeasonObserver, SeasonPhase, SeasonRecord, SimulationError,
    WeekReport,
};
pub use risk::{Assessment, RiskCommittee, RulesBasedCommittee, WeekSnapshot};
pub use rng::RngManager;
pub use scoring::{LetterGrade, ScoreCard, ScoringError, SeasonAnalytics};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn sector_sim_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::season::PySeason>()?;
    Ok(())
}
