//! Domain models for the sector season

pub mod allocation;
pub mod equity;
pub mod event;
pub mod market;

// Re-exports
pub use allocation::{Allocation, AllocationError, WEIGHT_SUM_TOLERANCE};
pub use equity::{EquityCurve, EquityCurvePoint};
pub use event::{Event, EventLog};
pub use market::{MacroState, RateDirection, Regime, Sector, SectorReturns, VolatilityLevel};
