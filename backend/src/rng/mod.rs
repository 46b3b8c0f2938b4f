//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the engine MUST go through this module.
//!
//! # Draw order
//!
//! Reproducibility depends on the order in which components consume draws.
//! Each week consumes, in this order:
//!
//! 1. Macro transition: three uniforms (regime, rate direction, volatility)
//! 2. Sector returns: one standard normal per sector, in `Sector::ALL` order
//!    (two uniforms each)
//! 3. Shock engine: one uniform for the fire check, plus one uniform for the
//!    catalog pick when a shock fires

mod xorshift;

pub use xorshift::RngManager;
