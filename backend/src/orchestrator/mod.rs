//! Orchestrator - week state machine
//!
//! See `engine.rs` for the pipeline and `checkpoint.rs` for save/resume.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{
    Orchestrator, SeasonConfig, SeasonObserver, SeasonPhase, SeasonRecord, SimulationError,
    WeekReport, DEFAULT_PLAYER_NAME, DEFAULT_STARTING_VALUE, SEASON_WEEKS,
};

// Re-export checkpoint types
pub use checkpoint::{compute_config_hash, validate_snapshot, SeasonSnapshot};
