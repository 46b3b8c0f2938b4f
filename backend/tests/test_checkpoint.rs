//! Checkpoint Tests - Save/Load Season State
//!
//! Critical invariants tested:
//! - Determinism: a restored season finishes identically to an uninterrupted one
//! - Config matching: state from a different config is rejected
//! - Integrity: tampered snapshots are rejected

use sector_sim_core_rs::orchestrator::{Orchestrator, SeasonConfig, SeasonPhase, SimulationError};
use sector_sim_core_rs::{Allocation, Sector};

// ============================================================================
// Test Helpers
// ============================================================================

fn config() -> SeasonConfig {
    let mut config = SeasonConfig::new(4242);
    config.weeks = 12;
    config.player_name = "Checkpoint".to_string();
    config
}

/// Rotating allocation so every week differs
fn allocation_for(week: usize) -> Allocation {
    Allocation::concentrated(Sector::ALL[week % Sector::COUNT])
}

fn finish(orch: &mut Orchestrator) {
    while let SeasonPhase::AwaitingAllocation { week } = orch.phase() {
        orch.play_week(allocation_for(week)).unwrap();
    }
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_resume_mid_season_is_bit_identical() {
    let mut uninterrupted = Orchestrator::new(config()).unwrap();
    finish(&mut uninterrupted);

    let mut first_half = Orchestrator::new(config()).unwrap();
    for week in 1..=5 {
        first_half.play_week(allocation_for(week)).unwrap();
    }
    let json = first_half.save_state().unwrap();

    let mut resumed = Orchestrator::load_state(config(), &json).unwrap();
    assert_eq!(resumed.phase(), SeasonPhase::AwaitingAllocation { week: 6 });
    assert_eq!(resumed.session_id(), first_half.session_id());
    assert_eq!(resumed.rng_state(), first_half.rng_state());
    finish(&mut resumed);

    assert_eq!(resumed.curve(), uninterrupted.curve());
    assert_eq!(resumed.scorecard().unwrap(), uninterrupted.scorecard().unwrap());
    assert_eq!(resumed.event_log(), uninterrupted.event_log());
    assert!(resumed.rival().is_some());
    assert_eq!(resumed.rival(), uninterrupted.rival());
}

#[test]
fn test_resume_from_week_resolved() {
    let mut orch = Orchestrator::new(config()).unwrap();
    orch.play_week(allocation_for(1)).unwrap();
    orch.submit(allocation_for(2)).unwrap();
    assert_eq!(orch.phase(), SeasonPhase::WeekResolved { week: 2 });

    let mut resumed = Orchestrator::load_state(config(), &orch.save_state().unwrap()).unwrap();
    assert_eq!(resumed.phase(), SeasonPhase::WeekResolved { week: 2 });
    assert_eq!(resumed.pending_bias(), orch.pending_bias());

    orch.advance().unwrap();
    resumed.advance().unwrap();
    finish(&mut orch);
    finish(&mut resumed);
    assert_eq!(orch.curve(), resumed.curve());
}

#[test]
fn test_resume_fresh_and_completed_seasons() {
    let fresh = Orchestrator::new(config()).unwrap();
    let restored = Orchestrator::load_state(config(), &fresh.save_state().unwrap()).unwrap();
    assert_eq!(restored.phase(), SeasonPhase::AwaitingAllocation { week: 1 });
    assert!(restored.curve().is_empty());

    let mut done = Orchestrator::new(config()).unwrap();
    finish(&mut done);
    let mut restored = Orchestrator::load_state(config(), &done.save_state().unwrap()).unwrap();
    assert!(restored.is_complete());
    assert!(matches!(
        restored.submit(Allocation::equal_weight()),
        Err(SimulationError::InvalidState { .. })
    ));
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_load_with_different_config_fails() {
    let mut orch = Orchestrator::new(config()).unwrap();
    orch.play_week(allocation_for(1)).unwrap();
    let json = orch.save_state().unwrap();

    let mut other = config();
    other.seed = 1;
    let err = Orchestrator::load_state(other, &json).unwrap_err();
    assert!(matches!(err, SimulationError::StateValidationError(_)));
}

#[test]
fn test_load_garbage_fails() {
    let err = Orchestrator::load_state(config(), "{not json").unwrap_err();
    assert!(matches!(err, SimulationError::SerializationError(_)));
}

#[test]
fn test_tampered_phase_is_rejected() {
    let mut orch = Orchestrator::new(config()).unwrap();
    for week in 1..=3 {
        orch.play_week(allocation_for(week)).unwrap();
    }

    let mut value: serde_json::Value = serde_json::from_str(&orch.save_state().unwrap()).unwrap();
    value["phase"]["week"] = serde_json::json!(2);
    let err = Orchestrator::load_state(config(), &value.to_string()).unwrap_err();
    assert!(matches!(err, SimulationError::StateValidationError(_)));
}

#[test]
fn test_tampered_macro_state_is_rejected() {
    let mut orch = Orchestrator::new(config()).unwrap();
    orch.play_week(allocation_for(1)).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&orch.save_state().unwrap()).unwrap();
    let tampered = if value["macro_state"]["regime"] == "recession" {
        "bull"
    } else {
        "recession"
    };
    value["macro_state"]["regime"] = serde_json::json!(tampered);
    let err = Orchestrator::load_state(config(), &value.to_string()).unwrap_err();
    assert!(matches!(err, SimulationError::StateValidationError(_)));
}
