//! Checkpoint - Save/Load Season State
//!
//! Serializes the live season so it can be paused and resumed.
//!
//! # Critical Invariants
//!
//! - **Determinism**: a resumed season continues bit-identically
//! - **Ledger Integrity**: weeks contiguous, values finite and positive
//! - **Phase Consistency**: phase agrees with the number of resolved weeks
//! - **Config Matching**: state can only be loaded with matching config
//! - **Rival Alignment**: the rival's curve covers exactly the resolved weeks

use crate::competition::RivalPortfolio;
use crate::market::regime::RegimeBias;
use crate::models::equity::EquityCurve;
use crate::models::event::EventLog;
use crate::models::market::MacroState;
use crate::orchestrator::engine::{SeasonConfig, SeasonPhase, SimulationError};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete season state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub session_id: Uuid,

    pub phase: SeasonPhase,

    /// RNG cursor (CRITICAL for determinism)
    pub rng: RngManager,

    /// Macro state of the last resolved week
    pub macro_state: MacroState,

    /// Shock bias not yet consumed by a macro transition
    pub pending_bias: Option<RegimeBias>,

    pub curve: EquityCurve,

    pub event_log: EventLog,

    /// Rival portfolio, including its own RNG cursor
    pub rival: Option<RivalPortfolio>,

    /// SHA256 hash of the season config (for validation)
    pub config_hash: String,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate snapshot integrity against the config it is being loaded with
pub fn validate_snapshot(
    snapshot: &SeasonSnapshot,
    config: &SeasonConfig,
) -> Result<(), SimulationError> {
    // 1. Config match
    let expected_hash = compute_config_hash(config)?;
    if snapshot.config_hash != expected_hash {
        return Err(SimulationError::StateValidationError(
            "Config hash mismatch: snapshot was saved with a different config".to_string(),
        ));
    }

    // 2. Ledger integrity
    let curve = &snapshot.curve;
    if curve.initial_value() != config.starting_value {
        return Err(SimulationError::StateValidationError(format!(
            "Initial value {} does not match starting value {}",
            curve.initial_value(),
            config.starting_value
        )));
    }
    for (i, point) in curve.points().iter().enumerate() {
        if point.week != i + 1 {
            return Err(SimulationError::StateValidationError(format!(
                "Equity curve gap: position {} holds week {}",
                i, point.week
            )));
        }
        if !point.value.is_finite() || point.value <= 0.0 {
            return Err(SimulationError::StateValidationError(format!(
                "Week {} has invalid value {}",
                point.week, point.value
            )));
        }
    }

    // 3. Phase consistency
    let resolved = curve.len();
    let consistent = match snapshot.phase {
        SeasonPhase::AwaitingAllocation { week } => week == resolved + 1 && week <= config.weeks,
        SeasonPhase::WeekResolved { week } => week == resolved && week <= config.weeks,
        SeasonPhase::SeasonComplete => resolved == config.weeks,
    };
    if !consistent {
        return Err(SimulationError::StateValidationError(format!(
            "Phase '{}' inconsistent with {} resolved weeks of {}",
            snapshot.phase, resolved, config.weeks
        )));
    }

    // 4. Live state matches the ledger tail
    let (expected_state, expected_bias) = match curve.last() {
        Some(point) => (
            point.macro_state,
            point.shock.as_ref().and_then(|s| s.regime_bias),
        ),
        None => (MacroState::initial(), None),
    };
    if snapshot.macro_state != expected_state {
        return Err(SimulationError::StateValidationError(
            "Macro state does not match the last resolved week".to_string(),
        ));
    }
    if snapshot.pending_bias != expected_bias {
        return Err(SimulationError::StateValidationError(
            "Pending regime bias does not match the last shock".to_string(),
        ));
    }

    // 5. Rival played the same weeks
    match (&snapshot.rival, config.rival) {
        (None, None) => {}
        (Some(rival), Some(strategy)) if rival.strategy() == strategy => {
            let rival_curve = rival.curve();
            if rival_curve.initial_value() != config.starting_value
                || rival_curve.len() != resolved
            {
                return Err(SimulationError::StateValidationError(format!(
                    "Rival curve has {} weeks, season has {}",
                    rival_curve.len(),
                    resolved
                )));
            }
            for (player, rival) in curve.points().iter().zip(rival_curve.points()) {
                if rival.week != player.week || rival.adjusted_returns != player.adjusted_returns {
                    return Err(SimulationError::StateValidationError(format!(
                        "Rival week {} does not match the season ledger",
                        rival.week
                    )));
                }
                if !rival.value.is_finite() || rival.value <= 0.0 {
                    return Err(SimulationError::StateValidationError(format!(
                        "Rival week {} has invalid value {}",
                        rival.week, rival.value
                    )));
                }
            }
        }
        _ => {
            return Err(SimulationError::StateValidationError(
                "Rival does not match the season config".to_string(),
            ))
        }
    }

    Ok(())
}
