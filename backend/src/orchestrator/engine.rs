//! Orchestrator Engine
//!
//! Owns the live season: macro state, equity curve, RNG and event log. All
//! other components are stateless and are called in a fixed order.
//!
//! # Architecture
//!
//! ```text
//! AwaitingAllocation(k) --submit(allocation)--> WeekResolved(k)
//!     1. Validate allocation (reject before touching any state)
//!     2. Advance macro state (consumes last week's shock bias, if any)
//!     3. Generate base sector returns
//!     4. Maybe fire one shock, apply it to this week's returns
//!     5. Apply allocation, append equity curve point
//!     6. Risk committee review, rival week, observer notification
//!
//! WeekResolved(k) --advance()--> AwaitingAllocation(k + 1)
//!                            `--> SeasonComplete            (k = season length)
//! ```
//!
//! `SeasonComplete` is terminal.
//!
//! # Example
//!
//! ```rust
//! use sector_sim_core_rs::orchestrator::{Orchestrator, SeasonConfig, SeasonPhase};
//! use sector_sim_core_rs::Allocation;
//!
//! let mut config = SeasonConfig::new(42);
//! config.weeks = 3;
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! while !orchestrator.is_complete() {
//!     orchestrator.play_week(Allocation::equal_weight()).unwrap();
//! }
//!
//! assert_eq!(orchestrator.phase(), SeasonPhase::SeasonComplete);
//! let card = orchestrator.scorecard().unwrap();
//! println!("Grade {} (Sharpe {:.2})", card.grade, card.sharpe_ratio);
//! ```

use crate::competition::{RivalPortfolio, RivalRecord, RivalStrategy, RivalWeek};
use crate::core::time::WeekClock;
use crate::market::regime::{MacroStateMachine, RegimeBias};
use crate::market::returns::{RegimeReturnModel, ReturnModel};
use crate::market::shocks::{ShockCatalog, ShockEngine, ShockEvent, DEFAULT_SHOCK_PROBABILITY};
use crate::market::MatrixError;
use crate::models::allocation::{Allocation, AllocationError};
use crate::models::equity::{EquityCurve, EquityCurvePoint};
use crate::models::event::{Event, EventLog};
use crate::models::market::{MacroState, SectorReturns};
use crate::orchestrator::checkpoint::{compute_config_hash, validate_snapshot, SeasonSnapshot};
use crate::risk::{Assessment, RiskCommittee, RulesBasedCommittee, WeekSnapshot};
use crate::rng::RngManager;
use crate::scoring::{ScoreCard, ScoringError, SeasonAnalytics};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default and maximum season length
pub const SEASON_WEEKS: usize = 26;

pub const DEFAULT_STARTING_VALUE: f64 = 1_000_000.0;

pub const DEFAULT_PLAYER_NAME: &str = "Player";

// ============================================================================
// Configuration
// ============================================================================

/// Season-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// Seed for the season's RNG
    pub seed: u64,

    /// Season length in weeks (1..=26)
    pub weeks: usize,

    pub player_name: String,

    /// Portfolio value before week 1
    pub starting_value: f64,

    /// Weekly probability that a shock fires
    pub shock_probability: f64,

    /// Annual risk-free rate used by the Sharpe ratio
    pub risk_free_rate: f64,

    /// Rival manager tracked alongside the player; `None` plays solo
    pub rival: Option<RivalStrategy>,
}

impl SeasonConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            weeks: SEASON_WEEKS,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            starting_value: DEFAULT_STARTING_VALUE,
            shock_probability: DEFAULT_SHOCK_PROBABILITY,
            risk_free_rate: 0.0,
            rival: Some(RivalStrategy::Momentum),
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.weeks == 0 || self.weeks > SEASON_WEEKS {
            return Err(SimulationError::InvalidConfig(format!(
                "weeks must be within 1..={}, got {}",
                SEASON_WEEKS, self.weeks
            )));
        }
        if !self.starting_value.is_finite() || self.starting_value <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "starting_value must be positive, got {}",
                self.starting_value
            )));
        }
        if !(0.0..=1.0).contains(&self.shock_probability) {
            return Err(SimulationError::InvalidConfig(format!(
                "shock_probability must be within [0, 1], got {}",
                self.shock_probability
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(SimulationError::InvalidConfig(
                "risk_free_rate must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Phases, errors, reports
// ============================================================================

/// Position in the season state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SeasonPhase {
    AwaitingAllocation { week: usize },
    WeekResolved { week: usize },
    SeasonComplete,
}

impl SeasonPhase {
    /// Week the phase refers to; `None` once the season is over
    pub fn week(&self) -> Option<usize> {
        match self {
            SeasonPhase::AwaitingAllocation { week } | SeasonPhase::WeekResolved { week } => {
                Some(*week)
            }
            SeasonPhase::SeasonComplete => None,
        }
    }
}

impl fmt::Display for SeasonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonPhase::AwaitingAllocation { week } => write!(f, "awaiting allocation (week {})", week),
            SeasonPhase::WeekResolved { week } => write!(f, "week {} resolved", week),
            SeasonPhase::SeasonComplete => write!(f, "season complete"),
        }
    }
}

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(#[from] AllocationError),

    #[error("Cannot {action} while {phase}")]
    InvalidState {
        phase: SeasonPhase,
        action: &'static str,
    },

    #[error("Model configuration error: {0}")]
    Configuration(#[from] MatrixError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State validation error: {0}")]
    StateValidationError(String),
}

/// Result of one resolved week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub week: usize,
    pub macro_state: MacroState,
    pub base_returns: SectorReturns,
    pub adjusted_returns: SectorReturns,
    pub shock: Option<ShockEvent>,
    pub portfolio_return: f64,
    pub value: f64,
    pub drawdown: f64,
    pub assessment: Assessment,
    /// The rival's result for the same week
    pub rival: Option<RivalWeek>,
}

/// Season summary handed to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub session_id: Uuid,
    pub player_name: String,
    pub seed: u64,
    pub weeks: usize,
    pub phase: SeasonPhase,
    pub curve: EquityCurve,
    /// `None` until at least one week is resolved
    pub scorecard: Option<ScoreCard>,
    pub analytics: SeasonAnalytics,
    pub rival: Option<RivalRecord>,
}

/// Persistence collaborator
///
/// Receives copies of engine output; it cannot reach back into the engine.
pub trait SeasonObserver: Send + Sync {
    fn on_week_resolved(&mut self, _report: &WeekReport) {}

    fn on_season_complete(&mut self, _record: &SeasonRecord) {}
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Single-writer owner of one season
///
/// # Determinism
///
/// All randomness comes from `rng` in a fixed per-week order (macro, returns,
/// shock). Same config + same allocations = identical curve and scorecard.
/// The session id is random but never feeds back into the simulation.
pub struct Orchestrator {
    config: SeasonConfig,

    session_id: Uuid,

    rng: RngManager,

    clock: WeekClock,

    phase: SeasonPhase,

    /// Macro state of the most recently resolved week
    macro_state: MacroState,

    /// Bias left by last week's shock, consumed by the next transition
    pending_bias: Option<RegimeBias>,

    macro_machine: MacroStateMachine,

    return_model: Box<dyn ReturnModel>,

    shock_engine: ShockEngine,

    risk_committee: Box<dyn RiskCommittee>,

    observers: Vec<Box<dyn SeasonObserver>>,

    /// Owns a separate RNG; never touches `rng`
    rival: Option<RivalPortfolio>,

    curve: EquityCurve,

    event_log: EventLog,
}

impl Orchestrator {
    /// Create a season from configuration
    ///
    /// Validates the config and every static model table; a malformed table
    /// is fatal here and never renormalised later.
    pub fn new(config: SeasonConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let macro_machine = MacroStateMachine::default();
        macro_machine.validate()?;

        let return_model: Box<dyn ReturnModel> = Box::new(RegimeReturnModel::new());
        return_model.validate()?;

        let shock_engine = ShockEngine::new(ShockCatalog::standard(), config.shock_probability);
        shock_engine.validate()?;

        let session_id = Uuid::new_v4();
        info!(
            %session_id,
            seed = config.seed,
            weeks = config.weeks,
            player = %config.player_name,
            "season created"
        );

        Ok(Self {
            rng: RngManager::new(config.seed),
            clock: WeekClock::new(config.weeks),
            phase: SeasonPhase::AwaitingAllocation { week: 1 },
            macro_state: MacroState::initial(),
            pending_bias: None,
            macro_machine,
            return_model,
            shock_engine,
            risk_committee: Box::new(RulesBasedCommittee::new()),
            observers: Vec::new(),
            rival: config
                .rival
                .map(|strategy| RivalPortfolio::new(strategy, config.seed, config.starting_value)),
            curve: EquityCurve::new(config.starting_value),
            event_log: EventLog::new(),
            session_id,
            config,
        })
    }

    /// Replace the return generator
    pub fn with_return_model(
        mut self,
        model: Box<dyn ReturnModel>,
    ) -> Result<Self, SimulationError> {
        model.validate()?;
        self.return_model = model;
        Ok(self)
    }

    /// Replace the risk committee
    pub fn with_risk_committee(mut self, committee: Box<dyn RiskCommittee>) -> Self {
        self.risk_committee = committee;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn SeasonObserver>) {
        self.observers.push(observer);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SeasonConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> SeasonPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SeasonPhase::SeasonComplete
    }

    pub fn clock(&self) -> &WeekClock {
        &self.clock
    }

    /// Macro state of the last resolved week (the initial state before week 1)
    pub fn macro_state(&self) -> &MacroState {
        &self.macro_state
    }

    pub fn pending_bias(&self) -> Option<&RegimeBias> {
        self.pending_bias.as_ref()
    }

    pub fn curve(&self) -> &EquityCurve {
        &self.curve
    }

    pub fn current_value(&self) -> f64 {
        self.curve.current_value()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn rival(&self) -> Option<&RivalPortfolio> {
        self.rival.as_ref()
    }

    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Resolve the current week with `allocation`
    ///
    /// On error nothing has changed and the phase is still
    /// `AwaitingAllocation(k)`.
    pub fn submit(&mut self, allocation: Allocation) -> Result<WeekReport, SimulationError> {
        let week = match self.phase {
            SeasonPhase::AwaitingAllocation { week } => week,
            phase => {
                return Err(SimulationError::InvalidState {
                    phase,
                    action: "submit an allocation",
                })
            }
        };

        if let Err(e) = allocation.validate() {
            warn!(week, error = %e, "allocation rejected");
            return Err(e.into());
        }

        self.event_log.log(Event::WeekStarted { week, allocation });

        // 1. Macro transition
        let previous = self.macro_state;
        let bias = self.pending_bias.take();
        let state = self.macro_machine.advance(&previous, bias.as_ref(), &mut self.rng);
        self.event_log.log(Event::MacroAdvanced {
            week,
            from: previous,
            to: state,
            biased: bias.is_some(),
        });

        // 2. Base returns
        let base_returns = self.return_model.generate(&state, &mut self.rng);
        self.event_log.log(Event::ReturnsGenerated {
            week,
            returns: base_returns,
        });

        // 3. Shock (zero or one)
        let shock = self.shock_engine.maybe_trigger(week, &state, &mut self.rng);
        let adjusted_returns = match &shock {
            Some(event) => {
                self.event_log.log(Event::ShockFired {
                    week,
                    kind: event.kind,
                    name: event.name.clone(),
                });
                self.pending_bias = event.regime_bias;
                event.apply(&base_returns)
            }
            None => base_returns,
        };

        // 4. Portfolio update
        let contributions = allocation.contributions(&adjusted_returns);
        let portfolio_return: f64 = contributions.values().iter().sum();
        let value = self.curve.current_value() * (1.0 + portfolio_return);

        self.curve.append(EquityCurvePoint {
            week,
            value,
            portfolio_return,
            contributions,
            allocation,
            base_returns,
            adjusted_returns,
            macro_state: state,
            shock: shock.clone(),
        });
        self.event_log.log(Event::PortfolioUpdated {
            week,
            portfolio_return,
            value,
        });

        self.macro_state = state;
        self.phase = SeasonPhase::WeekResolved { week };

        // 5. Collaborators (read-only)
        let snapshot = self.build_snapshot(allocation, adjusted_returns, shock.clone());
        let assessment = self.risk_committee.assess(&snapshot);
        debug!(week, risk_score = assessment.risk_score, "risk committee assessed");

        let mut report = WeekReport {
            week,
            macro_state: state,
            base_returns,
            adjusted_returns,
            shock,
            portfolio_return,
            value,
            drawdown: snapshot.drawdown,
            assessment,
            rival: None,
        };
        report.rival = self.rival.as_mut().map(|rival| rival.process_week(&report));

        info!(
            week,
            regime = ?state.regime,
            volatility = ?state.volatility,
            portfolio_return,
            value,
            shock = report.shock.as_ref().map(|s| s.name.as_str()),
            "week resolved"
        );

        for observer in self.observers.iter_mut() {
            observer.on_week_resolved(&report);
        }

        Ok(report)
    }

    /// Move past a resolved week
    pub fn advance(&mut self) -> Result<SeasonPhase, SimulationError> {
        let week = match self.phase {
            SeasonPhase::WeekResolved { week } => week,
            phase => {
                return Err(SimulationError::InvalidState {
                    phase,
                    action: "advance",
                })
            }
        };

        self.clock.advance_week();
        if self.clock.is_complete() {
            self.phase = SeasonPhase::SeasonComplete;
            let final_value = self.curve.current_value();
            self.event_log.log(Event::SeasonCompleted { week, final_value });
            info!(weeks = week, final_value, "season complete");

            let record = self.season_record();
            for observer in self.observers.iter_mut() {
                observer.on_season_complete(&record);
            }
        } else {
            self.phase = SeasonPhase::AwaitingAllocation {
                week: self.clock.current_week(),
            };
        }

        Ok(self.phase)
    }

    /// `submit` then `advance`
    pub fn play_week(&mut self, allocation: Allocation) -> Result<WeekReport, SimulationError> {
        let report = self.submit(allocation)?;
        self.advance()?;
        Ok(report)
    }

    // ========================================================================
    // Collaborator views
    // ========================================================================

    /// Read-only view of the most recently resolved week
    pub fn snapshot(&self) -> Option<WeekSnapshot> {
        let point = self.curve.last()?;
        Some(self.build_snapshot(point.allocation, point.adjusted_returns, point.shock.clone()))
    }

    fn build_snapshot(
        &self,
        allocation: Allocation,
        returns: SectorReturns,
        shock: Option<ShockEvent>,
    ) -> WeekSnapshot {
        WeekSnapshot {
            week: self.curve.len(),
            total_weeks: self.config.weeks,
            macro_state: self.macro_state,
            returns,
            shock,
            allocation,
            value: self.curve.current_value(),
            peak_value: self.curve.peak(),
            drawdown: self.curve.current_drawdown(),
        }
    }

    /// Score the curve so far
    ///
    /// Fails with `InvalidState` before any week has been resolved.
    pub fn scorecard(&self) -> Result<ScoreCard, SimulationError> {
        match ScoreCard::compute(&self.curve, self.config.risk_free_rate) {
            Err(ScoringError::EmptyCurve) => Err(SimulationError::InvalidState {
                phase: self.phase,
                action: "score an empty season",
            }),
            other => Ok(other?),
        }
    }

    pub fn analytics(&self) -> SeasonAnalytics {
        SeasonAnalytics::compute(&self.curve, self.config.risk_free_rate)
    }

    pub fn season_record(&self) -> SeasonRecord {
        SeasonRecord {
            session_id: self.session_id,
            player_name: self.config.player_name.clone(),
            seed: self.config.seed,
            weeks: self.config.weeks,
            phase: self.phase,
            curve: self.curve.clone(),
            scorecard: ScoreCard::compute(&self.curve, self.config.risk_free_rate).ok(),
            analytics: self.analytics(),
            rival: self
                .rival
                .as_ref()
                .map(|rival| rival.record(self.config.risk_free_rate)),
        }
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    /// Serialize the live season to JSON
    ///
    /// Collaborators (return model, committee, observers) are not part of the
    /// snapshot; re-attach them after `load_state`.
    pub fn save_state(&self) -> Result<String, SimulationError> {
        let snapshot = SeasonSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            rng: self.rng.clone(),
            macro_state: self.macro_state,
            pending_bias: self.pending_bias,
            curve: self.curve.clone(),
            event_log: self.event_log.clone(),
            rival: self.rival.clone(),
            config_hash: compute_config_hash(&self.config)?,
        };

        serde_json::to_string(&snapshot).map_err(|e| {
            SimulationError::SerializationError(format!("Snapshot serialization failed: {}", e))
        })
    }

    /// Resume a season saved with [`save_state`](Self::save_state)
    ///
    /// `config` must be the config the season was created with.
    pub fn load_state(config: SeasonConfig, json: &str) -> Result<Self, SimulationError> {
        let snapshot: SeasonSnapshot = serde_json::from_str(json).map_err(|e| {
            SimulationError::SerializationError(format!("Snapshot deserialization failed: {}", e))
        })?;

        let mut orchestrator = Self::new(config)?;
        validate_snapshot(&snapshot, &orchestrator.config)?;

        let current_week = match snapshot.phase {
            SeasonPhase::AwaitingAllocation { week } | SeasonPhase::WeekResolved { week } => week,
            SeasonPhase::SeasonComplete => orchestrator.config.weeks + 1,
        };

        orchestrator.session_id = snapshot.session_id;
        orchestrator.rng = snapshot.rng;
        orchestrator.clock = WeekClock::at(current_week, orchestrator.config.weeks);
        orchestrator.phase = snapshot.phase;
        orchestrator.macro_state = snapshot.macro_state;
        orchestrator.pending_bias = snapshot.pending_bias;
        orchestrator.curve = snapshot.curve;
        orchestrator.event_log = snapshot.event_log;
        orchestrator.rival = snapshot.rival;

        info!(
            session_id = %orchestrator.session_id,
            phase = %orchestrator.phase,
            "season restored from checkpoint"
        );
        Ok(orchestrator)
    }
}

// Manual Debug implementation (collaborators don't implement Debug)
impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase)
            .field("macro_state", &self.macro_state)
            .field("pending_bias", &self.pending_bias)
            .field("weeks_resolved", &self.curve.len())
            .field("value", &self.curve.current_value())
            .field("event_count", &self.event_log.len())
            .finish()
    }
}
