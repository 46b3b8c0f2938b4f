//! Event logging for season replay and auditing.
//!
//! Every significant step of a week's resolution is recorded as an [`Event`]:
//! - **WeekStarted**: allocation accepted for week k
//! - **MacroAdvanced**: macro state moved (with any shock bias consumed)
//! - **ReturnsGenerated**: base sector returns drawn
//! - **ShockFired**: a catalog shock hit this week
//! - **PortfolioUpdated**: allocation applied, equity curve extended
//! - **SeasonCompleted**: terminal transition
//!
//! # Example
//!
//! ```rust
//! use sector_sim_core_rs::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::PortfolioUpdated {
//!     week: 3,
//!     portfolio_return: 0.012,
//!     value: 1_012_000.0,
//! });
//!
//! assert_eq!(log.events_in_week(3).len(), 1);
//! ```

use crate::market::shocks::ShockKind;
use crate::models::allocation::Allocation;
use crate::models::market::{MacroState, SectorReturns};
use serde::{Deserialize, Serialize};

/// Season event capturing a state change.
///
/// All events carry the week they belong to. Within a week they are logged
/// in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WeekStarted {
        week: usize,
        allocation: Allocation,
    },

    MacroAdvanced {
        week: usize,
        from: MacroState,
        to: MacroState,
        /// A prior-week shock bias was blended into the regime draw
        biased: bool,
    },

    ReturnsGenerated {
        week: usize,
        returns: SectorReturns,
    },

    ShockFired {
        week: usize,
        kind: ShockKind,
        name: String,
    },

    PortfolioUpdated {
        week: usize,
        portfolio_return: f64,
        value: f64,
    },

    SeasonCompleted {
        week: usize,
        final_value: f64,
    },
}

impl Event {
    pub fn week(&self) -> usize {
        match self {
            Event::WeekStarted { week, .. }
            | Event::MacroAdvanced { week, .. }
            | Event::ReturnsGenerated { week, .. }
            | Event::ShockFired { week, .. }
            | Event::PortfolioUpdated { week, .. }
            | Event::SeasonCompleted { week, .. } => *week,
        }
    }

    /// Variant name, for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::WeekStarted { .. } => "WeekStarted",
            Event::MacroAdvanced { .. } => "MacroAdvanced",
            Event::ReturnsGenerated { .. } => "ReturnsGenerated",
            Event::ShockFired { .. } => "ShockFired",
            Event::PortfolioUpdated { .. } => "PortfolioUpdated",
            Event::SeasonCompleted { .. } => "SeasonCompleted",
        }
    }
}

/// Append-only event log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_in_week(&self, week: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.week() == week).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }
}
