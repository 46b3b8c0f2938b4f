//! Time management for the season
//!
//! The season advances in discrete weeks. Week numbers are 1-based: the
//! first allocation the player makes is for week 1, the last for week
//! `total_weeks`. Once the final week has been resolved and the clock
//! advanced past it, the season is complete.

use serde::{Deserialize, Serialize};

/// Tracks the current week and the season length
///
/// # Example
/// ```
/// use sector_sim_core_rs::WeekClock;
///
/// let mut clock = WeekClock::new(3);
/// assert_eq!(clock.current_week(), 1);
///
/// clock.advance_week();
/// clock.advance_week();
/// assert_eq!(clock.current_week(), 3);
/// assert!(!clock.is_complete());
///
/// clock.advance_week();
/// assert!(clock.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekClock {
    /// Week awaiting (or being) resolved, 1-based
    current_week: usize,
    /// Number of weeks in the season
    total_weeks: usize,
}

impl WeekClock {
    /// Create a clock positioned at week 1
    ///
    /// # Panics
    /// Panics if `total_weeks` is zero
    pub fn new(total_weeks: usize) -> Self {
        assert!(total_weeks > 0, "total_weeks must be positive");
        Self {
            current_week: 1,
            total_weeks,
        }
    }

    /// Restore a clock at an arbitrary position (checkpoint resume)
    pub(crate) fn at(current_week: usize, total_weeks: usize) -> Self {
        assert!(total_weeks > 0, "total_weeks must be positive");
        Self {
            current_week,
            total_weeks,
        }
    }

    /// Move to the next week
    pub fn advance_week(&mut self) {
        self.current_week += 1;
    }

    /// Current week (1-based)
    pub fn current_week(&self) -> usize {
        self.current_week
    }

    /// Season length in weeks
    pub fn total_weeks(&self) -> usize {
        self.total_weeks
    }

    /// True once every week of the season has been resolved
    pub fn is_complete(&self) -> bool {
        self.current_week > self.total_weeks
    }
}
