//! Player allocation across sectors
//!
//! An allocation is a long-only weight vector: each weight in [0, 1], weights
//! summing to 1.0 within `WEIGHT_SUM_TOLERANCE`. Records arriving from a
//! collaborator (UI, Python binding, deserialized JSON) are built with
//! [`Allocation::from_weights`] and checked with [`Allocation::validate`]
//! before the orchestrator touches any state.

use crate::models::market::{Sector, SectorReturns};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum deviation of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Reasons an allocation is rejected
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllocationError {
    #[error("Weight for {sector} is not a finite number")]
    NonFinite { sector: Sector },

    #[error("Weight for {sector} is {weight}, must be within [0, 1]")]
    OutOfRange { sector: Sector, weight: f64 },

    #[error("Weights sum to {total}, must sum to 1.0")]
    BadSum { total: f64 },
}

/// Weight per sector, in `Sector::ALL` order
///
/// # Example
/// ```
/// use sector_sim_core_rs::{Allocation, Sector};
///
/// let alloc = Allocation::new([0.4, 0.1, 0.1, 0.3, 0.1]).unwrap();
/// assert_eq!(alloc.weight(Sector::Tech), 0.4);
///
/// assert!(Allocation::new([0.5, 0.5, 0.5, 0.0, 0.0]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    weights: [f64; Sector::COUNT],
}

impl Allocation {
    /// Build and validate
    pub fn new(weights: [f64; Sector::COUNT]) -> Result<Self, AllocationError> {
        let allocation = Self::from_weights(weights);
        allocation.validate()?;
        Ok(allocation)
    }

    /// Build without validation
    pub fn from_weights(weights: [f64; Sector::COUNT]) -> Self {
        Self { weights }
    }

    /// Build from whole percentages (20.0 = 20%) and validate
    pub fn from_percentages(percentages: [f64; Sector::COUNT]) -> Result<Self, AllocationError> {
        Self::new(percentages.map(|p| p / 100.0))
    }

    /// 20% in every sector
    pub fn equal_weight() -> Self {
        Self::from_weights([1.0 / Sector::COUNT as f64; Sector::COUNT])
    }

    /// 100% in a single sector
    pub fn concentrated(sector: Sector) -> Self {
        let mut weights = [0.0; Sector::COUNT];
        weights[sector.index()] = 1.0;
        Self::from_weights(weights)
    }

    /// Check the long-only, fully-invested invariant
    pub fn validate(&self) -> Result<(), AllocationError> {
        for sector in Sector::ALL {
            let weight = self.weights[sector.index()];
            if !weight.is_finite() {
                return Err(AllocationError::NonFinite { sector });
            }
            if !(0.0..=1.0).contains(&weight) {
                return Err(AllocationError::OutOfRange { sector, weight });
            }
        }

        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AllocationError::BadSum { total });
        }

        Ok(())
    }

    pub fn weight(&self, sector: Sector) -> f64 {
        self.weights[sector.index()]
    }

    pub fn weights(&self) -> &[f64; Sector::COUNT] {
        &self.weights
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Largest single weight
    pub fn max_weight(&self) -> f64 {
        self.weights.iter().copied().fold(0.0, f64::max)
    }

    /// Weight × return per sector; the entries sum to the portfolio return
    pub fn contributions(&self, returns: &SectorReturns) -> SectorReturns {
        let mut contributions = SectorReturns::zero();
        for sector in Sector::ALL {
            contributions.set(sector, self.weight(sector) * returns.get(sector));
        }
        contributions
    }

    /// Iterate `(sector, weight)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Sector, f64)> + '_ {
        Sector::ALL.iter().map(move |s| (*s, self.weights[s.index()]))
    }
}
