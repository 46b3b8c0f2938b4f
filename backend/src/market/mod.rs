//! Market engine: macro dynamics, sector returns and shock events
//!
//! Every component here is a pure function of its inputs plus the shared
//! [`RngManager`](crate::rng::RngManager). None of them keeps state between
//! weeks; the orchestrator owns the live macro state and the pending regime
//! bias.

pub mod regime;
pub mod returns;
pub mod shocks;

use thiserror::Error;

/// Probability rows may deviate from 1.0 by at most this much
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Malformed static model configuration
///
/// These are startup errors: tables are checked once when an orchestrator is
/// built and are never renormalised to paper over a bad row.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatrixError {
    #[error("{matrix}: row {row} sums to {sum}, expected 1.0")]
    RowSum {
        matrix: &'static str,
        row: usize,
        sum: f64,
    },

    #[error("{matrix}: entry ({row}, {col}) = {value} is not a probability")]
    InvalidProbability {
        matrix: &'static str,
        row: usize,
        col: usize,
        value: f64,
    },

    #[error("{table}: parameter {name} = {value} is out of range")]
    InvalidParameter {
        table: &'static str,
        name: String,
        value: f64,
    },

    #[error("Shock catalog: {0}")]
    InvalidCatalog(String),
}

/// Check that `row` is a probability distribution
pub(crate) fn validate_distribution(
    matrix: &'static str,
    row_index: usize,
    row: &[f64],
) -> Result<(), MatrixError> {
    for (col, value) in row.iter().enumerate() {
        if !value.is_finite() || *value < 0.0 || *value > 1.0 {
            return Err(MatrixError::InvalidProbability {
                matrix,
                row: row_index,
                col,
                value: *value,
            });
        }
    }

    let sum: f64 = row.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(MatrixError::RowSum {
            matrix,
            row: row_index,
            sum,
        });
    }

    Ok(())
}

/// Convex combination `(1 - weight) * base + weight * target`
///
/// If both inputs are distributions and `weight` is in [0, 1] the result is a
/// distribution, so no renormalisation is needed.
pub(crate) fn blend<const N: usize>(base: &[f64; N], target: &[f64; N], weight: f64) -> [f64; N] {
    let mut out = [0.0; N];
    for i in 0..N {
        out[i] = (1.0 - weight) * base[i] + weight * target[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_preserves_mass() {
        let out = blend(&[0.5, 0.5, 0.0], &[0.0, 0.0, 1.0], 0.3);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((out[2] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_validate_distribution_errors() {
        assert!(matches!(
            validate_distribution("t", 0, &[0.5, 0.4]),
            Err(MatrixError::RowSum { .. })
        ));
        assert!(matches!(
            validate_distribution("t", 1, &[1.2, -0.2]),
            Err(MatrixError::InvalidProbability { col: 0, .. })
        ));
        assert!(validate_distribution("t", 0, &[0.25; 4]).is_ok());
    }
}
