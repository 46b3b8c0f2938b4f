//! PyO3 wrapper for the season orchestrator
//!
//! This module provides the Python interface to the Rust engine.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{parse_allocation, parse_season_config, scorecard_to_py, week_report_to_py};
use crate::orchestrator::{Orchestrator, SimulationError};

fn to_py_err(e: SimulationError) -> PyErr {
    match e {
        SimulationError::InvalidAllocation(_) | SimulationError::InvalidConfig(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()),
    }
}

/// Python wrapper for one season
///
/// # Example (from Python)
///
/// ```python
/// from sector_sim_core_rs import Season
///
/// season = Season({"seed": 42, "weeks": 3})
/// while season.phase() != "season_complete":
///     report = season.submit({"Tech": 0.4, "Consumer": 0.6})
///     season.advance()
/// print(season.scorecard()["grade"])
/// ```
#[pyclass(name = "Season")]
pub struct PySeason {
    inner: Orchestrator,
}

#[pymethods]
impl PySeason {
    /// Create a season from a config dict
    ///
    /// Raises ValueError on invalid configuration.
    #[new]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let config = parse_season_config(config)?;
        let inner = Orchestrator::new(config).map_err(to_py_err)?;
        Ok(PySeason { inner })
    }

    /// Resolve the current week; returns the week report dict
    fn submit(&mut self, py: Python, allocation: &Bound<'_, PyDict>) -> PyResult<Py<PyDict>> {
        let allocation = parse_allocation(allocation)?;
        let report = self.inner.submit(allocation).map_err(to_py_err)?;
        week_report_to_py(py, &report)
    }

    /// Move past the resolved week; returns the new phase name
    fn advance(&mut self) -> PyResult<String> {
        let phase = self.inner.advance().map_err(to_py_err)?;
        Ok(phase_name(&phase).to_string())
    }

    /// "awaiting_allocation", "week_resolved" or "season_complete"
    fn phase(&self) -> &'static str {
        phase_name(&self.inner.phase())
    }

    fn current_week(&self) -> Option<usize> {
        self.inner.phase().week()
    }

    fn current_value(&self) -> f64 {
        self.inner.current_value()
    }

    fn scorecard(&self, py: Python) -> PyResult<Py<PyDict>> {
        let card = self.inner.scorecard().map_err(to_py_err)?;
        scorecard_to_py(py, &card)
    }

    /// Full season record as a JSON string
    fn season_record_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.season_record())
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
    }

    fn save_state(&self) -> PyResult<String> {
        self.inner.save_state().map_err(to_py_err)
    }

    #[staticmethod]
    fn load_state(config: &Bound<'_, PyDict>, state_json: &str) -> PyResult<Self> {
        let config = parse_season_config(config)?;
        let inner = Orchestrator::load_state(config, state_json).map_err(to_py_err)?;
        Ok(PySeason { inner })
    }
}

fn phase_name(phase: &crate::orchestrator::SeasonPhase) -> &'static str {
    use crate::orchestrator::SeasonPhase;
    match phase {
        SeasonPhase::AwaitingAllocation { .. } => "awaiting_allocation",
        SeasonPhase::WeekResolved { .. } => "week_resolved",
        SeasonPhase::SeasonComplete => "season_complete",
    }
}
