//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList, etc.)

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::competition::{RivalStrategy, RivalWeek};
use crate::models::allocation::Allocation;
use crate::models::market::{MacroState, Sector, SectorReturns};
use crate::orchestrator::{SeasonConfig, WeekReport};
use crate::scoring::ScoreCard;

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field from a Python dict with clear error messages.
fn extract_required<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<T>
where
    T: for<'py> FromPyObject<'py>,
{
    dict.get_item(key)?
        .ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Missing required field '{}'", key))
        })?
        .extract()
}

/// Extract a field with a default value if missing.
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: for<'py> FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

// ========================================================================
// Parsers
// ========================================================================

/// Convert Python dict to SeasonConfig
///
/// Only `seed` is required; everything else falls back to the defaults.
pub fn parse_season_config(py_config: &Bound<'_, PyDict>) -> PyResult<SeasonConfig> {
    let defaults = SeasonConfig::new(extract_required(py_config, "seed")?);
    Ok(SeasonConfig {
        weeks: extract_with_default(py_config, "weeks", defaults.weeks)?,
        player_name: extract_with_default(py_config, "player_name", defaults.player_name.clone())?,
        starting_value: extract_with_default(py_config, "starting_value", defaults.starting_value)?,
        shock_probability: extract_with_default(
            py_config,
            "shock_probability",
            defaults.shock_probability,
        )?,
        risk_free_rate: extract_with_default(py_config, "risk_free_rate", defaults.risk_free_rate)?,
        rival: parse_rival(py_config, defaults.rival)?,
        ..defaults
    })
}

/// `"rival"`: strategy name, or None to play solo
fn parse_rival(
    py_config: &Bound<'_, PyDict>,
    default: Option<RivalStrategy>,
) -> PyResult<Option<RivalStrategy>> {
    let Some(value) = py_config.get_item("rival")? else {
        return Ok(default);
    };
    if value.is_none() {
        return Ok(None);
    }
    let name: String = value.extract()?;
    name.parse()
        .map(Some)
        .map_err(PyErr::new::<pyo3::exceptions::PyValueError, _>)
}

/// Convert a `{sector_name: weight}` dict to an (unvalidated) Allocation
///
/// Missing sectors get weight 0; validation happens in the orchestrator.
pub fn parse_allocation(py_alloc: &Bound<'_, PyDict>) -> PyResult<Allocation> {
    let mut weights = [0.0; Sector::COUNT];
    for sector in Sector::ALL {
        weights[sector.index()] = extract_with_default(py_alloc, sector.name(), 0.0)?;
    }
    Ok(Allocation::from_weights(weights))
}

// ========================================================================
// Converters
// ========================================================================

fn returns_to_py<'py>(py: Python<'py>, returns: &SectorReturns) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (sector, value) in returns.iter() {
        dict.set_item(sector.name(), value)?;
    }
    Ok(dict)
}

fn macro_state_to_py<'py>(py: Python<'py>, state: &MacroState) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("regime", format!("{:?}", state.regime))?;
    dict.set_item("rate_direction", format!("{:?}", state.rate_direction))?;
    dict.set_item("volatility", format!("{:?}", state.volatility))?;
    Ok(dict)
}

/// Convert WeekReport to Python dict
pub fn week_report_to_py(py: Python, report: &WeekReport) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("week", report.week)?;
    dict.set_item("macro_state", macro_state_to_py(py, &report.macro_state)?)?;
    dict.set_item("base_returns", returns_to_py(py, &report.base_returns)?)?;
    dict.set_item("adjusted_returns", returns_to_py(py, &report.adjusted_returns)?)?;
    dict.set_item("portfolio_return", report.portfolio_return)?;
    dict.set_item("value", report.value)?;
    dict.set_item("drawdown", report.drawdown)?;

    match &report.shock {
        Some(shock) => {
            let shock_dict = PyDict::new(py);
            shock_dict.set_item("name", &shock.name)?;
            shock_dict.set_item("narrative", &shock.narrative)?;
            let affected: Vec<&str> = shock.affected_sectors().iter().map(|s| s.name()).collect();
            shock_dict.set_item("affected_sectors", PyList::new(py, affected)?)?;
            dict.set_item("shock", shock_dict)?;
        }
        None => dict.set_item("shock", py.None())?,
    }

    let assessment = PyDict::new(py);
    assessment.set_item("risk_score", report.assessment.risk_score)?;
    assessment.set_item("critique", &report.assessment.critique)?;
    assessment.set_item("warnings", PyList::new(py, &report.assessment.warnings)?)?;
    dict.set_item("assessment", assessment)?;

    match &report.rival {
        Some(rival) => dict.set_item("rival", rival_week_to_py(py, rival)?)?,
        None => dict.set_item("rival", py.None())?,
    }

    Ok(dict.into())
}

fn rival_week_to_py<'py>(py: Python<'py>, rival: &RivalWeek) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("name", &rival.name)?;
    dict.set_item("strategy", rival.strategy.as_str())?;
    dict.set_item("portfolio_return", rival.portfolio_return)?;
    dict.set_item("value", rival.value)?;
    let weights = PyDict::new(py);
    for (sector, weight) in rival.allocation.iter() {
        weights.set_item(sector.name(), weight)?;
    }
    dict.set_item("allocation", weights)?;
    Ok(dict)
}

/// Convert ScoreCard to Python dict
pub fn scorecard_to_py(py: Python, card: &ScoreCard) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("initial_value", card.initial_value)?;
    dict.set_item("final_value", card.final_value)?;
    dict.set_item("total_return", card.total_return)?;
    dict.set_item("weeks", card.weeks)?;
    dict.set_item("cagr", card.cagr)?;
    dict.set_item("max_drawdown", card.max_drawdown)?;
    dict.set_item("annualized_volatility", card.annualized_volatility)?;
    dict.set_item("sharpe_ratio", card.sharpe_ratio)?;
    dict.set_item("composite", card.composite)?;
    dict.set_item("grade", card.grade.as_str())?;

    Ok(dict.into())
}
