//! Python bindings (feature `pyo3`)

pub mod season;
pub mod types;
