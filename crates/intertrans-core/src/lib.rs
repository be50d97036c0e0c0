//! intertrans core library: ingest and analysis of transpilation results.
//!
//! Batch responses from the translation engine arrive in a binary wire form
//! or its JSON rendering. They are flattened into one row per translation
//! attempt, from which this crate computes computational-accuracy metrics,
//! timeout statistics and per-request attempt trees, and writes CSV/binary/
//! JSON artifacts. With the `python` feature it is built as the Python
//! extension module `_intertrans_core` via PyO3.

pub mod client;
pub mod codec;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod models;
pub mod query;
pub mod store;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "python")]
mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: _intertrans_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _intertrans_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register(m)
}
