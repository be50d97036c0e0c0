//! Python bindings for the `_intertrans_core` extension module.

use std::path::Path;

use pyo3::prelude::*;
use pyo3::wrap_pyfunction;
use serde::Serialize;

use crate::client::{receive_batch, ChannelOptions};
use crate::errors::IntertransError;
use crate::models::EdgeTable;
use crate::query::accuracy::{direct_vs_intermediate_accuracy, top_k_accuracy};
use crate::query::guards::{MAX_TOP_K, MIN_TOP_K, ROOT_PARENT_SENTINEL, TIMEOUT_MARKER};
use crate::query::timeouts::timeout_percentage;
use crate::query::tree::{assemble_request_tree, TranslationTree};
use crate::store::{artifacts, discovery, export};
use crate::{config, ingest};

fn to_python<T: Serialize + ?Sized>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json_str = serde_json::to_string(value).map_err(IntertransError::from)?;
    let json_module = py.import("json")?;
    json_module
        .call_method1("loads", (json_str,))
        .map(|o| o.into())
}

/// Flattened edge rows of one or more batch responses.
#[pyclass(name = "EdgeTable")]
pub struct PyEdgeTable {
    inner: EdgeTable,
}

impl From<EdgeTable> for PyEdgeTable {
    fn from(inner: EdgeTable) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyEdgeTable {
    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "EdgeTable(rows={}, requests={})",
            self.inner.len(),
            self.inner.request_ids().len()
        )
    }

    fn request_ids(&self) -> Vec<String> {
        self.inner
            .request_ids()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn to_records(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, self.inner.rows())
    }

    fn top_k_accuracy(&self, k: i64) -> PyResult<f64> {
        Ok(top_k_accuracy(&self.inner, k)?)
    }

    /// `(direct, all)` accuracy percentages.
    fn direct_vs_intermediate_accuracy(&self) -> PyResult<(f64, f64)> {
        let report = direct_vs_intermediate_accuracy(&self.inner)?;
        Ok((report.direct, report.all))
    }

    fn accuracy_report(&self) -> PyResult<String> {
        Ok(direct_vs_intermediate_accuracy(&self.inner)?.to_string())
    }

    fn timeout_percentage(&self) -> PyResult<f64> {
        Ok(timeout_percentage(&self.inner)?)
    }

    #[pyo3(signature = (path, include_code=None))]
    fn write_csv(&self, path: &str, include_code: Option<bool>) -> PyResult<()> {
        let options = export::ExportOptions {
            include_code: include_code.unwrap_or_else(config::export_code_columns),
        };
        export::write_csv_file(Path::new(path), self.inner.rows(), options)?;
        Ok(())
    }

    /// Tree snapshot for one request, or `None` when it has no rows.
    fn tree(&self, py: Python<'_>, request_id: &str) -> PyResult<PyObject> {
        match assemble_request_tree(&self.inner, request_id)? {
            TranslationTree::Empty => Ok(py.None()),
            TranslationTree::Forest(forest) => to_python(py, &forest.snapshot()),
        }
    }

    fn tree_dot(&self, request_id: &str) -> PyResult<Option<String>> {
        let tree = assemble_request_tree(&self.inner, request_id)?;
        Ok(tree.forest().map(|forest| forest.to_dot()))
    }
}

#[pyfunction]
#[pyo3(name = "ingest_binary")]
fn py_ingest_binary(data: &[u8]) -> PyResult<PyEdgeTable> {
    let batch = receive_batch(data, &ChannelOptions::from_env())?;
    Ok(ingest::response_to_rows(&batch).into())
}

#[pyfunction]
#[pyo3(name = "ingest_json")]
fn py_ingest_json(text: &str) -> PyResult<PyEdgeTable> {
    Ok(ingest::ingest_json(text)?.into())
}

#[pyfunction]
#[pyo3(name = "load_response")]
fn py_load_response(path: &str) -> PyResult<PyEdgeTable> {
    Ok(artifacts::load_table(Path::new(path))?.into())
}

#[pyfunction]
#[pyo3(name = "load_directory")]
fn py_load_directory(dir: &str) -> PyResult<PyEdgeTable> {
    Ok(discovery::load_directory(Path::new(dir))?.into())
}

/// Save a binary batch response as received, plus its `.json` and `.csv`.
#[pyfunction]
#[pyo3(name = "save_response")]
fn py_save_response(py: Python<'_>, dir: &str, name: &str, data: &[u8]) -> PyResult<PyObject> {
    let saved = artifacts::save_payload(
        Path::new(dir),
        name,
        data,
        export::ExportOptions::default(),
    )?;
    to_python(py, &saved)
}

#[pyfunction]
#[pyo3(name = "discover_saved_batches")]
fn py_discover_saved_batches(dir: &str) -> PyResult<Vec<String>> {
    Ok(discovery::discover_saved_batches(Path::new(dir))?
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect())
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("MIN_TOP_K", MIN_TOP_K)?;
    m.add("MAX_TOP_K", MAX_TOP_K)?;
    m.add("TIMEOUT_MARKER", TIMEOUT_MARKER)?;
    m.add("ROOT_PARENT_SENTINEL", ROOT_PARENT_SENTINEL)?;

    m.add_class::<PyEdgeTable>()?;

    m.add_function(wrap_pyfunction!(py_ingest_binary, m)?)?;
    m.add_function(wrap_pyfunction!(py_ingest_json, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_response, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_directory, m)?)?;
    m.add_function(wrap_pyfunction!(py_save_response, m)?)?;
    m.add_function(wrap_pyfunction!(py_discover_saved_batches, m)?)?;
    Ok(())
}
