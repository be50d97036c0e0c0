//! Error types for the intertrans core library.

/// Top-level error enum for the intertrans core library.
#[derive(Debug, thiserror::Error)]
pub enum IntertransError {
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Dangling parent: edge {edge_id} refers to unknown parent {parent_edge_id}")]
    DanglingParent { edge_id: i64, parent_edge_id: i64 },

    #[error(
        "Conflicting parent: edge {edge_id} listed under parents {first_parent} and {second_parent}"
    )]
    ConflictingParent {
        edge_id: i64,
        first_parent: i64,
        second_parent: i64,
    },

    #[error("Unknown status: {0:?}")]
    UnknownStatus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(feature = "python")]
impl From<IntertransError> for pyo3::PyErr {
    fn from(err: IntertransError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError, PyZeroDivisionError};

        match &err {
            IntertransError::MalformedResponse(_)
            | IntertransError::InvalidParameter(_)
            | IntertransError::DanglingParent { .. }
            | IntertransError::ConflictingParent { .. }
            | IntertransError::UnknownStatus(_) => PyValueError::new_err(err.to_string()),
            IntertransError::DivisionByZero(_) => PyZeroDivisionError::new_err(err.to_string()),
            IntertransError::Io(_) => PyIOError::new_err(err.to_string()),
            IntertransError::Json(_) | IntertransError::Csv(_) => {
                PyRuntimeError::new_err(err.to_string())
            }
        }
    }
}

pub type IntertransResult<T> = Result<T, IntertransError>;
