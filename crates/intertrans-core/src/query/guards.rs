//! Shared guardrails and fixed markers for response analysis.

use crate::errors::{IntertransError, IntertransResult};

// Accuracy guards
pub const MIN_TOP_K: i64 = 1;
pub const MAX_TOP_K: i64 = 10;

// Engine markers
pub const ROOT_PARENT_SENTINEL: i64 = -1;
pub const TIMEOUT_MARKER: &str = "CMD_TIMEOUT_KILLED";
pub const ROOT_STATUS_TAG: &str = "ROOT";

/// Reject a `k` outside `[MIN_TOP_K, MAX_TOP_K]`.
pub fn check_top_k(k: i64) -> IntertransResult<usize> {
    if !(MIN_TOP_K..=MAX_TOP_K).contains(&k) {
        return Err(IntertransError::InvalidParameter(format!(
            "k must be between {MIN_TOP_K} and {MAX_TOP_K}, got {k}"
        )));
    }
    Ok(k as usize)
}

/// Express `numerator / denominator` as a percentage, refusing an empty
/// denominator.
pub fn percentage(numerator: usize, denominator: usize, what: &str) -> IntertransResult<f64> {
    if denominator == 0 {
        return Err(IntertransError::DivisionByZero(format!(
            "no {what} to compute a percentage over"
        )));
    }
    Ok(numerator as f64 / denominator as f64 * 100.0)
}

pub fn is_root_parent(parent_edge_id: i64) -> bool {
    parent_edge_id == ROOT_PARENT_SENTINEL
}
