//! Test-execution timeout statistics.

use crate::errors::IntertransResult;
use crate::models::EdgeTable;
use crate::query::guards::{percentage, TIMEOUT_MARKER};

/// Percentage of executed tests (those with an actual output) that were
/// killed by the executor's timeout.
pub fn timeout_percentage(table: &EdgeTable) -> IntertransResult<f64> {
    let executed = table
        .rows()
        .iter()
        .flat_map(|row| row.tests.iter())
        .filter(|test| test.actual_output.is_some());
    let (mut total, mut timed_out) = (0usize, 0usize);
    for test in executed {
        total += 1;
        if test.contains_marker(TIMEOUT_MARKER) {
            timed_out += 1;
        }
    }
    percentage(timed_out, total, "executed tests")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IntertransError;
    use crate::fixtures::{edge, request, response, scenario_batch, with_outputs};
    use crate::ingest::response_to_rows;
    use crate::models::{BatchResponse, EdgeStatus};

    #[test]
    fn test_timeout_percentage_ignores_unexecuted_tests() {
        let batch = BatchResponse {
            translation_responses: vec![response(
                request("T", "C", "Rust"),
                vec![vec![
                    with_outputs(
                        edge(1, -1, "Rust", EdgeStatus::Failed),
                        &[Some("CMD_TIMEOUT_KILLED"), None, Some("ok")],
                    ),
                    with_outputs(
                        edge(2, -1, "Rust", EdgeStatus::Failed),
                        &[Some("ok"), Some("exit: CMD_TIMEOUT_KILLED")],
                    ),
                ]],
            )],
        };
        let pct = timeout_percentage(&response_to_rows(&batch)).unwrap();
        assert_eq!(pct, 50.0);
    }

    #[test]
    fn test_timeout_percentage_without_executed_tests() {
        let table = response_to_rows(&scenario_batch());
        assert!(matches!(
            timeout_percentage(&table),
            Err(IntertransError::DivisionByZero(_))
        ));
    }
}
