//! Flatten nested batch responses into one row per translation attempt.

use tracing::debug;

use crate::codec::{json, wire};
use crate::errors::IntertransResult;
use crate::models::{
    BatchResponse, EdgeRow, EdgeTable, TranslationEdge, TranslationPath, TranslationRequest,
};
use crate::query::guards::TIMEOUT_MARKER;

fn flatten_edge(
    request: &TranslationRequest,
    path: &TranslationPath,
    index: usize,
    edge: &TranslationEdge,
) -> EdgeRow {
    let tests = edge.tests.records();
    let failed_timeout = tests.iter().any(|t| t.contains_marker(TIMEOUT_MARKER));
    EdgeRow {
        seed_language: request.seed_language.clone(),
        request_target_language: request.target_language.clone(),
        request_id: request.id.clone(),
        input_language: edge.input_language.clone(),
        target_language: edge.target_language.clone(),
        level: edge.level,
        edge_id: edge.edge_id,
        parent_edge_id: edge.parent_edge_id,
        status: edge.status.clone(),
        memoized: path.is_memoized(index),
        failed_timeout,
        extracted_code: edge.extracted_source_code.clone(),
        inference_output: edge.inference_output.clone(),
        tests,
    }
}

/// Flatten a decoded batch into rows in response, path, edge order.
pub fn response_to_rows(batch: &BatchResponse) -> EdgeTable {
    let mut rows = Vec::with_capacity(batch.edge_count());
    for response in &batch.translation_responses {
        let request = &response.translation_request;
        for path in &response.paths {
            for (index, edge) in path.translation_edges.iter().enumerate() {
                rows.push(flatten_edge(request, path, index, edge));
            }
        }
    }
    debug!(
        responses = batch.translation_responses.len(),
        rows = rows.len(),
        "flattened batch response"
    );
    EdgeTable::new(rows)
}

/// Decode a serialized batch response and flatten it.
pub fn ingest_binary(data: &[u8]) -> IntertransResult<EdgeTable> {
    let batch = wire::decode_batch_response(data)?;
    Ok(response_to_rows(&batch))
}

/// Decode the JSON rendering of a batch response and flatten it.
pub fn ingest_json(text: &str) -> IntertransResult<EdgeTable> {
    let batch = json::decode_batch_response(text)?;
    Ok(response_to_rows(&batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{edge, request, response, scenario_batch, with_outputs};
    use crate::models::{EdgeStatus, TestStatus, TestSuite, UnitTestCase};

    #[test]
    fn test_row_count_matches_edge_count() {
        let mut batch = scenario_batch();
        batch.translation_responses.push(response(
            request("C", "Go", "Java"),
            vec![
                vec![edge(1, -1, "Java", EdgeStatus::Failed)],
                vec![
                    edge(2, -1, "Rust", EdgeStatus::Translated),
                    edge(3, 2, "Java", EdgeStatus::SkippedTranslationFound),
                ],
            ],
        ));
        let table = response_to_rows(&batch);
        assert_eq!(table.len(), batch.edge_count());
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_rows_follow_encounter_order() {
        let table = response_to_rows(&scenario_batch());
        let order: Vec<(&str, i64)> = table
            .rows()
            .iter()
            .map(|r| (r.request_id.as_str(), r.edge_id))
            .collect();
        assert_eq!(order, vec![("A", 1), ("B", 1), ("B", 2)]);
    }

    #[test]
    fn test_request_fields_copied_to_rows() {
        let table = response_to_rows(&scenario_batch());
        let row = &table.rows()[1];
        assert_eq!(row.seed_language, "Python");
        assert_eq!(row.request_target_language, "Rust");
        assert_eq!(row.request_id, "B");
        assert_eq!(row.parent_edge_id, -1);
        assert_eq!(row.status, EdgeStatus::Failed);
    }

    #[test]
    fn test_memoized_follows_path_positions() {
        let mut batch = scenario_batch();
        batch.translation_responses[1].paths[0]
            .edge_index_memoized
            .insert(1);
        let table = response_to_rows(&batch);
        let memoized: Vec<bool> = table.rows().iter().map(|r| r.memoized).collect();
        assert_eq!(memoized, vec![false, false, true]);
    }

    #[test]
    fn test_failed_timeout_is_row_level() {
        let timed_out = with_outputs(
            edge(1, -1, "Rust", EdgeStatus::Failed),
            &[Some("ok"), Some("killed: CMD_TIMEOUT_KILLED"), None],
        );
        let clean = with_outputs(edge(2, -1, "Rust", EdgeStatus::Failed), &[Some("ok"), None]);
        let batch = BatchResponse {
            translation_responses: vec![response(
                request("T", "C", "Rust"),
                vec![vec![timed_out, clean]],
            )],
        };
        let table = response_to_rows(&batch);
        assert!(table.rows()[0].failed_timeout);
        assert!(!table.rows()[1].failed_timeout);
        assert_eq!(table.rows()[0].tests.len(), 3);
        assert_eq!(table.rows()[0].tests[2].status, TestStatus::NotExecuted);
        assert_eq!(table.rows()[0].tests[2].actual_output, None);
    }

    #[test]
    fn test_unit_tests_used_when_no_fuzzy_tests() {
        let mut e = edge(1, -1, "Rust", EdgeStatus::Failed);
        e.tests = TestSuite::Unit(vec![UnitTestCase {
            source_code: "assert add(1, 2) == 3".to_string(),
            actual_output: Some("CMD_TIMEOUT_KILLED".to_string()),
            passed: false,
            executed_code: String::new(),
        }]);
        let batch = BatchResponse {
            translation_responses: vec![response(request("U", "Python", "Rust"), vec![vec![e]])],
        };
        let table = response_to_rows(&batch);
        let row = &table.rows()[0];
        assert_eq!(row.tests[0].input, "assert add(1, 2) == 3");
        assert!(row.failed_timeout);
    }

    #[test]
    fn test_empty_batch_yields_empty_table() {
        let table = response_to_rows(&BatchResponse::default());
        assert!(table.is_empty());
        assert!(ingest_binary(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_binary_and_json_ingest_identically() {
        let mut batch = scenario_batch();
        batch.translation_responses[0].paths[0].translation_edges[0] = with_outputs(
            edge(1, -1, "Rust", EdgeStatus::TranslationFound),
            &[Some("expected-0"), Some("CMD_TIMEOUT_KILLED"), None],
        );
        batch.translation_responses[1].paths[0]
            .edge_index_memoized
            .insert(0);
        let from_binary = ingest_binary(&wire::encode_batch_response(&batch)).unwrap();
        let from_json = ingest_json(&json::encode_batch_response(&batch).unwrap()).unwrap();
        assert_eq!(from_binary, from_json);
        assert_eq!(from_binary, response_to_rows(&batch));
    }
}
