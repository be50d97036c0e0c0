//! Batch builders shared by unit tests.

use crate::models::{
    BatchResponse, EdgeStatus, FuzzyTestCase, TestSuite, TranslationEdge, TranslationPath,
    TranslationRequest, TranslationResponse,
};

pub fn request(id: &str, seed: &str, target: &str) -> TranslationRequest {
    TranslationRequest {
        id: id.to_string(),
        seed_language: seed.to_string(),
        target_language: target.to_string(),
        seed_code: format!("// {seed} seed for {id}"),
    }
}

pub fn edge(edge_id: i64, parent_edge_id: i64, target: &str, status: EdgeStatus) -> TranslationEdge {
    let mut edge = TranslationEdge::new(edge_id, parent_edge_id, status);
    edge.target_language = target.to_string();
    edge
}

pub fn with_outputs(mut edge: TranslationEdge, outputs: &[Option<&str>]) -> TranslationEdge {
    edge.tests = TestSuite::Fuzzy(
        outputs
            .iter()
            .enumerate()
            .map(|(i, output)| FuzzyTestCase {
                stdin_input: format!("input-{i}"),
                expected_output: format!("expected-{i}"),
                actual_output: output.map(str::to_string),
                passed: output.is_some_and(|o| o == format!("expected-{i}")),
                executed_code: String::new(),
            })
            .collect(),
    );
    edge
}

pub fn response(request: TranslationRequest, paths: Vec<Vec<TranslationEdge>>) -> TranslationResponse {
    TranslationResponse {
        translation_request: request,
        paths: paths
            .into_iter()
            .map(|translation_edges| TranslationPath {
                translation_edges,
                edge_index_memoized: Default::default(),
            })
            .collect(),
    }
}

/// Request A translates directly; request B fails directly and succeeds
/// through an intermediate hop.
pub fn scenario_batch() -> BatchResponse {
    let a = response(
        request("A", "C++", "Rust"),
        vec![vec![edge(1, -1, "Rust", EdgeStatus::TranslationFound)]],
    );
    let mut failed = edge(1, -1, "Rust", EdgeStatus::Failed);
    failed.level = 0;
    let mut found = edge(2, 1, "Rust", EdgeStatus::TranslationFound);
    found.level = 1;
    let b = response(request("B", "Python", "Rust"), vec![vec![failed, found]]);
    BatchResponse {
        translation_responses: vec![a, b],
    }
}
