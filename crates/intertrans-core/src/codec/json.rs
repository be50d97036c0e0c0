//! JSON rendering of engine responses.
//!
//! Decoding accepts both the snake_case keys written by the engine's own
//! JSON dump and the lowerCamelCase keys of protobuf's canonical JSON
//! mapping, where 64-bit integers may arrive as decimal strings. Text and
//! list fields may be absent or `null`; `edge_id`, `parent_edge_id` and
//! `translation_request` may not.

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{IntertransError, IntertransResult};
use crate::models::{
    memo_positions, BatchResponse, EdgeStatus, FuzzyTestCase, TestSuite, TranslationEdge, TranslationPath,
    TranslationRequest, TranslationResponse, UnitTestCase,
};

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntRepr {
    Int(i64),
    Text(String),
}

impl IntRepr {
    fn resolve<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            Self::Int(value) => Ok(value),
            Self::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("expected an integer, got {text:?}"))),
        }
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    IntRepr::deserialize(deserializer)?.resolve()
}

fn lenient_int_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<IntRepr>::deserialize(deserializer)? {
        Some(repr) => repr.resolve(),
        None => Ok(0),
    }
}

/// One per-edge memoization flag. Numbers are read the way the wire
/// format reads a bool: non-zero is set.
#[derive(Deserialize)]
#[serde(untagged)]
enum MemoFlag {
    Flag(bool),
    Number(u64),
}

impl MemoFlag {
    fn is_set(&self) -> bool {
        match *self {
            Self::Flag(flag) => flag,
            Self::Number(value) => value != 0,
        }
    }
}

fn memo_flags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<bool>, D::Error> {
    let flags: Option<Vec<MemoFlag>> = Option::deserialize(deserializer)?;
    Ok(flags
        .unwrap_or_default()
        .iter()
        .map(MemoFlag::is_set)
        .collect())
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct BatchDoc {
    #[serde(default, deserialize_with = "nullable", alias = "translationResponses")]
    translation_responses: Vec<ResponseDoc>,
}

#[derive(Serialize, Deserialize)]
struct ResponseDoc {
    #[serde(alias = "translationRequest")]
    translation_request: RequestDoc,
    #[serde(default, deserialize_with = "nullable")]
    paths: Vec<PathDoc>,
}

#[derive(Serialize, Deserialize)]
struct RequestDoc {
    #[serde(default, deserialize_with = "nullable")]
    id: String,
    #[serde(default, deserialize_with = "nullable", alias = "seedLanguage")]
    seed_language: String,
    #[serde(default, deserialize_with = "nullable", alias = "targetLanguage")]
    target_language: String,
    #[serde(default, deserialize_with = "nullable", alias = "seedCode")]
    seed_code: String,
}

#[derive(Serialize, Deserialize)]
struct PathDoc {
    #[serde(default, deserialize_with = "nullable", alias = "translationEdges")]
    translation_edges: Vec<EdgeDoc>,
    #[serde(default, deserialize_with = "memo_flags", alias = "edgeIndexMemoized")]
    edge_index_memoized: Vec<bool>,
}

#[derive(Serialize, Deserialize)]
struct EdgeDoc {
    #[serde(deserialize_with = "lenient_int", alias = "edgeId")]
    edge_id: i64,
    #[serde(deserialize_with = "lenient_int", alias = "parentEdgeId")]
    parent_edge_id: i64,
    #[serde(default, deserialize_with = "nullable", alias = "inputLanguage")]
    input_language: String,
    #[serde(default, deserialize_with = "nullable", alias = "targetLanguage")]
    target_language: String,
    #[serde(default, deserialize_with = "lenient_int_or_null", skip_serializing_if = "is_zero")]
    level: i64,
    #[serde(default, deserialize_with = "nullable")]
    status: String,
    #[serde(default, deserialize_with = "nullable", alias = "extractedSourceCode")]
    extracted_source_code: String,
    #[serde(default, deserialize_with = "nullable", alias = "inferenceOutput")]
    inference_output: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        alias = "fuzzyTests",
        skip_serializing_if = "Vec::is_empty"
    )]
    fuzzy_tests: Vec<FuzzyDoc>,
    #[serde(
        default,
        deserialize_with = "nullable",
        alias = "unitTests",
        skip_serializing_if = "Vec::is_empty"
    )]
    unit_tests: Vec<UnitDoc>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    prompt: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        alias = "sourceCode",
        skip_serializing_if = "String::is_empty"
    )]
    source_code: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_false")]
    success: bool,
    #[serde(
        default,
        deserialize_with = "lenient_int_or_null",
        alias = "wallTimeInference",
        skip_serializing_if = "is_zero"
    )]
    wall_time_inference: i64,
    #[serde(
        default,
        deserialize_with = "lenient_int_or_null",
        alias = "wallTimeTestExecution",
        skip_serializing_if = "is_zero"
    )]
    wall_time_test_execution: i64,
    #[serde(
        default,
        deserialize_with = "nullable",
        alias = "usedInferenceCache",
        skip_serializing_if = "is_false"
    )]
    used_inference_cache: bool,
}

#[derive(Serialize, Deserialize)]
struct FuzzyDoc {
    #[serde(default, deserialize_with = "nullable", alias = "stdinInput")]
    stdin_input: String,
    #[serde(default, deserialize_with = "nullable", alias = "expectedOutput")]
    expected_output: String,
    #[serde(default, alias = "actualOutput", skip_serializing_if = "Option::is_none")]
    actual_output: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    passed: bool,
    #[serde(default, deserialize_with = "nullable", alias = "executedCode")]
    executed_code: String,
}

#[derive(Serialize, Deserialize)]
struct UnitDoc {
    #[serde(default, deserialize_with = "nullable", alias = "sourceCode")]
    source_code: String,
    #[serde(default, alias = "actualOutput", skip_serializing_if = "Option::is_none")]
    actual_output: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    passed: bool,
    #[serde(default, deserialize_with = "nullable", alias = "executedCode")]
    executed_code: String,
}

// ---------------------------------------------------------------------------
// Document <-> model
// ---------------------------------------------------------------------------

impl From<RequestDoc> for TranslationRequest {
    fn from(doc: RequestDoc) -> Self {
        Self {
            id: doc.id,
            seed_language: doc.seed_language,
            target_language: doc.target_language,
            seed_code: doc.seed_code,
        }
    }
}

impl From<&TranslationRequest> for RequestDoc {
    fn from(request: &TranslationRequest) -> Self {
        Self {
            id: request.id.clone(),
            seed_language: request.seed_language.clone(),
            target_language: request.target_language.clone(),
            seed_code: request.seed_code.clone(),
        }
    }
}

impl TryFrom<PathDoc> for TranslationPath {
    type Error = IntertransError;

    fn try_from(doc: PathDoc) -> IntertransResult<Self> {
        Ok(Self {
            translation_edges: doc.translation_edges.into_iter().map(Into::into).collect(),
            edge_index_memoized: memo_positions(doc.edge_index_memoized)?,
        })
    }
}

impl From<EdgeDoc> for TranslationEdge {
    fn from(doc: EdgeDoc) -> Self {
        let fuzzy = doc
            .fuzzy_tests
            .into_iter()
            .map(|t| FuzzyTestCase {
                stdin_input: t.stdin_input,
                expected_output: t.expected_output,
                actual_output: t.actual_output,
                passed: t.passed,
                executed_code: t.executed_code,
            })
            .collect();
        let unit = doc
            .unit_tests
            .into_iter()
            .map(|t| UnitTestCase {
                source_code: t.source_code,
                actual_output: t.actual_output,
                passed: t.passed,
                executed_code: t.executed_code,
            })
            .collect();
        Self {
            edge_id: doc.edge_id,
            parent_edge_id: doc.parent_edge_id,
            input_language: doc.input_language,
            target_language: doc.target_language,
            level: doc.level,
            status: EdgeStatus::parse(&doc.status),
            extracted_source_code: doc.extracted_source_code,
            inference_output: doc.inference_output,
            prompt: doc.prompt,
            source_code: doc.source_code,
            success: doc.success,
            wall_time_inference_ms: doc.wall_time_inference,
            wall_time_test_execution_ms: doc.wall_time_test_execution,
            used_inference_cache: doc.used_inference_cache,
            tests: TestSuite::from_collections(fuzzy, unit),
        }
    }
}

impl From<&TranslationEdge> for EdgeDoc {
    fn from(edge: &TranslationEdge) -> Self {
        Self {
            edge_id: edge.edge_id,
            parent_edge_id: edge.parent_edge_id,
            input_language: edge.input_language.clone(),
            target_language: edge.target_language.clone(),
            level: edge.level,
            status: edge.status.as_str().to_string(),
            extracted_source_code: edge.extracted_source_code.clone(),
            inference_output: edge.inference_output.clone(),
            fuzzy_tests: edge
                .tests
                .fuzzy()
                .iter()
                .map(|t| FuzzyDoc {
                    stdin_input: t.stdin_input.clone(),
                    expected_output: t.expected_output.clone(),
                    actual_output: t.actual_output.clone(),
                    passed: t.passed,
                    executed_code: t.executed_code.clone(),
                })
                .collect(),
            unit_tests: edge
                .tests
                .unit()
                .iter()
                .map(|t| UnitDoc {
                    source_code: t.source_code.clone(),
                    actual_output: t.actual_output.clone(),
                    passed: t.passed,
                    executed_code: t.executed_code.clone(),
                })
                .collect(),
            prompt: edge.prompt.clone(),
            source_code: edge.source_code.clone(),
            success: edge.success,
            wall_time_inference: edge.wall_time_inference_ms,
            wall_time_test_execution: edge.wall_time_test_execution_ms,
            used_inference_cache: edge.used_inference_cache,
        }
    }
}

fn to_doc(batch: &BatchResponse) -> BatchDoc {
    BatchDoc {
        translation_responses: batch
            .translation_responses
            .iter()
            .map(|response| ResponseDoc {
                translation_request: RequestDoc::from(&response.translation_request),
                paths: response
                    .paths
                    .iter()
                    .map(|path| PathDoc {
                        translation_edges: path.translation_edges.iter().map(EdgeDoc::from).collect(),
                        edge_index_memoized: path.memo_flags(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Decode the JSON rendering of a batch response.
pub fn decode_batch_response(text: &str) -> IntertransResult<BatchResponse> {
    let doc: BatchDoc = serde_json::from_str(text)
        .map_err(|e| IntertransError::MalformedResponse(e.to_string()))?;
    let translation_responses = doc
        .translation_responses
        .into_iter()
        .map(|response| {
            Ok(TranslationResponse {
                translation_request: response.translation_request.into(),
                paths: response
                    .paths
                    .into_iter()
                    .map(TranslationPath::try_from)
                    .collect::<IntertransResult<_>>()?,
            })
        })
        .collect::<IntertransResult<_>>()?;
    Ok(BatchResponse {
        translation_responses,
    })
}

/// Render a batch response as pretty-printed JSON.
pub fn encode_batch_response(batch: &BatchResponse) -> IntertransResult<String> {
    Ok(serde_json::to_string_pretty(&to_doc(batch))?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
