//! Shared typed models for engine responses, outgoing requests, and the
//! flattened edge rows consumed by metrics and tree assembly.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexSet;
use serde::{Serialize, Serializer};

use crate::errors::{IntertransError, IntertransResult};

// ---------------------------------------------------------------------------
// 1. Requests
// ---------------------------------------------------------------------------

/// One originating translation request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationRequest {
    pub id: String,
    pub seed_language: String,
    pub target_language: String,
    pub seed_code: String,
}

/// Outgoing batch submitted to the serving system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchTranslationRequest {
    pub id: String,
    pub translation_requests: Vec<TranslationRequest>,
}

// ---------------------------------------------------------------------------
// 2. Status enumeration
// ---------------------------------------------------------------------------

/// Outcome of a single translation attempt as reported by the engine.
///
/// Text that matches no known status is kept verbatim in
/// [`EdgeStatus::Unrecognized`] so ingest never fails on it; consumers that
/// need a display category reject it instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeStatus {
    Pending,
    Processing,
    Failed,
    Success,
    SkippedParentFailed,
    SkippedTranslationFound,
    TranslationFound,
    FailedNoExtracted,
    FailedNoInference,
    Translated,
    FailedExecution,
    FailedVerification,
    FailedExecutionTimeout,
    SkippedNoExtract,
    Unrecognized(String),
}

impl EdgeStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "PENDING" => Self::Pending,
            "PROCESSING" => Self::Processing,
            "FAILED" => Self::Failed,
            "SUCCESS" => Self::Success,
            "SKIPPED_PARENT_FAILED" => Self::SkippedParentFailed,
            "SKIPPED_TRANSLATION_FOUND" => Self::SkippedTranslationFound,
            "TRANSLATION_FOUND" => Self::TranslationFound,
            "FAILED_NO_EXTRACTED" => Self::FailedNoExtracted,
            "FAILED_NO_INFERENCE" => Self::FailedNoInference,
            "TRANSLATED" => Self::Translated,
            "FAILED_EXECUTION" => Self::FailedExecution,
            "FAILED_VERIFICATION" => Self::FailedVerification,
            "FAILED_EXECUTION_TIMEOUT" => Self::FailedExecutionTimeout,
            "SKIPPED_NO_EXTRACT" => Self::SkippedNoExtract,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Failed => "FAILED",
            Self::Success => "SUCCESS",
            Self::SkippedParentFailed => "SKIPPED_PARENT_FAILED",
            Self::SkippedTranslationFound => "SKIPPED_TRANSLATION_FOUND",
            Self::TranslationFound => "TRANSLATION_FOUND",
            Self::FailedNoExtracted => "FAILED_NO_EXTRACTED",
            Self::FailedNoInference => "FAILED_NO_INFERENCE",
            Self::Translated => "TRANSLATED",
            Self::FailedExecution => "FAILED_EXECUTION",
            Self::FailedVerification => "FAILED_VERIFICATION",
            Self::FailedExecutionTimeout => "FAILED_EXECUTION_TIMEOUT",
            Self::SkippedNoExtract => "SKIPPED_NO_EXTRACT",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_translation_found(&self) -> bool {
        matches!(self, Self::TranslationFound)
    }

    /// Display category used when drawing attempt trees.
    ///
    /// Every known status is listed explicitly; adding a variant without a
    /// category is a compile error.
    pub fn category(&self) -> IntertransResult<DisplayCategory> {
        let category = match self {
            Self::TranslationFound => DisplayCategory::Green,
            Self::Success | Self::Translated => DisplayCategory::Blue,
            Self::Failed
            | Self::FailedNoExtracted
            | Self::FailedNoInference
            | Self::FailedExecution
            | Self::FailedVerification
            | Self::FailedExecutionTimeout => DisplayCategory::Red,
            Self::SkippedTranslationFound
            | Self::SkippedParentFailed
            | Self::SkippedNoExtract
            | Self::Pending
            | Self::Processing => DisplayCategory::Grey,
            Self::Unrecognized(raw) => {
                return Err(IntertransError::UnknownStatus(raw.clone()));
            }
        };
        Ok(category)
    }
}

impl fmt::Display for EdgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EdgeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fixed colour classes for rendered tree nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayCategory {
    Green,
    Blue,
    Red,
    Grey,
    SkyBlue,
}

impl DisplayCategory {
    pub fn color_name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Grey => "grey",
            Self::SkyBlue => "skyblue",
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Test cases
// ---------------------------------------------------------------------------

/// A stdin/stdout comparison test executed against a translation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuzzyTestCase {
    pub stdin_input: String,
    pub expected_output: String,
    pub actual_output: Option<String>,
    pub passed: bool,
    pub executed_code: String,
}

/// A unit test executed against a translation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitTestCase {
    pub source_code: String,
    pub actual_output: Option<String>,
    pub passed: bool,
    pub executed_code: String,
}

/// The test collection attached to an edge. An edge carries fuzzy tests,
/// unit tests, or nothing; fuzzy tests win when both are supplied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TestSuite {
    Fuzzy(Vec<FuzzyTestCase>),
    Unit(Vec<UnitTestCase>),
    #[default]
    None,
}

impl TestSuite {
    pub fn from_collections(fuzzy: Vec<FuzzyTestCase>, unit: Vec<UnitTestCase>) -> Self {
        if !fuzzy.is_empty() {
            Self::Fuzzy(fuzzy)
        } else if !unit.is_empty() {
            Self::Unit(unit)
        } else {
            Self::None
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fuzzy(tests) => tests.len(),
            Self::Unit(tests) => tests.len(),
            Self::None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fuzzy(&self) -> &[FuzzyTestCase] {
        match self {
            Self::Fuzzy(tests) => tests,
            _ => &[],
        }
    }

    pub fn unit(&self) -> &[UnitTestCase] {
        match self {
            Self::Unit(tests) => tests,
            _ => &[],
        }
    }

    /// Project the suite onto uniform test records, in suite order.
    pub fn records(&self) -> Vec<TestRecord> {
        match self {
            Self::Fuzzy(tests) => tests
                .iter()
                .map(|t| TestRecord::new(&t.stdin_input, t.actual_output.as_deref(), t.passed))
                .collect(),
            Self::Unit(tests) => tests
                .iter()
                .map(|t| TestRecord::new(&t.source_code, t.actual_output.as_deref(), t.passed))
                .collect(),
            Self::None => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Response tree
// ---------------------------------------------------------------------------

/// One translation attempt as reported by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationEdge {
    pub edge_id: i64,
    pub parent_edge_id: i64,
    pub input_language: String,
    pub target_language: String,
    /// Engine-assigned expansion level, carried through untouched.
    pub level: i64,
    pub status: EdgeStatus,
    pub extracted_source_code: String,
    pub inference_output: String,
    pub prompt: String,
    pub source_code: String,
    pub success: bool,
    pub wall_time_inference_ms: i64,
    pub wall_time_test_execution_ms: i64,
    pub used_inference_cache: bool,
    pub tests: TestSuite,
}

impl TranslationEdge {
    pub fn new(edge_id: i64, parent_edge_id: i64, status: EdgeStatus) -> Self {
        Self {
            edge_id,
            parent_edge_id,
            input_language: String::new(),
            target_language: String::new(),
            level: 0,
            status,
            extracted_source_code: String::new(),
            inference_output: String::new(),
            prompt: String::new(),
            source_code: String::new(),
            success: false,
            wall_time_inference_ms: 0,
            wall_time_test_execution_ms: 0,
            used_inference_cache: false,
            tests: TestSuite::None,
        }
    }
}

/// One attempt chain explored for a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationPath {
    pub translation_edges: Vec<TranslationEdge>,
    /// Positions within `translation_edges` served from the engine's cache,
    /// decoded from the engine's per-edge flags.
    pub edge_index_memoized: BTreeSet<u32>,
}

impl TranslationPath {
    pub fn is_memoized(&self, index: usize) -> bool {
        u32::try_from(index)
            .map(|i| self.edge_index_memoized.contains(&i))
            .unwrap_or(false)
    }

    /// Memoization as one flag per position, the engine's own encoding.
    /// Covers every edge, and any flagged position beyond the last edge.
    pub fn memo_flags(&self) -> Vec<bool> {
        let width = self
            .edge_index_memoized
            .last()
            .map_or(0, |&i| i as usize + 1)
            .max(self.translation_edges.len());
        (0..width).map(|i| self.is_memoized(i)).collect()
    }
}

/// Collect the positions of set flags.
pub fn memo_positions(flags: impl IntoIterator<Item = bool>) -> IntertransResult<BTreeSet<u32>> {
    let mut positions = BTreeSet::new();
    for (position, flag) in flags.into_iter().enumerate() {
        if flag {
            let position = u32::try_from(position).map_err(|_| {
                IntertransError::MalformedResponse(format!(
                    "memoization flag position {position} out of range"
                ))
            })?;
            positions.insert(position);
        }
    }
    Ok(positions)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationResponse {
    pub translation_request: TranslationRequest,
    pub paths: Vec<TranslationPath>,
}

impl TranslationResponse {
    pub fn edges(&self) -> impl Iterator<Item = &TranslationEdge> {
        self.paths.iter().flat_map(|p| p.translation_edges.iter())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchResponse {
    pub translation_responses: Vec<TranslationResponse>,
}

impl BatchResponse {
    /// Total number of edges across every path of every response.
    pub fn edge_count(&self) -> usize {
        self.translation_responses
            .iter()
            .flat_map(|r| r.paths.iter())
            .map(|p| p.translation_edges.len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// 5. Flattened rows
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Passed,
    Failed,
    NotExecuted,
}

/// A single test result attached to an edge row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestRecord {
    pub input: String,
    pub actual_output: Option<String>,
    pub status: TestStatus,
}

impl TestRecord {
    fn new(input: &str, actual_output: Option<&str>, passed: bool) -> Self {
        let status = match (actual_output, passed) {
            (None, _) => TestStatus::NotExecuted,
            (Some(_), true) => TestStatus::Passed,
            (Some(_), false) => TestStatus::Failed,
        };
        Self {
            input: input.to_string(),
            actual_output: actual_output.map(str::to_string),
            status,
        }
    }

    pub fn contains_marker(&self, marker: &str) -> bool {
        self.actual_output
            .as_deref()
            .is_some_and(|output| output.contains(marker))
    }
}

/// One row per translation attempt, carrying its request context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeRow {
    pub seed_language: String,
    pub request_target_language: String,
    pub request_id: String,
    pub input_language: String,
    pub target_language: String,
    pub level: i64,
    pub edge_id: i64,
    pub parent_edge_id: i64,
    pub status: EdgeStatus,
    pub memoized: bool,
    pub failed_timeout: bool,
    pub extracted_code: String,
    pub inference_output: String,
    pub tests: Vec<TestRecord>,
}

/// Ordered table of edge rows in response, path, edge encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeTable {
    rows: Vec<EdgeRow>,
}

impl EdgeTable {
    pub fn new(rows: Vec<EdgeRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EdgeRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<EdgeRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct request ids in first-seen order.
    pub fn request_ids(&self) -> IndexSet<&str> {
        self.rows.iter().map(|r| r.request_id.as_str()).collect()
    }

    /// Rows belonging to one request, in table order.
    pub fn for_request(&self, request_id: &str) -> Vec<EdgeRow> {
        self.rows
            .iter()
            .filter(|r| r.request_id == request_id)
            .cloned()
            .collect()
    }

    /// Concatenate several tables, keeping each table's order.
    pub fn concat(tables: impl IntoIterator<Item = EdgeTable>) -> Self {
        Self {
            rows: tables.into_iter().flat_map(|t| t.rows).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
