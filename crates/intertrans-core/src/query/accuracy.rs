//! Computational accuracy (CA) over ingested edge tables.
//!
//! CA is the percentage of distinct requests with at least one
//! `TRANSLATION_FOUND` attempt. All groupings keep the table's encounter
//! order; nothing is re-sorted.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::errors::IntertransResult;
use crate::models::{EdgeTable, TranslationResponse};
use crate::query::guards::{check_top_k, is_root_parent, percentage};

/// CA when each request is limited to its first `k` rows.
pub fn top_k_accuracy(table: &EdgeTable, k: i64) -> IntertransResult<f64> {
    let k = check_top_k(k)?;
    // request id -> (rows seen, found within the first k)
    let mut groups: IndexMap<&str, (usize, bool)> = IndexMap::new();
    for row in table.rows() {
        let (seen, found) = groups.entry(row.request_id.as_str()).or_insert((0, false));
        if *seen < k {
            *seen += 1;
            *found |= row.status.is_translation_found();
        }
    }
    let found = groups.values().filter(|(_, found)| *found).count();
    percentage(found, groups.len(), "requests")
}

/// CA restricted to direct attempts next to CA at any depth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub direct: f64,
    pub all: f64,
}

impl AccuracyReport {
    /// Marginal benefit of intermediate-language hops, in percentage points.
    pub fn improvement(&self) -> f64 {
        self.all - self.direct
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Computational Accuracy - Only direct (baseline): {:.2}%",
            self.direct
        )?;
        writeln!(
            f,
            "Computational Accuracy - Including intermediate langs: {:.2}%",
            self.all
        )?;
        write!(f, "Difference from baseline: {:.2}%", self.improvement())
    }
}

pub fn direct_vs_intermediate_accuracy(table: &EdgeTable) -> IntertransResult<AccuracyReport> {
    let total = table.request_ids().len();
    let mut direct: IndexSet<&str> = IndexSet::new();
    let mut all: IndexSet<&str> = IndexSet::new();
    for row in table.rows().iter().filter(|r| r.status.is_translation_found()) {
        all.insert(row.request_id.as_str());
        if is_root_parent(row.parent_edge_id) {
            direct.insert(row.request_id.as_str());
        }
    }
    Ok(AccuracyReport {
        direct: percentage(direct.len(), total, "requests")?,
        all: percentage(all.len(), total, "requests")?,
    })
}

/// Extracted source of the first successful attempt, in path then edge order.
pub fn first_translation(response: &TranslationResponse) -> Option<&str> {
    response
        .edges()
        .find(|edge| edge.status.is_translation_found())
        .map(|edge| edge.extracted_source_code.as_str())
}
