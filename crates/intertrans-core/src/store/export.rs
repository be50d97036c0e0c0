//! Wide tabular export of edge rows.
//!
//! Rows keep their tests as an ordered list; this adapter spreads them into
//! numbered `test_<i>_input` / `test_<i>_actual_output` columns for
//! spreadsheet and dataframe tooling.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::config::export_code_columns;
use crate::errors::IntertransResult;
use crate::models::EdgeRow;

const BASE_COLUMNS: &[&str] = &[
    "seed_language",
    "request_target_language",
    "request_id",
    "input_languages",
    "target_languages",
    "level",
    "edge_id",
    "parent_edge_id",
    "status",
    "memoized",
    "failed_timeout",
];

const CODE_COLUMNS: &[&str] = &["extracted_code", "inference_output"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_code: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_code: export_code_columns(),
        }
    }
}

/// Per test position, whether any row recorded an actual output there.
fn test_layout(rows: &[EdgeRow]) -> Vec<bool> {
    let width = rows.iter().map(|r| r.tests.len()).max().unwrap_or(0);
    let mut has_output = vec![false; width];
    for row in rows {
        for (i, test) in row.tests.iter().enumerate() {
            has_output[i] |= test.actual_output.is_some();
        }
    }
    has_output
}

pub fn header(rows: &[EdgeRow], options: ExportOptions) -> Vec<String> {
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    if options.include_code {
        columns.extend(CODE_COLUMNS.iter().map(|c| c.to_string()));
    }
    for (i, has_output) in test_layout(rows).into_iter().enumerate() {
        columns.push(format!("test_{i}_input"));
        if has_output {
            columns.push(format!("test_{i}_actual_output"));
        }
    }
    columns
}

fn record(row: &EdgeRow, layout: &[bool], options: ExportOptions) -> Vec<String> {
    let mut fields = vec![
        row.seed_language.clone(),
        row.request_target_language.clone(),
        row.request_id.clone(),
        row.input_language.clone(),
        row.target_language.clone(),
        row.level.to_string(),
        row.edge_id.to_string(),
        row.parent_edge_id.to_string(),
        row.status.to_string(),
        row.memoized.to_string(),
        row.failed_timeout.to_string(),
    ];
    if options.include_code {
        fields.push(row.extracted_code.clone());
        fields.push(row.inference_output.clone());
    }
    for (i, &has_output) in layout.iter().enumerate() {
        let test = row.tests.get(i);
        fields.push(test.map(|t| t.input.clone()).unwrap_or_default());
        if has_output {
            fields.push(
                test.and_then(|t| t.actual_output.clone())
                    .unwrap_or_default(),
            );
        }
    }
    fields
}

pub fn write_csv<W: Write>(rows: &[EdgeRow], writer: W, options: ExportOptions) -> IntertransResult<()> {
    let layout = test_layout(rows);
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header(rows, options))?;
    for row in rows {
        csv_writer.write_record(record(row, &layout, options))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, rows: &[EdgeRow], options: ExportOptions) -> IntertransResult<()> {
    let file = File::create(path)?;
    write_csv(rows, file, options)
}
