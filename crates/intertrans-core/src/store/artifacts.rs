//! Save and reload batch responses.
//!
//! A saved batch is a triple of sibling files sharing one stem: the binary
//! wire payload (`<name>.bin`), its JSON rendering (`<name>.json`) and the
//! flattened table (`<name>.csv`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::codec::{self, json, wire, BatchEncoding};
use crate::errors::{IntertransError, IntertransResult};
use crate::ingest::response_to_rows;
use crate::models::{BatchResponse, EdgeTable};
use crate::store::export::{write_csv_file, ExportOptions};

/// Paths written by [`save_response`] or [`save_payload`], plus the digest of the binary artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SavedArtifacts {
    pub binary: PathBuf,
    pub json: PathBuf,
    pub csv: PathBuf,
    pub sha256: String,
}

pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn check_stem(name: &str) -> IntertransResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed != name {
        return Err(IntertransError::InvalidParameter(format!(
            "artifact name must be non-empty without surrounding whitespace, got {name:?}"
        )));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(IntertransError::InvalidParameter(format!(
            "artifact name must not contain path components, got {name:?}"
        )));
    }
    Ok(())
}

/// Write `batch` under `dir` as `<name>.bin`, `<name>.json` and `<name>.csv`.
///
/// The binary artifact is the batch re-encoded. Use [`save_payload`] to keep
/// the engine's bytes as received.
pub fn save_response(
    dir: &Path,
    name: &str,
    batch: &BatchResponse,
    options: ExportOptions,
) -> IntertransResult<SavedArtifacts> {
    write_artifacts(dir, name, &wire::encode_batch_response(batch), batch, options)
}

/// Save a binary response exactly as received, deriving the JSON and CSV
/// artifacts from its decoded form.
pub fn save_payload(
    dir: &Path,
    name: &str,
    payload: &[u8],
    options: ExportOptions,
) -> IntertransResult<SavedArtifacts> {
    let batch = wire::decode_batch_response(payload)?;
    write_artifacts(dir, name, payload, &batch, options)
}

fn write_artifacts(
    dir: &Path,
    name: &str,
    payload: &[u8],
    batch: &BatchResponse,
    options: ExportOptions,
) -> IntertransResult<SavedArtifacts> {
    check_stem(name)?;
    fs::create_dir_all(dir)?;

    let binary = dir.join(format!("{name}.{}", BatchEncoding::Binary.extension()));
    let json_path = dir.join(format!("{name}.{}", BatchEncoding::Json.extension()));
    let csv = dir.join(format!("{name}.csv"));

    fs::write(&binary, payload)?;
    fs::write(&json_path, json::encode_batch_response(batch)?)?;

    let table = response_to_rows(batch);
    write_csv_file(&csv, table.rows(), options)?;

    let sha256 = content_digest(payload);
    info!(
        dir = %dir.display(),
        name,
        rows = table.len(),
        bytes = payload.len(),
        %sha256,
        "saved batch response"
    );
    Ok(SavedArtifacts {
        binary,
        json: json_path,
        csv,
        sha256,
    })
}

/// Decode a saved batch, picking the decoder from the file extension.
pub fn load_response(path: &Path) -> IntertransResult<BatchResponse> {
    let encoding = BatchEncoding::from_path(path).ok_or_else(|| {
        IntertransError::InvalidParameter(format!(
            "unsupported batch file extension: {}",
            path.display()
        ))
    })?;
    let data = fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), ?encoding, "loading batch response");
    codec::decode(&data, encoding)
}

pub fn load_table(path: &Path) -> IntertransResult<EdgeTable> {
    Ok(response_to_rows(&load_response(path)?))
}
