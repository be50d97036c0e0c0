//! Locate saved batch responses under a results directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::codec::BatchEncoding;
use crate::errors::{IntertransError, IntertransResult};
use crate::models::EdgeTable;
use crate::store::artifacts::load_table;

/// Saved batches below `dir`, one per stem, sorted by path.
///
/// The binary payload is preferred; a JSON file is only reported when no
/// binary sibling with the same stem exists.
pub fn discover_saved_batches(dir: &Path) -> IntertransResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IntertransError::InvalidParameter(format!(
            "not a directory: {}",
            dir.display()
        )));
    }
    let mut by_stem: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let Some(encoding) = BatchEncoding::from_path(&path) else {
            continue;
        };
        let stem = path.with_extension("");
        match (by_stem.get(&stem), encoding) {
            (Some(existing), BatchEncoding::Json)
                if BatchEncoding::from_path(existing) == Some(BatchEncoding::Binary) => {}
            _ => {
                by_stem.insert(stem, path);
            }
        }
    }
    debug!(dir = %dir.display(), found = by_stem.len(), "discovered saved batches");
    Ok(by_stem.into_values().collect())
}

/// Load every saved batch below `dir` into one table, in path order.
pub fn load_directory(dir: &Path) -> IntertransResult<EdgeTable> {
    let tables = discover_saved_batches(dir)?
        .iter()
        .map(|path| load_table(path))
        .collect::<IntertransResult<Vec<_>>>()?;
    Ok(EdgeTable::concat(tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::scenario_batch;
    use crate::store::artifacts::save_response;
    use crate::store::export::ExportOptions;
    use std::fs;

    #[test]
    fn test_binary_preferred_over_json_sibling() {
        let dir = tempfile::tempdir().unwrap();
        save_response(dir.path(), "b", &scenario_batch(), ExportOptions::default()).unwrap();
        let found = discover_saved_batches(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("b.bin")]);
    }

    #[test]
    fn test_lone_json_is_reported_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let saved =
            save_response(dir.path(), "b", &scenario_batch(), ExportOptions::default()).unwrap();
        fs::copy(&saved.json, dir.path().join("a.json")).unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        fs::copy(&saved.binary, nested.join("c.pb")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let found = discover_saved_batches(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("a.json"),
                dir.path().join("b.bin"),
                nested.join("c.pb"),
            ]
        );
    }

    #[test]
    fn test_missing_directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_saved_batches(&dir.path().join("absent")),
            Err(IntertransError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_load_directory_concatenates_tables() {
        let dir = tempfile::tempdir().unwrap();
        save_response(dir.path(), "one", &scenario_batch(), ExportOptions::default()).unwrap();
        save_response(dir.path(), "two", &scenario_batch(), ExportOptions::default()).unwrap();
        let table = load_directory(dir.path()).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.request_ids().len(), 2);
    }
}
