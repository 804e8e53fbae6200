//! Reads project record files and the existing index from disk.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::Value;

use crate::types::{IndexError, IndexResult, ProjectRecord, ScriptIndex};

/// A project record together with the document it was parsed from.
///
/// The raw document is kept so a back-propagation rewrite preserves key order
/// and every field the builder does not read.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub path: PathBuf,
    pub record: ProjectRecord,
    pub raw: Value,
}

impl LoadedProject {
    /// Parse a project from JSON text.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> IndexResult<Self> {
        let path = path.into();
        let raw: Value = serde_json::from_str(text).map_err(|e| IndexError::json(&path, e))?;
        if !raw.is_object() {
            return Err(IndexError::InvalidRecord {
                path,
                reason: "top level is not an object".to_string(),
            });
        }
        let record: ProjectRecord =
            serde_json::from_value(raw.clone()).map_err(|e| IndexError::json(&path, e))?;
        Ok(Self { path, record, raw })
    }

    /// Read and parse one project file.
    pub fn read(path: &Path) -> IndexResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, &text)
    }
}

/// Every `*.json` file directly inside `dir`, sorted by file name.
pub fn list_record_files(dir: &Path) -> IndexResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IndexError::RecordsDirMissing(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read every project record in `dir`.
///
/// Only a missing directory is an error here. Each file yields its own
/// result so one bad record never stops the pass.
pub fn read_project_records(dir: &Path) -> IndexResult<Vec<IndexResult<LoadedProject>>> {
    let files = list_record_files(dir)?;
    info!("Found {} project records in {}", files.len(), dir.display());
    Ok(files
        .iter()
        .map(|path| {
            LoadedProject::read(path).map_err(|e| match e {
                IndexError::Io(io) => IndexError::InvalidRecord {
                    path: path.clone(),
                    reason: io.to_string(),
                },
                other => other,
            })
        })
        .collect())
}

/// Load the existing index, or start empty when it is absent or unreadable.
pub fn load_index(path: &Path) -> ScriptIndex {
    if !path.exists() {
        info!("No existing index at {}; starting empty", path.display());
        return ScriptIndex::new();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Cannot read index {}: {}; starting empty", path.display(), e);
            return ScriptIndex::new();
        }
    };
    match serde_json::from_str::<ScriptIndex>(&text) {
        Ok(index) => {
            info!(
                "Loaded index with {} scripts and {} projects",
                index.script_count(),
                index.project_count()
            );
            index
        }
        Err(e) => {
            warn!("Corrupt index {}: {}; starting empty", path.display(), e);
            ScriptIndex::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            read_project_records(&missing),
            Err(IndexError::RecordsDirMissing(_))
        ));
    }

    #[test]
    fn lists_only_json_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub.json")).unwrap();
        let files = list_record_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn bad_records_are_reported_individually() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"label": "A"}"#).unwrap();
        std::fs::write(dir.path().join("b.json"), "{ broken").unwrap();
        std::fs::write(dir.path().join("c.json"), "[1, 2]").unwrap();
        let results = read_project_records(dir.path()).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(IndexError::Json { .. })));
        assert!(matches!(results[2], Err(IndexError::InvalidRecord { .. })));
    }

    #[test]
    fn corrupt_or_missing_index_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        assert_eq!(load_index(&path), ScriptIndex::new());
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(load_index(&path), ScriptIndex::new());
    }
}
