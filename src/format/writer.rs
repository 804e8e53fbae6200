//! Persistence gate: commits staged project rewrites and the index, or suppresses them.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::engine::BuildOutput;
use crate::types::{IndexError, IndexResult};

/// What the gate did with a build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitOutcome {
    /// Dry run: nothing was written.
    Preview,
    /// Project rewrites and the index were written.
    Committed { projects_rewritten: usize },
}

/// Writes build results to disk unless running dry.
pub struct PersistenceGate {
    dry_run: bool,
}

impl PersistenceGate {
    /// Create a gate; `dry_run` suppresses every write.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Whether this gate suppresses writes.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Commit project rewrites first, then the index.
    ///
    /// An interruption between the two leaves the old index on disk; the
    /// rewritten records re-derive the same classifications on the next run.
    pub fn commit(&self, index_path: &Path, output: &BuildOutput) -> IndexResult<CommitOutcome> {
        if self.dry_run {
            info!(
                "Dry run: skipping {} project rewrites and index write",
                output.staged.len()
            );
            return Ok(CommitOutcome::Preview);
        }

        for rewrite in &output.staged {
            write_json_atomic(&rewrite.path, &rewrite.document)?;
            info!("Back-propagated classifications into {}", rewrite.path.display());
        }
        write_json_atomic(index_path, &output.index)?;
        info!(
            "Wrote index with {} scripts and {} projects to {}",
            output.index.metadata.script_count,
            output.index.metadata.project_count,
            index_path.display()
        );

        Ok(CommitOutcome::Committed {
            projects_rewritten: output.staged.len(),
        })
    }
}

/// Serialize `value` as pretty JSON with a trailing newline.
pub fn to_pretty_json(path: &Path, value: &impl Serialize) -> IndexResult<String> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| IndexError::json(path, e))?;
    text.push('\n');
    Ok(text)
}

/// Write pretty JSON to a sibling temp file and rename it over `path`.
pub fn write_json_atomic(path: &Path, value: &impl Serialize) -> IndexResult<()> {
    let text = to_pretty_json(path, value)?;
    let tmp = temp_path(path);
    {
        let file = std::fs::File::create(&tmp)?;
        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        write_json_atomic(&path, &serde_json::json!({"a": 1})).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(!dir.path().join(".index.json.tmp").exists());
    }

    #[test]
    fn temp_path_is_a_hidden_sibling() {
        let p = Path::new("/data/script-index.json");
        assert_eq!(temp_path(p), PathBuf::from("/data/.script-index.json.tmp"));
    }
}
