//! Static classification table loaded from a JSON file.

use std::collections::BTreeMap;
use std::path::Path;

use super::ScriptLookup;
use crate::index::normalize_hash;
use crate::types::{IndexError, IndexResult};

/// A `{hash: rawType}` table. Keys are normalized at load time.
pub struct FileLookup {
    table: BTreeMap<String, String>,
    origin: String,
}

impl FileLookup {
    /// Read the table from a JSON object file.
    pub fn load(path: &Path) -> IndexResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&data).map_err(|e| IndexError::json(path, e))?;
        Ok(Self::from_entries(raw, path.display().to_string()))
    }

    /// Build a table from in-memory entries.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, String)>,
        origin: impl Into<String>,
    ) -> Self {
        let table = entries
            .into_iter()
            .map(|(hash, kind)| (normalize_hash(&hash), kind))
            .collect();
        Self {
            table,
            origin: origin.into(),
        }
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl ScriptLookup for FileLookup {
    fn lookup(&self, hash: &str) -> IndexResult<Option<String>> {
        Ok(self.table.get(hash).cloned())
    }

    fn describe(&self) -> String {
        format!("file lookup {}", self.origin)
    }
}
