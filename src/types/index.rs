//! The generated script index document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::{ProjectLink, ProjectRecord, ScriptRecord, ScriptType};

/// Header block of the index document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    /// RFC 3339 UTC timestamp of the last run that changed the index.
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub script_count: usize,
    #[serde(default)]
    pub project_count: usize,
}

/// One script, keyed in the index by its normalized hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexScriptEntry {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub script_type: Option<ScriptType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plutus_version: Option<u32>,
}

impl IndexScriptEntry {
    /// Build the candidate entry for a script owned by `project_id`.
    pub fn from_record(project_id: &str, script: &ScriptRecord) -> Self {
        Self {
            project_id: project_id.to_string(),
            name: script.name.clone(),
            purpose: script.purpose.clone(),
            script_type: script.script_type,
            plutus_version: script.plutus_version,
        }
    }

    /// Whether both classification fields are present.
    pub fn is_classified(&self) -> bool {
        self.script_type.is_some() && self.plutus_version.is_some()
    }
}

/// One project, keyed in the index by its projectId slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexProjectEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<ProjectLink>,
}

impl IndexProjectEntry {
    /// Take every field from the record (last write wins, no field merge).
    pub fn from_record(label: &str, record: &ProjectRecord) -> Self {
        Self {
            label: label.to_string(),
            category: record.category.clone(),
            sub_category: record.sub_category.clone(),
            link: record
                .website()
                .map(|w| ProjectLink {
                    website: Some(w.to_string()),
                }),
        }
    }
}

/// The aggregate lookup artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptIndex {
    #[serde(default)]
    pub metadata: IndexMetadata,
    #[serde(default)]
    pub scripts: BTreeMap<String, IndexScriptEntry>,
    #[serde(default)]
    pub projects: BTreeMap<String, IndexProjectEntry>,
}

impl ScriptIndex {
    /// Create a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute both counts from the map sizes.
    pub fn recount(&mut self) {
        self.metadata.script_count = self.scripts.len();
        self.metadata.project_count = self.projects.len();
    }

    /// Whether the stored counts agree with the map sizes.
    pub fn counts_consistent(&self) -> bool {
        self.metadata.script_count == self.scripts.len()
            && self.metadata.project_count == self.projects.len()
    }

    /// Number of scripts in the index.
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Number of projects in the index.
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}
