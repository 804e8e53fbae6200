//! Diff tracking: classifies final entries against the loaded index and tallies outcomes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::IndexScriptEntry;

/// How a candidate entry relates to the entry already stored under its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOutcome {
    /// No entry existed under the key.
    Added,
    /// An entry existed and differed in at least one field.
    Updated,
    /// An entry existed and was field-for-field identical.
    Unchanged,
}

impl DiffOutcome {
    /// Return a human-readable name for this outcome.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Classify a candidate against the prior entry. Exact field equality,
/// including the absent state of the optional fields.
pub fn classify(prior: Option<&IndexScriptEntry>, candidate: &IndexScriptEntry) -> DiffOutcome {
    match prior {
        None => DiffOutcome::Added,
        Some(p) if p == candidate => DiffOutcome::Unchanged,
        Some(_) => DiffOutcome::Updated,
    }
}

/// Running tallies of diff outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffTracker {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Additions per projectId. Summary only.
    pub added_by_project: BTreeMap<String, usize>,
}

impl DiffTracker {
    /// Create a tracker with all counts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the final entry for a key against the entry loaded from disk
    /// and count the outcome. Called once per key per run.
    pub fn record(
        &mut self,
        prior: Option<&IndexScriptEntry>,
        current: &IndexScriptEntry,
    ) -> DiffOutcome {
        let outcome = classify(prior, current);
        match outcome {
            DiffOutcome::Added => {
                self.added += 1;
                *self
                    .added_by_project
                    .entry(current.project_id.clone())
                    .or_insert(0) += 1;
            }
            DiffOutcome::Updated => self.updated += 1,
            DiffOutcome::Unchanged => self.unchanged += 1,
        }
        outcome
    }

    /// Whether any entry was added or updated.
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.updated > 0
    }

    /// Total number of candidates seen.
    pub fn total(&self) -> usize {
        self.added + self.updated + self.unchanged
    }
}
