//! Index building and merging: the single sequential pass over project records.

use std::collections::BTreeSet;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use super::resolve::{MetadataResolver, Resolution, ResolverStats};
use crate::format::LoadedProject;
use crate::index::{check_hash_length, normalize_hash, project_id, DiffOutcome, DiffTracker};
use crate::lookup::{prefetch, LookupSource};
use crate::types::{
    now_rfc3339, IndexError, IndexProjectEntry, IndexResult, IndexScriptEntry, ScriptIndex, ScriptRecord,
};

/// Options for a build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Reject scripts whose normalized hash is not 56 characters.
    pub strict_hash_length: bool,
    /// Upper bound on concurrent lookups during prefetch.
    pub lookup_workers: usize,
    /// Fixed generation timestamp. `None` uses the current time.
    pub timestamp: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_hash_length: false,
            lookup_workers: 4,
            timestamp: None,
        }
    }
}

/// A project file queued for a full rewrite with back-propagated fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRewrite {
    pub path: PathBuf,
    pub project_id: String,
    pub document: Value,
}

/// A record that was skipped as a whole.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything a run observed, for the summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub diff: DiffTracker,
    /// projectIds created for the first time in this run.
    pub projects_added: Vec<String>,
    pub projects_updated: usize,
    pub projects_unchanged: usize,
    pub skipped_records: Vec<SkippedRecord>,
    /// Scripts without a hash.
    pub empty_hashes: usize,
    /// Hashes of unexpected length that were indexed anyway.
    pub malformed_hashes: usize,
    /// Hashes of unexpected length rejected in strict mode.
    pub rejected_hashes: usize,
    /// Legacy index keys that were re-normalized on load.
    pub rekeyed_legacy: usize,
    /// Index entries not seen in this run. They are kept.
    pub stale_entries: usize,
    pub resolver: ResolverStats,
    /// Project files staged for back-propagation.
    pub backpropagated: Vec<PathBuf>,
}

impl BuildReport {
    /// Whether the run changed the index content.
    pub fn index_changed(&self) -> bool {
        self.diff.has_changes()
            || !self.projects_added.is_empty()
            || self.projects_updated > 0
            || self.rekeyed_legacy > 0
    }
}

/// Result of a build: the finalized index and the staged rewrites.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub index: ScriptIndex,
    pub staged: Vec<StagedRewrite>,
    pub report: BuildReport,
}

/// Accumulator threaded through every stage of the pass.
///
/// `index` is the live map that resolution reads and candidates overwrite.
/// `prior` is the index as loaded; each key is diffed against it once.
#[derive(Debug, Clone, Default)]
pub struct MergeState {
    pub index: ScriptIndex,
    pub staged: Vec<StagedRewrite>,
    pub report: BuildReport,
    prior: ScriptIndex,
    seen_scripts: BTreeSet<String>,
    seen_projects: Vec<String>,
}

impl MergeState {
    /// Start from a loaded index, re-normalizing any legacy keys.
    pub fn new(index: ScriptIndex) -> Self {
        let (index, rekeyed) = renormalize_keys(index);
        if rekeyed > 0 {
            info!("Re-normalized {} legacy index keys", rekeyed);
        }
        let report = BuildReport {
            rekeyed_legacy: rekeyed,
            ..BuildReport::default()
        };
        Self {
            prior: index.clone(),
            index,
            report,
            ..Self::default()
        }
    }
}

/// Re-key every entry under its normalized hash.
///
/// When the canonical and the legacy key both exist, the canonical entry is
/// kept. Returns the number of legacy keys encountered.
pub fn renormalize_keys(mut index: ScriptIndex) -> (ScriptIndex, usize) {
    let legacy: Vec<String> = index
        .scripts
        .keys()
        .filter(|k| normalize_hash(k) != **k)
        .cloned()
        .collect();
    for key in &legacy {
        if let Some(entry) = index.scripts.remove(key) {
            let canonical = normalize_hash(key);
            if index.scripts.contains_key(&canonical) {
                debug!("Dropping legacy key {}; {} already indexed", key, canonical);
            } else {
                index.scripts.insert(canonical, entry);
            }
        }
    }
    (index, legacy.len())
}

/// Drives the merge of project records into an index.
pub struct IndexBuilder<'a> {
    source: &'a LookupSource,
    options: BuildOptions,
}

impl<'a> IndexBuilder<'a> {
    /// Create a builder over a lookup capability.
    pub fn new(source: &'a LookupSource, options: BuildOptions) -> Self {
        Self { source, options }
    }

    /// Run the whole pass: prefetch, per-project merge, finalize.
    ///
    /// Entries in `records` that failed to load are logged and skipped.
    pub fn build(
        &self,
        index: ScriptIndex,
        records: Vec<IndexResult<LoadedProject>>,
    ) -> BuildOutput {
        let mut state = MergeState::new(index);

        let mut projects = Vec::with_capacity(records.len());
        for record in records {
            match record {
                Ok(project) => projects.push(project),
                Err(e) => {
                    warn!("Skipping record: {}", e);
                    state.report.skipped_records.push(SkippedRecord {
                        path: error_path(&e),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let pending = self.lookup_candidates(&state.index, &projects);
        let cache = prefetch(self.source, &pending, self.options.lookup_workers);
        let mut resolver = MetadataResolver::new(self.source, cache);

        for project in projects {
            state = self.process_project(state, &mut resolver, project);
        }

        state.report.resolver = resolver.stats();
        self.finalize(state)
    }

    /// Hashes that may need the lookup source: incomplete records whose hash
    /// is not already classified in the index.
    fn lookup_candidates(&self, index: &ScriptIndex, projects: &[LoadedProject]) -> Vec<String> {
        if !self.source.is_present() {
            return Vec::new();
        }
        projects
            .iter()
            .flat_map(|p| p.record.scripts.iter())
            .filter(|s| !s.is_classified() && !s.script_hash.is_empty())
            .map(|s| normalize_hash(&s.script_hash))
            .filter(|h| check_hash_length(h, self.options.strict_hash_length).is_ok())
            .filter(|h| !index.scripts.get(h).is_some_and(IndexScriptEntry::is_classified))
            .collect()
    }

    /// Upsert one project and all of its scripts.
    pub fn process_project(
        &self,
        mut state: MergeState,
        resolver: &mut MetadataResolver<'_>,
        project: LoadedProject,
    ) -> MergeState {
        let LoadedProject {
            path,
            record,
            mut raw,
        } = project;

        let label = record.label.as_deref().map(str::trim).unwrap_or_default();
        let id = project_id(label);
        if id.is_empty() {
            warn!("Skipping {}: no usable label", path.display());
            state.report.skipped_records.push(SkippedRecord {
                path,
                reason: "no usable label".to_string(),
            });
            return state;
        }

        let entry = IndexProjectEntry::from_record(label, &record);
        state.index.projects.insert(id.clone(), entry);
        if !state.seen_projects.contains(&id) {
            state.seen_projects.push(id.clone());
        }

        let mut dirty = false;
        for (position, script) in record.scripts.into_iter().enumerate() {
            let (next, filled) = self.process_script(state, resolver, &id, script);
            state = next;
            if let Some(script) = filled {
                write_back(&mut raw, position, &script);
                dirty = true;
            }
        }

        if dirty {
            debug!("Staging rewrite of {}", path.display());
            state.report.backpropagated.push(path.clone());
            state.staged.push(StagedRewrite {
                path,
                project_id: id,
                document: raw,
            });
        }

        state
    }

    /// Normalize, resolve and upsert one script. Returns the script when the
    /// resolver filled fields that must be written back.
    fn process_script(
        &self,
        mut state: MergeState,
        resolver: &mut MetadataResolver<'_>,
        project_id: &str,
        mut script: ScriptRecord,
    ) -> (MergeState, Option<ScriptRecord>) {
        if script.script_hash.is_empty() {
            warn!("{}: script {:?} has no hash", project_id, script.name);
            state.report.empty_hashes += 1;
            return (state, None);
        }

        let hash = normalize_hash(&script.script_hash);
        match check_hash_length(&hash, self.options.strict_hash_length) {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    "{}: script {:?} hash {} has length {}, indexing anyway",
                    project_id,
                    script.name,
                    hash,
                    hash.chars().count()
                );
                state.report.malformed_hashes += 1;
            }
            Err(e) => {
                warn!("{}: rejecting script {:?}: {}", project_id, script.name, e);
                state.report.rejected_hashes += 1;
                return (state, None);
            }
        }

        let resolution = resolver.resolve(&state.index, &hash, &mut script);
        let candidate = IndexScriptEntry::from_record(project_id, &script);
        if let Some(prev) = state.index.scripts.insert(hash.clone(), candidate) {
            if state.seen_scripts.contains(&hash) && prev.project_id != project_id {
                debug!("{} claimed by {} after {}", hash, project_id, prev.project_id);
            }
        }
        state.seen_scripts.insert(hash);

        let filled = match resolution {
            Resolution::FromIndex(_) | Resolution::FromLookup(_) => Some(script),
            _ => None,
        };
        (state, filled)
    }

    /// Diff every touched key against the loaded index, count stale entries,
    /// recompute counts and stamp the timestamp.
    fn finalize(&self, state: MergeState) -> BuildOutput {
        let MergeState {
            mut index,
            staged,
            mut report,
            prior,
            seen_scripts,
            seen_projects,
        } = state;

        for hash in &seen_scripts {
            let Some(current) = index.scripts.get(hash) else {
                continue;
            };
            let outcome = report.diff.record(prior.scripts.get(hash), current);
            if outcome != DiffOutcome::Unchanged {
                debug!("{} {} ({})", outcome.name(), hash, current.project_id);
            }
        }

        for id in seen_projects {
            match (prior.projects.get(&id), index.projects.get(&id)) {
                (None, _) => {
                    info!("New project {}", id);
                    report.projects_added.push(id);
                }
                (Some(prev), Some(current)) if prev == current => report.projects_unchanged += 1,
                _ => report.projects_updated += 1,
            }
        }

        report.stale_entries = index
            .scripts
            .keys()
            .filter(|k| !seen_scripts.contains(*k))
            .count();

        let was_consistent = index.counts_consistent();
        index.recount();
        if report.index_changed() || !was_consistent || index.metadata.generated_at.is_empty() {
            index.metadata.generated_at = self.options.timestamp.clone().unwrap_or_else(now_rfc3339);
        }

        BuildOutput {
            index,
            staged,
            report,
        }
    }
}

/// Merge resolved fields into the raw document's `scripts[position]`.
fn write_back(raw: &mut Value, position: usize, script: &ScriptRecord) {
    let Some(slot) = raw
        .get_mut("scripts")
        .and_then(Value::as_array_mut)
        .and_then(|scripts| scripts.get_mut(position))
        .and_then(Value::as_object_mut)
    else {
        return;
    };
    if let Some(kind) = script.script_type {
        slot.insert("type".to_string(), Value::from(kind.name()));
    }
    if let Some(version) = script.plutus_version {
        slot.insert("plutusVersion".to_string(), Value::from(version));
    }
}

fn error_path(e: &IndexError) -> PathBuf {
    match e {
        IndexError::InvalidRecord { path, .. } | IndexError::Json { path, .. } => path.clone(),
        _ => PathBuf::new(),
    }
}

/// Per-project additions, largest first, for summaries.
pub fn additions_by_project(report: &BuildReport) -> Vec<(String, usize)> {
    let mut rows: Vec<(String, usize)> = report
        .diff
        .added_by_project
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

