//! CLI command implementations.

use serde::Serialize;

use crate::config::BuildConfig;
use crate::engine::{additions_by_project, BuildReport, IndexBuilder};
use crate::format::{load_index, read_project_records, CommitOutcome, PersistenceGate};
use crate::types::{IndexMetadata, IndexResult};

/// What a build run reports to the user.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    /// True when nothing was written.
    pub preview: bool,
    pub outcome: CommitOutcome,
    pub metadata: IndexMetadata,
    pub report: BuildReport,
}

/// Build or merge the index, then commit or preview the result.
pub fn cmd_build(config: &BuildConfig, dry_run: bool) -> IndexResult<BuildSummary> {
    // Fails only when the records directory itself is missing.
    let records = read_project_records(&config.records_dir)?;
    let index = load_index(&config.index_path);

    let source = config.lookup_source();
    let output = IndexBuilder::new(&source, config.build_options()).build(index, records);
    // Releases the lookup agent before any file is written.
    drop(source);

    let gate = PersistenceGate::new(dry_run);
    let outcome = gate.commit(&config.index_path, &output)?;

    Ok(BuildSummary {
        preview: gate.is_dry_run(),
        outcome,
        metadata: output.index.metadata.clone(),
        report: output.report,
    })
}

/// Print a summary as text or JSON.
pub fn print_summary(summary: &BuildSummary, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).unwrap_or_default()
        );
    } else {
        print!("{}", render_summary(summary));
    }
}

/// Render the human-readable summary.
pub fn render_summary(summary: &BuildSummary) -> String {
    let r = &summary.report;
    let mut out = String::new();
    if summary.preview {
        out.push_str("DRY RUN (preview, nothing written)\n");
    }
    out.push_str(&format!(
        "Scripts: {} added, {} updated, {} unchanged\n",
        r.diff.added, r.diff.updated, r.diff.unchanged
    ));
    out.push_str(&format!(
        "Projects: {} added, {} updated, {} unchanged\n",
        r.projects_added.len(),
        r.projects_updated,
        r.projects_unchanged
    ));
    out.push_str(&format!(
        "Index: {} scripts, {} projects (generated {})\n",
        summary.metadata.script_count, summary.metadata.project_count, summary.metadata.generated_at
    ));
    out.push_str(&format!(
        "Classification: {} from index, {} from lookup, {} unresolved\n",
        r.resolver.from_index, r.resolver.from_lookup, r.resolver.unresolved
    ));

    let rows = additions_by_project(r);
    if !rows.is_empty() {
        out.push_str("Additions by project:\n");
        for (project, count) in rows {
            out.push_str(&format!("  {project}: {count}\n"));
        }
    }
    if !r.projects_added.is_empty() {
        out.push_str(&format!("New projects: {}\n", r.projects_added.join(", ")));
    }
    if !r.backpropagated.is_empty() {
        out.push_str(&format!(
            "Back-propagated into {} project records:\n",
            r.backpropagated.len()
        ));
        for path in &r.backpropagated {
            out.push_str(&format!("  {}\n", path.display()));
        }
    }

    let mut warnings = Vec::new();
    if !r.skipped_records.is_empty() {
        warnings.push(format!("{} records skipped", r.skipped_records.len()));
    }
    if r.empty_hashes > 0 {
        warnings.push(format!("{} scripts without hash", r.empty_hashes));
    }
    if r.malformed_hashes > 0 {
        warnings.push(format!("{} hashes of unexpected length", r.malformed_hashes));
    }
    if r.rejected_hashes > 0 {
        warnings.push(format!("{} hashes rejected", r.rejected_hashes));
    }
    if r.rekeyed_legacy > 0 {
        warnings.push(format!("{} legacy keys re-normalized", r.rekeyed_legacy));
    }
    if r.stale_entries > 0 {
        warnings.push(format!("{} stale entries kept", r.stale_entries));
    }
    if !warnings.is_empty() {
        out.push_str(&format!("Notes: {}\n", warnings.join("; ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(preview: bool) -> BuildSummary {
        let mut report = BuildReport::default();
        report.diff.added = 2;
        report.diff.added_by_project.insert("minswap".into(), 2);
        report.projects_added.push("minswap".into());
        report.stale_entries = 1;
        BuildSummary {
            preview,
            outcome: if preview {
                CommitOutcome::Preview
            } else {
                CommitOutcome::Committed {
                    projects_rewritten: 0,
                }
            },
            metadata: IndexMetadata {
                generated_at: "2026-01-01T00:00:00Z".into(),
                script_count: 2,
                project_count: 1,
            },
            report,
        }
    }

    #[test]
    fn preview_is_labelled() {
        let preview = render_summary(&summary(true));
        let committed = render_summary(&summary(false));
        assert!(preview.starts_with("DRY RUN"));
        assert!(!committed.contains("DRY RUN"));
        // Everything after the banner is identical.
        assert!(preview.ends_with(&committed));
    }

    #[test]
    fn lists_additions_and_notes() {
        let text = render_summary(&summary(false));
        assert!(text.contains("Scripts: 2 added, 0 updated, 0 unchanged"));
        assert!(text.contains("  minswap: 2"));
        assert!(text.contains("1 stale entries kept"));
    }
}
