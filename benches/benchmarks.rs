//! Criterion benchmarks for the script index builder.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::Rng;
use serde_json::json;

use script_index::engine::{BuildOptions, IndexBuilder};
use script_index::format::LoadedProject;
use script_index::index::normalize_hash;
use script_index::lookup::LookupSource;
use script_index::types::ScriptIndex;

fn random_hex(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| b"0123456789ABCDEF"[rng.gen_range(0..16)] as char)
        .collect()
}

/// Generate project records with `scripts_per_project` scripts each.
fn make_projects(project_count: usize, scripts_per_project: usize) -> Vec<LoadedProject> {
    (0..project_count)
        .map(|p| {
            let scripts: Vec<_> = (0..scripts_per_project)
                .map(|s| {
                    let len = if s % 4 == 0 { 112 } else { 56 };
                    json!({"name": format!("script_{s}"), "scriptHash": random_hex(len), "purpose": "SPEND"})
                })
                .collect();
            let doc = json!({"label": format!("Project {p}"), "category": "DEFI", "scripts": scripts});
            LoadedProject::parse(format!("project_{p}.json"), &doc.to_string()).unwrap()
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let hashes: Vec<String> = (0..1000)
        .map(|i| random_hex(if i % 2 == 0 { 56 } else { 112 }))
        .collect();
    c.bench_function("normalize_1k_hashes", |b| {
        b.iter(|| {
            for h in &hashes {
                criterion::black_box(normalize_hash(h));
            }
        })
    });
}

fn bench_build(c: &mut Criterion) {
    let projects = make_projects(200, 25);
    let source = LookupSource::Absent;

    c.bench_function("build_fresh_5k_scripts", |b| {
        b.iter(|| {
            let records = projects.iter().cloned().map(Ok).collect();
            IndexBuilder::new(&source, BuildOptions::default()).build(ScriptIndex::new(), records)
        })
    });

    let records = projects.iter().cloned().map(Ok).collect();
    let existing = IndexBuilder::new(&source, BuildOptions::default())
        .build(ScriptIndex::new(), records)
        .index;
    c.bench_function("merge_unchanged_5k_scripts", |b| {
        b.iter(|| {
            let records = projects.iter().cloned().map(Ok).collect();
            IndexBuilder::new(&source, BuildOptions::default()).build(existing.clone(), records)
        })
    });
}

criterion_group!(benches, bench_normalize, bench_build);
criterion_main!(benches);
