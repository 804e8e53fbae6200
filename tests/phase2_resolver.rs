//! Phase 2 tests: Metadata resolution and the lookup capability.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use script_index::engine::{MetadataResolver, Resolution};
use script_index::lookup::{prefetch, LookupCache, LookupOutcome, LookupSource, ScriptLookup};
use script_index::types::{
    Classification, IndexError, IndexResult, IndexScriptEntry, ScriptIndex, ScriptRecord,
    ScriptType,
};

/// Lookup backed by a map that counts every call.
struct CountingLookup {
    table: HashMap<String, String>,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingLookup {
    fn new(entries: &[(&str, &str)]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let lookup = Self {
            table: entries
                .iter()
                .map(|(h, t)| (h.to_string(), t.to_string()))
                .collect(),
            calls: calls.clone(),
            fail: false,
        };
        (lookup, calls)
    }
}

impl ScriptLookup for CountingLookup {
    fn lookup(&self, hash: &str) -> IndexResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(IndexError::Lookup("oracle unreachable".into()));
        }
        Ok(self.table.get(hash).cloned())
    }
}

fn hash(c: char) -> String {
    c.to_string().repeat(56)
}

fn script(kind: Option<ScriptType>, version: Option<u32>) -> ScriptRecord {
    ScriptRecord {
        name: "Treasury".into(),
        script_hash: hash('a'),
        purpose: "SPEND".into(),
        script_type: kind,
        plutus_version: version,
    }
}

// ==================== Resolution Order ====================

#[test]
fn test_classified_record_performs_no_lookup() {
    let (lookup, calls) = CountingLookup::new(&[(hash('a').as_str(), "plutusV3")]);
    let source = LookupSource::present(lookup);
    let mut resolver = MetadataResolver::new(&source, LookupCache::new());

    let mut s = script(Some(ScriptType::Plutus), Some(2));
    let before = s.clone();
    let r = resolver.resolve(&ScriptIndex::new(), &hash('a'), &mut s);

    assert_eq!(r, Resolution::AlreadyClassified);
    assert!(!r.marks_dirty());
    assert_eq!(s, before);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_index_hit_skips_lookup() {
    let (lookup, calls) = CountingLookup::new(&[]);
    let source = LookupSource::present(lookup);
    let mut index = ScriptIndex::new();
    index.scripts.insert(
        hash('a'),
        IndexScriptEntry {
            project_id: "acme".into(),
            name: "Treasury".into(),
            purpose: "SPEND".into(),
            script_type: Some(ScriptType::Native),
            plutus_version: Some(0),
        },
    );
    let mut resolver = MetadataResolver::new(&source, LookupCache::new());
    let mut s = script(None, None);
    assert_eq!(
        resolver.resolve(&index, &hash('a'), &mut s),
        Resolution::FromIndex(Classification::native())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_lookup_fills_both_fields() {
    let (lookup, calls) = CountingLookup::new(&[(hash('a').as_str(), "plutusV2")]);
    let source = LookupSource::present(lookup);
    let mut resolver = MetadataResolver::new(&source, LookupCache::new());
    let mut s = script(None, None);
    let r = resolver.resolve(&ScriptIndex::new(), &hash('a'), &mut s);
    assert_eq!(r, Resolution::FromLookup(Classification::plutus(2)));
    assert!(r.marks_dirty());
    assert_eq!(s.script_type, Some(ScriptType::Plutus));
    assert_eq!(s.plutus_version, Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_timelock_maps_to_native_zero() {
    let (lookup, _) = CountingLookup::new(&[(hash('a').as_str(), "timelock")]);
    let source = LookupSource::present(lookup);
    let mut resolver = MetadataResolver::new(&source, LookupCache::new());
    let mut s = script(None, None);
    resolver.resolve(&ScriptIndex::new(), &hash('a'), &mut s);
    assert_eq!(s.script_type, Some(ScriptType::Native));
    assert_eq!(s.plutus_version, Some(0));
}

#[test]
fn test_lookup_failure_is_unresolved() {
    let (mut lookup, calls) = CountingLookup::new(&[(hash('a').as_str(), "plutusV2")]);
    lookup.fail = true;
    let source = LookupSource::present(lookup);
    let mut resolver = MetadataResolver::new(&source, LookupCache::new());
    let mut s = script(None, None);
    assert_eq!(
        resolver.resolve(&ScriptIndex::new(), &hash('a'), &mut s),
        Resolution::Unresolved
    );
    assert!(s.script_type.is_none());
    assert_eq!(resolver.stats().unresolved, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unparseable_classification_is_unresolved() {
    let (lookup, _) = CountingLookup::new(&[(hash('a').as_str(), "wasm")]);
    let source = LookupSource::present(lookup);
    assert_eq!(source.classify(&hash('a')), LookupOutcome::Unresolved);
}

#[test]
fn test_absent_source_is_not_an_error() {
    let source = LookupSource::Absent;
    let mut resolver = MetadataResolver::new(&source, LookupCache::new());
    let mut s = script(None, None);
    assert_eq!(
        resolver.resolve(&ScriptIndex::new(), &hash('a'), &mut s),
        Resolution::NoSource
    );
}

// ==================== Prefetch ====================

#[test]
fn test_prefetched_results_are_used_without_new_calls() {
    let (lookup, calls) = CountingLookup::new(&[(hash('a').as_str(), "plutusV1"), (hash('b').as_str(), "timelock")]);
    let source = LookupSource::present(lookup);
    let hashes = vec![hash('a'), hash('b'), hash('a'), hash('c')];
    let cache = prefetch(&source, &hashes, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let mut resolver = MetadataResolver::new(&source, cache);
    for h in [hash('a'), hash('b'), hash('c')] {
        let mut s = script(None, None);
        resolver.resolve(&ScriptIndex::new(), &h, &mut s);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(resolver.stats().from_lookup, 2);
    assert_eq!(resolver.stats().unresolved, 1);
    assert_eq!(resolver.stats().inline_lookups, 0);
}

#[test]
fn test_prefetch_single_worker_matches_many() {
    let entries: Vec<(String, String)> = (0..20)
        .map(|i| (format!("{i:056x}"), format!("plutusV{}", i % 3 + 1)))
        .collect();
    let borrowed: Vec<(&str, &str)> = entries.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let hashes: Vec<String> = entries.iter().map(|(h, _)| h.clone()).collect();

    let (one, _) = CountingLookup::new(&borrowed);
    let (many, _) = CountingLookup::new(&borrowed);
    let serial = prefetch(&LookupSource::present(one), &hashes, 1);
    let parallel = prefetch(&LookupSource::present(many), &hashes, 7);
    assert_eq!(serial, parallel);
    assert_eq!(serial.len(), 20);
}
