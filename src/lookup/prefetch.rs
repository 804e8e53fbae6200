//! Bounded parallel prefetch of lookups ahead of the sequential merge.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::{LookupOutcome, LookupSource};

/// Lookup results keyed by normalized hash.
pub type LookupCache = BTreeMap<String, LookupOutcome>;

/// Look up every distinct hash using at most `workers` threads.
///
/// Results are keyed by hash, so the merge reads them in its own order no
/// matter which worker finished first. Returns an empty cache when no source
/// is configured.
pub fn prefetch(source: &LookupSource, hashes: &[String], workers: usize) -> LookupCache {
    let mut cache = LookupCache::new();
    if !source.is_present() {
        return cache;
    }

    let mut seen = BTreeSet::new();
    let unique: Vec<&str> = hashes
        .iter()
        .map(String::as_str)
        .filter(|h| seen.insert(*h))
        .collect();
    if unique.is_empty() {
        return cache;
    }

    let workers = workers.clamp(1, unique.len());
    let chunk_size = unique.len().div_ceil(workers);
    debug!(
        "prefetching {} lookups on {} workers",
        unique.len(),
        workers
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = unique
            .chunks(chunk_size)
            .map(|part| {
                scope.spawn(move || {
                    part.iter()
                        .map(|hash| (hash.to_string(), source.classify(hash)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            match handle.join() {
                Ok(results) => cache.extend(results),
                Err(_) => warn!("lookup worker panicked; its hashes will be looked up inline"),
            }
        }
    });

    cache
}
