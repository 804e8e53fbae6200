//! Metadata resolution: fills missing `type` / `plutusVersion` on script records.

use log::debug;

use crate::lookup::{LookupCache, LookupOutcome, LookupSource};
use crate::types::{Classification, ScriptIndex, ScriptRecord};

/// Where a record's classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Both fields were already on the record. Nothing was consulted.
    AlreadyClassified,
    /// Copied from the index entry under the same hash.
    FromIndex(Classification),
    /// Answered by the external lookup source.
    FromLookup(Classification),
    /// The lookup source had no usable answer.
    Unresolved,
    /// No lookup source is configured.
    NoSource,
}

impl Resolution {
    /// Whether the record gained fields and its project file needs a rewrite.
    pub fn marks_dirty(&self) -> bool {
        matches!(self, Self::FromIndex(_) | Self::FromLookup(_))
    }
}

/// Counters kept by the resolver across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResolverStats {
    pub from_index: usize,
    pub from_lookup: usize,
    pub unresolved: usize,
    /// Lookups issued inline, outside the prefetch.
    pub inline_lookups: usize,
}

/// Resolves classification in order: record, index, lookup source.
pub struct MetadataResolver<'a> {
    source: &'a LookupSource,
    cache: LookupCache,
    stats: ResolverStats,
}

impl<'a> MetadataResolver<'a> {
    /// Create a resolver over a lookup source and any prefetched results.
    pub fn new(source: &'a LookupSource, cache: LookupCache) -> Self {
        Self {
            source,
            cache,
            stats: ResolverStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Fill the classification of `script`, whose normalized hash is `hash`.
    ///
    /// Never writes files. Callers use [`Resolution::marks_dirty`] to decide
    /// whether the owning project record needs a rewrite.
    pub fn resolve(
        &mut self,
        index: &ScriptIndex,
        hash: &str,
        script: &mut ScriptRecord,
    ) -> Resolution {
        if script.is_classified() {
            return Resolution::AlreadyClassified;
        }

        if let Some(entry) = index.scripts.get(hash) {
            if let (Some(script_type), Some(plutus_version)) =
                (entry.script_type, entry.plutus_version)
            {
                let c = Classification {
                    script_type,
                    plutus_version,
                };
                script.apply(c);
                self.stats.from_index += 1;
                debug!("{}: classified from index as {}", hash, script_type);
                return Resolution::FromIndex(c);
            }
        }

        if !self.source.is_present() {
            return Resolution::NoSource;
        }

        let outcome = match self.cache.get(hash) {
            Some(outcome) => *outcome,
            None => {
                self.stats.inline_lookups += 1;
                let outcome = self.source.classify(hash);
                self.cache.insert(hash.to_string(), outcome);
                outcome
            }
        };

        match outcome {
            LookupOutcome::Resolved(c) => {
                script.apply(c);
                self.stats.from_lookup += 1;
                debug!("{}: classified by lookup as {}", hash, c.script_type);
                Resolution::FromLookup(c)
            }
            LookupOutcome::Unresolved => {
                self.stats.unresolved += 1;
                Resolution::Unresolved
            }
            LookupOutcome::Absent => Resolution::NoSource,
        }
    }
}
