//! External classification oracle: an optional, injected capability.

pub mod file;
pub mod http;
pub mod prefetch;

use log::warn;

use crate::types::{Classification, IndexResult};

pub use file::FileLookup;
pub use http::HttpLookup;
pub use prefetch::{prefetch, LookupCache};

/// Something that can classify a script by its normalized hash.
///
/// Returns the raw classification string (for example `plutusV2` or
/// `timelock`), `Ok(None)` when the hash is unknown, or an error when the
/// source could not answer.
pub trait ScriptLookup: Send + Sync {
    fn lookup(&self, hash: &str) -> IndexResult<Option<String>>;

    /// Short name used in log lines.
    fn describe(&self) -> String {
        "lookup".to_string()
    }
}

/// Result of asking the lookup capability about one hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// No lookup source is configured.
    Absent,
    /// The source returned a classification we understand.
    Resolved(Classification),
    /// Not found, unparseable, or the source failed.
    Unresolved,
}

/// The lookup capability as seen by the resolver. Absence is a variant, not a null.
pub enum LookupSource {
    Absent,
    Present(Box<dyn ScriptLookup>),
}

impl LookupSource {
    /// Wrap a concrete lookup.
    pub fn present(lookup: impl ScriptLookup + 'static) -> Self {
        Self::Present(Box::new(lookup))
    }

    /// Whether a source is configured.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Query the source. Failures of any kind map to `Unresolved`.
    pub fn classify(&self, hash: &str) -> LookupOutcome {
        let lookup = match self {
            Self::Absent => return LookupOutcome::Absent,
            Self::Present(lookup) => lookup,
        };
        match lookup.lookup(hash) {
            Ok(Some(raw)) => match parse_classification(&raw) {
                Some(c) => LookupOutcome::Resolved(c),
                None => {
                    warn!("{}: unrecognized classification {:?} for {}", lookup.describe(), raw, hash);
                    LookupOutcome::Unresolved
                }
            },
            Ok(None) => LookupOutcome::Unresolved,
            Err(e) => {
                warn!("{}: lookup of {} failed: {}", lookup.describe(), hash, e);
                LookupOutcome::Unresolved
            }
        }
    }
}

impl std::fmt::Debug for LookupSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "LookupSource::Absent"),
            Self::Present(l) => write!(f, "LookupSource::Present({})", l.describe()),
        }
    }
}

/// Map a raw classification string to a type and language version.
///
/// `timelock` and `native` mean a native script (version 0). `plutusV<N>`
/// and `plutus:v<N>` mean Plutus version N. Matching is case-insensitive.
pub fn parse_classification(raw: &str) -> Option<Classification> {
    let lower = raw.trim().to_lowercase();
    if lower == "timelock" || lower == "native" {
        return Some(Classification::native());
    }
    let rest = lower.strip_prefix("plutus")?;
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let digits = rest.strip_prefix('v')?;
    digits.parse::<u32>().ok().map(Classification::plutus)
}
