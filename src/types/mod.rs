//! All data types for the script index builder.

pub mod error;
pub mod index;
pub mod record;

pub use error::{IndexError, IndexResult};
pub use index::{IndexMetadata, IndexProjectEntry, IndexScriptEntry, ScriptIndex};
pub use record::{Classification, ProjectLink, ProjectRecord, ScriptRecord, ScriptType};

/// Length of a normalized script hash: one 28-byte credential in hex.
pub const NORMALIZED_HASH_LEN: usize = 56;

/// Length of a hash carrying payment and staking credentials back to back.
pub const COMBINED_HASH_LEN: usize = 112;

/// Returns the current time as an RFC 3339 UTC timestamp.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
