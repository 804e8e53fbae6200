//! Script index builder: maintains the lookup index from on-chain script hashes
//! to the projects and scripts that produced them.
//!
//! Project records are read, their script hashes normalized, missing
//! classifications resolved from the index or an external lookup, and the
//! result merged into the existing index with an added/updated/unchanged diff.

pub mod cli;
pub mod config;
pub mod engine;
pub mod format;
pub mod index;
pub mod lookup;
pub mod types;

// Re-export commonly used types at the crate root
pub use config::{load_config, BuildConfig};
pub use engine::{
    BuildOptions, BuildOutput, BuildReport, IndexBuilder, MetadataResolver, Resolution,
    StagedRewrite,
};
pub use format::{load_index, read_project_records, CommitOutcome, LoadedProject, PersistenceGate};
pub use index::{normalize_hash, project_id, DiffOutcome, DiffTracker};
pub use lookup::{FileLookup, HttpLookup, LookupOutcome, LookupSource, ScriptLookup};
pub use types::{
    Classification, IndexError, IndexProjectEntry, IndexResult, IndexScriptEntry, ProjectRecord,
    ScriptIndex, ScriptRecord, ScriptType, NORMALIZED_HASH_LEN,
};
