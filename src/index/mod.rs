//! Pure index helpers: key normalization and diff classification.

pub mod diff;
pub mod normalize;

pub use diff::{classify, DiffOutcome, DiffTracker};
pub use normalize::{check_hash_length, is_canonical_length, normalize_hash, project_id};
