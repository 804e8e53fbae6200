//! Hash normalization and project id derivation. Pure functions.

use crate::types::{IndexError, IndexResult, COMBINED_HASH_LEN, NORMALIZED_HASH_LEN};

/// Canonicalize a raw script hash into the index key.
///
/// The hash is lower-cased. A 112-character hash (payment credential followed by
/// a staking credential) is cut down to its first 56 characters; the staking
/// suffix is dropped for good. Any other length passes through unchanged.
pub fn normalize_hash(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.chars().count() == COMBINED_HASH_LEN {
        lower.chars().take(NORMALIZED_HASH_LEN).collect()
    } else {
        lower
    }
}

/// Whether a normalized hash has the canonical 56-character length.
pub fn is_canonical_length(hash: &str) -> bool {
    hash.chars().count() == NORMALIZED_HASH_LEN
}

/// Check a normalized hash against the expected length.
///
/// Returns `Ok(true)` for a canonical hash and `Ok(false)` for an unexpected
/// length that is still ingestable. In strict mode an unexpected length is an
/// error instead.
pub fn check_hash_length(hash: &str, strict: bool) -> IndexResult<bool> {
    if is_canonical_length(hash) {
        return Ok(true);
    }
    if strict {
        return Err(IndexError::StrictHashLength {
            hash: hash.to_string(),
            len: hash.chars().count(),
        });
    }
    Ok(false)
}

/// Derive the projectId slug from a display label.
///
/// Lower-cases, collapses every run of non-alphanumeric characters into one
/// `-` and trims dashes at both ends. An empty result means the label is not
/// usable.
pub fn project_id(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;
    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}
