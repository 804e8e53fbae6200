//! Error types for the script index builder.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur while building the script index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The top-level project record directory does not exist.
    #[error("Project record directory not found: {}", .0.display())]
    RecordsDirMissing(PathBuf),

    /// A project record could not be used.
    #[error("Invalid project record {}: {reason}", .path.display())]
    InvalidRecord { path: PathBuf, reason: String },

    /// A structured-text document failed to parse or serialize.
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The external lookup source failed.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A normalized hash has an unexpected length and strict mode is on.
    #[error("Script hash {hash} has length {len}, expected 56")]
    StrictHashLength { hash: String, len: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Wrap a serde_json error with the path it concerns.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for script index operations.
pub type IndexResult<T> = Result<T, IndexError>;
