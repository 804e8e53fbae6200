//! High-level operations: metadata resolution and the index build pass.

pub mod build;
pub mod resolve;

pub use build::{
    additions_by_project, renormalize_keys, BuildOptions, BuildOutput, BuildReport, IndexBuilder,
    MergeState, SkippedRecord, StagedRewrite,
};
pub use resolve::{MetadataResolver, Resolution, ResolverStats};
