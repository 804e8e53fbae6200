//! CLI command implementations for the `script-index` tool.

pub mod commands;
