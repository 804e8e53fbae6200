//! Configuration loading from file and environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::BuildOptions;
use crate::lookup::{FileLookup, HttpLookup, LookupSource};
use crate::types::{IndexError, IndexResult};

/// Settings for one build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding one JSON file per project.
    pub records_dir: PathBuf,
    /// Path of the generated index document.
    pub index_path: PathBuf,
    /// Reject hashes whose normalized length is not 56.
    pub strict_hash_length: bool,
    /// Base URL of the HTTP classification oracle.
    pub lookup_url: Option<String>,
    /// API key sent to the oracle.
    pub lookup_api_key: Option<String>,
    /// Static `{hash: rawType}` table used instead of the oracle.
    pub lookup_file: Option<PathBuf>,
    pub lookup_timeout_secs: u64,
    pub lookup_workers: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            records_dir: PathBuf::from("projects"),
            index_path: PathBuf::from("script-index.json"),
            strict_hash_length: false,
            lookup_url: None,
            lookup_api_key: None,
            lookup_file: None,
            lookup_timeout_secs: 10,
            lookup_workers: 4,
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> IndexResult<BuildConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        IndexError::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    toml::from_str(&content).map_err(|e| IndexError::Config(format!("Failed to parse config: {e}")))
}

impl BuildConfig {
    /// Overlay settings from the process environment.
    pub fn apply_env(&mut self) -> IndexResult<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay settings from any variable source.
    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> IndexResult<()> {
        if let Some(v) = var("SCRIPT_INDEX_RECORDS_DIR") {
            self.records_dir = PathBuf::from(v);
        }
        if let Some(v) = var("SCRIPT_INDEX_PATH") {
            self.index_path = PathBuf::from(v);
        }
        if let Some(v) = var("SCRIPT_INDEX_STRICT") {
            self.strict_hash_length = parse_flag("SCRIPT_INDEX_STRICT", &v)?;
        }
        if let Some(v) = non_empty(var("SCRIPT_LOOKUP_URL")) {
            self.lookup_url = Some(v);
        }
        if let Some(v) = non_empty(var("SCRIPT_LOOKUP_API_KEY")) {
            self.lookup_api_key = Some(v);
        }
        if let Some(v) = non_empty(var("SCRIPT_LOOKUP_FILE")) {
            self.lookup_file = Some(PathBuf::from(v));
        }
        if let Some(v) = var("SCRIPT_LOOKUP_TIMEOUT_SECS") {
            self.lookup_timeout_secs = v.trim().parse().map_err(|_| {
                IndexError::Config(format!("SCRIPT_LOOKUP_TIMEOUT_SECS is not a number: {v}"))
            })?;
        }
        if let Some(v) = var("SCRIPT_LOOKUP_WORKERS") {
            self.lookup_workers = v.trim().parse().map_err(|_| {
                IndexError::Config(format!("SCRIPT_LOOKUP_WORKERS is not a number: {v}"))
            })?;
        }
        Ok(())
    }

    /// Options for the builder.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            strict_hash_length: self.strict_hash_length,
            lookup_workers: self.lookup_workers.max(1),
            timestamp: None,
        }
    }

    /// Construct the lookup capability.
    ///
    /// Nothing configured gives `Absent`. A lookup file that cannot be read
    /// degrades to `Absent` as well, with a warning.
    pub fn lookup_source(&self) -> LookupSource {
        if let Some(path) = &self.lookup_file {
            if self.lookup_url.is_some() {
                warn!("Both a lookup file and a lookup URL are set; using the file");
            }
            return match FileLookup::load(path) {
                Ok(table) => {
                    info!("Using lookup table {} ({} entries)", path.display(), table.len());
                    LookupSource::present(table)
                }
                Err(e) => {
                    warn!("Lookup table unavailable: {}; continuing without lookups", e);
                    LookupSource::Absent
                }
            };
        }
        if let Some(url) = &self.lookup_url {
            info!("Using lookup service {}", url);
            return LookupSource::present(HttpLookup::new(
                url,
                self.lookup_api_key.clone(),
                Duration::from_secs(self.lookup_timeout_secs),
            ));
        }
        info!("No lookup source configured; missing classifications stay absent");
        LookupSource::Absent
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(key: &str, value: &str) -> IndexResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(IndexError::Config(format!("{key} is not a boolean: {other}"))),
    }
}
