//! CLI entry point for the `script-index` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use script_index::cli::commands;
use script_index::config::{load_config, BuildConfig};
use script_index::IndexError;

/// How the run summary is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "script-index",
    about = "Build and merge the script hash index from project records"
)]
struct Cli {
    /// Compute and report the diff without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Reject script hashes whose normalized length is not 56
    #[arg(long)]
    strict: bool,

    /// Directory holding one JSON record per project
    #[arg(long)]
    records_dir: Option<PathBuf>,

    /// Path of the index file to merge into
    #[arg(long)]
    index: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn resolve_config(cli: &Cli) -> Result<BuildConfig, IndexError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BuildConfig::default(),
    };
    config.apply_env()?;
    if let Some(dir) = &cli.records_dir {
        config.records_dir = dir.clone();
    }
    if let Some(index) = &cli.index {
        config.index_path = index.clone();
    }
    if cli.strict {
        config.strict_hash_length = true;
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    let json = cli.format == OutputFormat::Json;

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = resolve_config(&cli).and_then(|config| commands::cmd_build(&config, cli.dry_run));

    match result {
        Ok(summary) => commands::print_summary(&summary, json),
        Err(e) => {
            eprintln!("Error: {}", e);
            let code = match &e {
                IndexError::RecordsDirMissing(_) => 2,
                _ => 1,
            };
            process::exit(code);
        }
    }
}
