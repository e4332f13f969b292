//! rolodex-merge - contact table consolidation
//!
//! Reads every source table in a directory, oldest first, merges the people
//! they describe, and writes one deduplicated contact table.
//!
//! Progress and every dropped conflicting value are logged to stdout. Any
//! fatal error (unrecognizable name column, duplicate identity) exits
//! non-zero without writing output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rolodex_common::config::ConfigResolver;
use rolodex_merge::{run_merge, MergeOptions};

/// Command-line arguments for rolodex-merge
#[derive(Parser, Debug)]
#[command(name = "rolodex-merge")]
#[command(about = "Consolidate contact tables into one deduplicated table")]
#[command(version)]
struct Args {
    /// Directory containing the source tables
    input_dir: PathBuf,

    /// Consolidated CSV file to write
    output: PathBuf,

    /// Configuration file (overrides ROLODEX_CONFIG and the platform default)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Earlier consolidated table to continue from
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Write a JSON merge report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ROLODEX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Keep records that hold nothing but a name
    #[arg(long)]
    keep_name_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config decides the log level, so it is resolved first and reported after init
    let (config, source) = ConfigResolver::new("rolodex")
        .resolve(args.config.as_deref())
        .context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_target(false)
        .init();

    info!(
        "Starting rolodex-merge v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if source.is_defaults() {
        warn!("{}", source.describe());
    } else {
        info!("{}", source.describe());
    }

    let options = MergeOptions {
        input_dir: args.input_dir,
        output: args.output,
        extension: config.input.extension,
        seed: args.seed,
        report: args.report,
        drop_name_only: config.merge.drop_name_only && !args.keep_name_only,
    };

    run_merge(&options)
        .with_context(|| format!("Merge of {} failed", options.input_dir.display()))?;

    Ok(())
}
