//! wiki-changes: revision change diffing and normalization
//!
//! Diffs two rendered wiki revisions and emits a normalized change fragment.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiki_changes::cli::{self, exit_codes, DiffCommandConfig, DiffOutputFormat};

#[derive(Parser)]
#[command(name = "wiki-changes")]
#[command(version)]
#[command(about = "Diff rendered wiki revisions into normalized change fragments", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  No changes detected
    1  Changes detected
    2  Error occurred

EXAMPLES:
    # Diff two rendered revisions
    wiki-changes diff old.html new.html

    # Keep link-target-only changes highlighted
    wiki-changes diff old.html new.html --keep-href-changes

    # Emit a JSON change artifact
    wiki-changes diff old.html new.html --format json > changes.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two rendered revision HTML files
    Diff(DiffArgs),
}

/// Arguments for the `diff` subcommand
#[derive(Parser)]
struct DiffArgs {
    /// Path to the old rendered revision
    old: PathBuf,

    /// Path to the new rendered revision
    new: PathBuf,

    /// Emit raw diff engine output, skipping the alteration pipeline
    #[arg(long)]
    raw: bool,

    /// Highlight link-target-only changes instead of suppressing them
    #[arg(long)]
    keep_href_changes: bool,

    /// Output format
    #[arg(short, long, default_value = "html")]
    format: DiffOutputFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(u8::try_from(exit_codes::ERROR).unwrap_or(u8::MAX))
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Diff(args) => cli::run_diff(&DiffCommandConfig {
            old: args.old,
            new: args.new,
            raw: args.raw,
            keep_href_changes: args.keep_href_changes,
            format: args.format,
        }),
    }
}
