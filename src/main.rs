//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `terminology_importer` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use terminology_importer::initialization::init_logger_with;
use terminology_importer::{run_import, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load MEILI_*, BUCKET_NAME_PRIVATE, etc. from .env: current directory
    // first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_import(config).await {
        Ok(report) => {
            println!(
                "{} {} record{} in {} batch{} ({} abandoned, {} line{} skipped) in {:.1}s",
                if report.cancelled { "Interrupted after indexing" } else { "Indexed" },
                report.records_indexed,
                if report.records_indexed == 1 { "" } else { "s" },
                report.batches_indexed,
                if report.batches_indexed == 1 { "" } else { "es" },
                report.batches_abandoned,
                report.lines_skipped,
                if report.lines_skipped == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("terminology_importer error: {:#}", e);
            process::exit(1);
        }
    }
}
