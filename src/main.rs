//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `netmon_snapshot` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use netmon_snapshot::config::{Cli, Command};
use netmon_snapshot::initialization::init_logger_with;
use netmon_snapshot::{flush_cache, run_monitor, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // IPINFO_TOKEN may live in a .env file, either here or next to the binary
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

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    match cli.command {
        Command::Flush(args) => match flush_cache(&args.cache_path, &args.output) {
            Ok(count) => {
                println!(
                    "Flushed {} cache entr{} to {}",
                    count,
                    if count == 1 { "y" } else { "ies" },
                    args.output.display()
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("netmon_snapshot error: {:#}", e);
                process::exit(1);
            }
        },
        Command::Monitor(args) => match run_monitor(Config::from(args)).await {
            Ok(summary) => {
                println!(
                    "Stopped after {} cycle{}: {} lookups, {} cache hits, {} degraded",
                    summary.cycles,
                    if summary.cycles == 1 { "" } else { "s" },
                    summary.lookups,
                    summary.cache_hits,
                    summary.failures
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("netmon_snapshot error: {:#}", e);
                process::exit(1);
            }
        },
    }
}
