//! Configuration types and CLI options.
//!
//! This module defines the `clap` command surface and the library-level
//! [`Config`] the monitor is built from.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line interface.
///
/// ```bash
/// # Watch connections, re-render every 10 seconds
/// netmon_snapshot monitor
///
/// # Non-commercial use: allow the free fallback provider, one pass only
/// netmon_snapshot monitor --allow-free --single-pass
///
/// # Export the cache to ./ip_address_info and delete it
/// netmon_snapshot flush
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "netmon_snapshot",
    version,
    about = "Produce a report of TCP/UDP connections active on the network interface."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch live connections and write snapshot reports
    Monitor(MonitorArgs),
    /// Export the enrichment cache to a text file and delete it
    Flush(FlushArgs),
}

/// Options for the `monitor` subcommand.
#[derive(Debug, Clone, Args)]
pub struct MonitorArgs {
    /// Days before a cached record is looked up again
    #[arg(long, default_value_t = DEFAULT_REQUERY_DAYS)]
    pub requery_days: u64,

    /// Seconds to wait between cycles (also the report refresh rate)
    #[arg(short = 'r', long, default_value_t = DEFAULT_REFRESH_SECONDS)]
    pub refresh_seconds: u64,

    /// Minutes to wait between cycles; overrides --refresh-seconds
    #[arg(short = 'm', long)]
    pub wait_minutes: Option<u64>,

    /// Access token for the primary provider (raises its rate limit)
    #[arg(short = 't', long, env = "IPINFO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Non-commercial use: permit the free fallback provider
    #[arg(short = 'f', long)]
    pub allow_free: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub single_pass: bool,

    /// Write one timestamped report per cycle instead of a rolling report
    #[arg(long)]
    pub multiple_reports: bool,

    /// Enrichment cache file
    #[arg(long, default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: PathBuf,

    /// Directory the HTML reports are written to
    #[arg(long, default_value = DEFAULT_REPORT_DIR)]
    pub report_dir: PathBuf,

    /// Base URL of the primary provider
    #[arg(long, default_value = PRIMARY_PROVIDER_URL)]
    pub primary_url: String,

    /// Base URL of the fallback provider
    #[arg(long, default_value = FALLBACK_PROVIDER_URL)]
    pub fallback_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Provider requests per second (0 disables limiting)
    #[arg(long, default_value_t = DEFAULT_LOOKUP_RPS)]
    pub lookup_rps: u32,
}

/// Options for the `flush` subcommand.
#[derive(Debug, Clone, Args)]
pub struct FlushArgs {
    /// Enrichment cache file to flush
    #[arg(long, default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: PathBuf,

    /// Destination text file (one `ip,hostname,city,region,country,location` line per record)
    #[arg(long, default_value = DEFAULT_EXPORT_PATH)]
    pub output: PathBuf,
}

/// Library configuration (no CLI dependencies).
///
/// ```no_run
/// use netmon_snapshot::Config;
///
/// let config = Config {
///     allow_free_providers: true,
///     single_pass: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Enrichment cache file
    pub cache_path: PathBuf,
    /// Report output directory
    pub report_dir: PathBuf,
    /// Days before a cached record is stale
    pub requery_days: u64,
    /// Wait between cycles in seconds
    pub refresh_seconds: u64,
    /// Wait between cycles in minutes, takes precedence over `refresh_seconds`
    pub wait_minutes: Option<u64>,
    /// Stop after one cycle
    pub single_pass: bool,
    /// One report file per cycle
    pub multiple_reports: bool,
    /// Primary provider token
    pub token: Option<String>,
    /// Permit the free fallback provider
    pub allow_free_providers: bool,
    /// Primary provider base URL
    pub primary_url: String,
    /// Fallback provider base URL
    pub fallback_url: String,
    /// Provider request timeout in seconds
    pub timeout_seconds: u64,
    /// Provider requests per second (0 disables limiting)
    pub lookup_rps: u32,
    /// User-Agent for provider requests
    pub user_agent: String,
}

impl Config {
    /// Age in seconds after which a cached record needs resolution.
    pub fn requery_ttl_secs(&self) -> i64 {
        i64::try_from(self.requery_days.saturating_mul(SECONDS_PER_DAY)).unwrap_or(i64::MAX)
    }

    /// Wait between two cycles; minutes override seconds.
    pub fn cycle_interval(&self) -> Duration {
        match self.wait_minutes {
            Some(minutes) => Duration::from_secs(minutes.saturating_mul(60)),
            None => Duration::from_secs(self.refresh_seconds),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            requery_days: DEFAULT_REQUERY_DAYS,
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
            wait_minutes: None,
            single_pass: false,
            multiple_reports: false,
            token: None,
            allow_free_providers: false,
            primary_url: PRIMARY_PROVIDER_URL.to_string(),
            fallback_url: FALLBACK_PROVIDER_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            lookup_rps: DEFAULT_LOOKUP_RPS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<MonitorArgs> for Config {
    fn from(args: MonitorArgs) -> Self {
        Self {
            cache_path: args.cache_path,
            report_dir: args.report_dir,
            requery_days: args.requery_days,
            refresh_seconds: args.refresh_seconds,
            wait_minutes: args.wait_minutes,
            single_pass: args.single_pass,
            multiple_reports: args.multiple_reports,
            token: args.token.filter(|t| !t.trim().is_empty()),
            allow_free_providers: args.allow_free,
            primary_url: args.primary_url,
            fallback_url: args.fallback_url,
            timeout_seconds: args.timeout_seconds,
            lookup_rps: args.lookup_rps,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
