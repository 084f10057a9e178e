//! netmon_snapshot library: connection monitoring with geolocation enrichment
//!
//! This library snapshots the host's active TCP/UDP connections, enriches every
//! public remote endpoint with hostname and geolocation metadata, keeps that
//! metadata in a time-bounded JSON cache, and renders an HTML report per cycle.
//!
//! # Example
//!
//! ```no_run
//! use netmon_snapshot::{run_monitor, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     single_pass: true,
//!     allow_free_providers: true,
//!     ..Default::default()
//! };
//!
//! let summary = run_monitor(config).await?;
//! println!("{} cycles, {} lookups", summary.cycles, summary.lookups);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod cache;
pub mod classify;
pub mod collector;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod export;
pub mod geoip;
pub mod initialization;
pub mod models;
pub mod monitor;
pub mod report;

// Re-export public API
pub use cache::EnrichmentCache;
pub use classify::{is_internal, is_internal_addr};
pub use config::{Config, LogFormat, LogLevel};
pub use export::flush_cache;
pub use models::{ConnectionRecord, EnrichmentRecord, Protocol, RawConnection};
pub use monitor::{CycleReport, Monitor};
pub use run::{run_monitor, RunSummary};

// Internal run module (wires the production collaborators together)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::app::{install_ctrl_c_handler, shutdown_gracefully};
    use crate::collector::platform_collector;
    use crate::config::{Config, STARTUP_DELAY};
    use crate::dns::HickoryReverseDns;
    use crate::error_handling::{FailureKind, LookupStats};
    use crate::geoip::GeolocationResolver;
    use crate::initialization::*;
    use crate::monitor::Monitor;
    use crate::report::HtmlReportWriter;

    /// Results of a monitoring session.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RunSummary {
        /// Cycles that completed
        pub cycles: usize,
        /// Provider lookups performed
        pub lookups: usize,
        /// Endpoints answered from the cache
        pub cache_hits: usize,
        /// Lookups that fell back to placeholders
        pub failures: usize,
        /// Lookups discarded because free providers are disabled
        pub policy_discards: usize,
    }

    /// Monitors connections until Ctrl-C, or for one cycle in single-pass mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built. Failures inside a
    /// cycle are logged and never end the session.
    pub async fn run_monitor(config: Config) -> Result<RunSummary> {
        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let resolver = init_resolver();
        let stats = Arc::new(LookupStats::new());

        let burst = usize::try_from(config.lookup_rps.saturating_mul(2)).unwrap_or(usize::MAX);
        let (limiter, limiter_shutdown) = match init_rate_limiter(config.lookup_rps, burst) {
            Some((limiter, shutdown)) => (Some(limiter), Some(shutdown)),
            None => (None, None),
        };

        let mut enricher = GeolocationResolver::from_config(
            &config,
            client,
            HickoryReverseDns::new(resolver),
            Arc::clone(&stats),
        );
        if let Some(limiter) = &limiter {
            enricher = enricher.with_rate_limiter(Arc::clone(limiter));
        }

        let renderer = HtmlReportWriter::new(
            config.report_dir.clone(),
            config.multiple_reports,
            config.cycle_interval().as_secs(),
        );

        if config.token.is_none() {
            info!("No provider token configured; primary lookups are rate limited by the provider");
        }
        if !config.allow_free_providers {
            info!("Free providers disabled; geolocation fields will hold placeholders");
        }

        let cancel = CancellationToken::new();
        let signal_task = install_ctrl_c_handler(cancel.clone());

        info!("Starting monitor, first snapshot in {}s", STARTUP_DELAY.as_secs());
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(STARTUP_DELAY) => {}
        }

        let mut monitor = Monitor::new(
            config,
            platform_collector(),
            enricher,
            renderer,
            Arc::clone(&stats),
        );
        let cycles = monitor.run(&cancel).await;

        shutdown_gracefully(cancel, Some(signal_task), limiter_shutdown).await;

        Ok(RunSummary {
            cycles,
            lookups: stats.lookups(),
            cache_hits: stats.cache_hits(),
            failures: stats.total_failures(),
            policy_discards: stats.failures(FailureKind::CommercialPolicy),
        })
    }
}
