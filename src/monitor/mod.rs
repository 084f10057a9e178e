//! Cycle orchestration.
//!
//! Each cycle takes a snapshot, classifies the remote endpoints, resolves
//! whatever the cache cannot answer, persists the cache and renders the
//! report. [`Monitor::run`] repeats cycles until cancelled or, in single-pass
//! mode, after the first one.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::cache::EnrichmentCache;
use crate::collector::ConnectionSource;
use crate::config::Config;
use crate::error_handling::{CollectorError, LookupStats};
use crate::geoip::Enricher;
use crate::models::ConnectionRecord;
use crate::report::ReportRenderer;

/// Outcome of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Connections with a remote peer
    pub connections: usize,
    /// Connections whose remote peer is public
    pub external: usize,
    /// Connections whose remote peer is on the local network
    pub internal: usize,
    /// Provider lookups performed
    pub lookups: usize,
    /// Cache size after the cycle
    pub cache_entries: usize,
    /// Where the report went, if it could be written
    pub report_path: Option<PathBuf>,
    /// Cancellation cut the resolving phase short
    pub cancelled: bool,
}

/// Drives snapshot, enrichment, persistence and reporting.
pub struct Monitor<S, E, R> {
    config: Config,
    source: S,
    enricher: E,
    renderer: R,
    stats: Arc<LookupStats>,
}

impl<S, E, R> Monitor<S, E, R>
where
    S: ConnectionSource,
    E: Enricher,
    R: ReportRenderer,
{
    /// Monitor over the given collaborators. `stats` is shared with the
    /// enricher so failure counts and cache hits land in one place.
    pub fn new(config: Config, source: S, enricher: E, renderer: R, stats: Arc<LookupStats>) -> Self {
        Self {
            config,
            source,
            enricher,
            renderer,
            stats,
        }
    }

    /// Counters accumulated across cycles.
    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    /// Runs one cycle.
    ///
    /// Cancellation is checked before each connection is resolved; once seen,
    /// resolving stops but the cache is still persisted and the report still
    /// rendered.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError`] if no snapshot could be taken. Nothing else
    /// aborts a cycle: cache and report write failures are logged.
    pub async fn run_cycle(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, CollectorError> {
        let observed_at = Utc::now().timestamp();
        let connections: Vec<ConnectionRecord> = self
            .source
            .snapshot()?
            .into_iter()
            .filter_map(|raw| ConnectionRecord::from_raw(raw, observed_at))
            .collect();

        let internal = connections.iter().filter(|c| c.internal).count();
        let mut report = CycleReport {
            connections: connections.len(),
            external: connections.len() - internal,
            internal,
            ..Default::default()
        };

        let mut cache = EnrichmentCache::load(&self.config.cache_path);
        let ttl = self.config.requery_ttl_secs();

        for connection in connections.iter().filter(|c| !c.internal) {
            if cancel.is_cancelled() {
                info!("Cancellation requested, skipping remaining lookups");
                report.cancelled = true;
                break;
            }
            debug!("-> {connection}");

            let key = connection.endpoint_key();
            let now = Utc::now().timestamp();
            if !cache.needs_resolution(&key, now, ttl) {
                self.stats.record_cache_hit();
                continue;
            }

            let ip = connection.remote_ip();
            if let Some(record) = cache.fresh_for_ip(&ip.to_string(), now, ttl).cloned() {
                self.stats.record_cache_hit();
                cache.share(key, record);
                continue;
            }

            let record = self.enricher.enrich(ip).await;
            report.lookups += 1;
            cache.put(key, record);
        }

        if let Err(e) = cache.persist(&self.config.cache_path) {
            warn!(
                "Failed to persist cache to {}: {e}",
                self.config.cache_path.display()
            );
        }
        report.cache_entries = cache.len();

        match self.renderer.render(&connections, &cache) {
            Ok(path) => report.report_path = Some(path),
            Err(e) => warn!("Failed to write report: {e}"),
        }

        self.stats.log_summary();
        Ok(report)
    }

    /// Runs cycles until cancelled, or once in single-pass mode.
    ///
    /// Returns the number of cycles that completed.
    pub async fn run(&mut self, cancel: &CancellationToken) -> usize {
        let mut completed = 0;

        while !cancel.is_cancelled() {
            match self.run_cycle(cancel).await {
                Ok(report) => {
                    completed += 1;
                    info!(
                        "Cycle {completed}: {} connections ({} external, {} internal), {} lookups, {} cache entries",
                        report.connections,
                        report.external,
                        report.internal,
                        report.lookups,
                        report.cache_entries
                    );
                }
                Err(CollectorError::Unsupported) => {
                    error!("{}", CollectorError::Unsupported);
                    break;
                }
                Err(e) => error!("Cycle aborted: {e}"),
            }

            if self.config.single_pass || cancel.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.cycle_interval()) => {}
            }
        }

        completed
    }
}
