//! Lookup statistics tracking.
//!
//! Atomic counters for lookups, cache hits and failures per [`FailureKind`],
//! shared between the monitor and the resolver through an `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use strum::IntoEnumIterator;

use super::types::FailureKind;

/// Thread-safe lookup statistics tracker.
///
/// All failure kinds are initialized to zero on creation.
pub struct LookupStats {
    lookups: AtomicUsize,
    cache_hits: AtomicUsize,
    failures: HashMap<FailureKind, AtomicUsize>,
}

impl LookupStats {
    /// All counters at zero.
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }

        LookupStats {
            lookups: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            failures,
        }
    }

    /// Count one provider lookup.
    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one endpoint answered from the cache.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment a failure counter.
    pub fn record_failure(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map",
                kind
            );
        }
    }

    /// Provider lookups so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Cache hits so far.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Failures of one kind so far.
    pub fn failures(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Failures of every kind so far.
    pub fn total_failures(&self) -> usize {
        self.failures
            .values()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    /// Logs running totals; failure kinds with a zero count are omitted.
    pub fn log_summary(&self) {
        info!(
            "Lookups so far: {} resolved, {} served from cache, {} degraded to placeholders",
            self.lookups(),
            self.cache_hits(),
            self.total_failures()
        );
        for kind in FailureKind::iter() {
            let count = self.failures(kind);
            if count > 0 {
                info!("   {}: {}", kind, count);
            }
        }
    }
}

impl Default for LookupStats {
    fn default() -> Self {
        Self::new()
    }
}
