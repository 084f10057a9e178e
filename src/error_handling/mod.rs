//! Error handling and lookup statistics.
//!
//! This module provides:
//! - Error type definitions for every pipeline seam
//! - Lookup statistics (lookups, cache hits, failures per kind)
//!
//! Resolution failures are never surfaced as errors; they are counted here
//! and replaced by placeholders in the enrichment record.

mod stats;
mod types;

// Re-export public API
pub use stats::LookupStats;
pub use types::{CacheError, CollectorError, FailureKind, InitializationError, ResolutionFailure};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_lookup_stats_initialization() {
        let stats = LookupStats::new();
        for kind in FailureKind::iter() {
            assert_eq!(stats.failures(kind), 0);
        }
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.cache_hits(), 0);
    }

    #[test]
    fn test_lookup_stats_totals() {
        let stats = LookupStats::new();
        stats.record_lookup();
        stats.record_lookup();
        stats.record_cache_hit();
        stats.record_failure(FailureKind::Transport);
        stats.record_failure(FailureKind::CommercialPolicy);
        stats.record_failure(FailureKind::CommercialPolicy);

        assert_eq!(stats.lookups(), 2);
        assert_eq!(stats.cache_hits(), 1);
        assert_eq!(stats.failures(FailureKind::CommercialPolicy), 2);
        assert_eq!(stats.total_failures(), 3);
    }

    #[test]
    fn test_resolution_failure_kind() {
        assert_eq!(
            ResolutionFailure::CommercialPolicy.kind(),
            FailureKind::CommercialPolicy
        );
        assert_eq!(
            ResolutionFailure::Provider("rate limited".into()).kind(),
            FailureKind::Provider
        );
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ResolutionFailure::from(decode).kind(), FailureKind::Decode);
    }
}
