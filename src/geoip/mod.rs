//! Geolocation enrichment over HTTP providers.
//!
//! A commercial provider is queried first; a free provider answers when the
//! commercial one refuses and free providers are permitted. Both responses are
//! normalized into [`GeoFields`], then into an [`EnrichmentRecord`] with
//! placeholders for anything still unknown.

mod providers;
mod resolver;
mod types;

use std::net::IpAddr;

use crate::models::EnrichmentRecord;

// Re-export public API
pub use providers::{FallbackProvider, PrimaryProvider};
pub use resolver::GeolocationResolver;
pub use types::{FallbackResponse, GeoFields, PrimaryResponse, ProviderResponse};

/// Produces an enrichment record for an external IP.
///
/// Never fails: unresolved fields carry placeholders.
#[allow(async_fn_in_trait)]
pub trait Enricher {
    /// Returns a complete record for `ip`; failures degrade to placeholders.
    async fn enrich(&self, ip: IpAddr) -> EnrichmentRecord;
}
