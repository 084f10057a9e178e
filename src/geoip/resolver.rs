//! Provider selection, fallback and placeholder substitution.

use std::net::IpAddr;
use std::sync::Arc;

use log::{debug, warn};

use super::providers::{FallbackProvider, PrimaryProvider};
use super::types::{GeoFields, ProviderResponse};
use super::Enricher;
use crate::config::Config;
use crate::dns::ReverseDns;
use crate::error_handling::{LookupStats, ResolutionFailure};
use crate::initialization::RateLimiter;
use crate::models::EnrichmentRecord;

/// Resolves external IPs to [`EnrichmentRecord`]s.
///
/// The primary provider is always asked first. Only a `Provider` refusal
/// (rate limit, error body) sends the request on to the fallback, and only
/// when free providers are allowed. With free providers disallowed, the
/// primary answer is discarded and the lookup yields placeholders.
pub struct GeolocationResolver<D> {
    primary: PrimaryProvider,
    fallback: FallbackProvider,
    dns: D,
    allow_free_providers: bool,
    limiter: Option<Arc<RateLimiter>>,
    stats: Arc<LookupStats>,
}

impl<D: ReverseDns> GeolocationResolver<D> {
    /// Resolver without a rate limiter; see [`GeolocationResolver::with_rate_limiter`].
    pub fn new(
        primary: PrimaryProvider,
        fallback: FallbackProvider,
        dns: D,
        allow_free_providers: bool,
        stats: Arc<LookupStats>,
    ) -> Self {
        Self {
            primary,
            fallback,
            dns,
            allow_free_providers,
            limiter: None,
            stats,
        }
    }

    /// Builds both providers from the runtime configuration.
    pub fn from_config(
        config: &Config,
        client: reqwest::Client,
        dns: D,
        stats: Arc<LookupStats>,
    ) -> Self {
        let primary =
            PrimaryProvider::new(client.clone(), config.primary_url.clone(), config.token.clone());
        let fallback = FallbackProvider::new(client, config.fallback_url.clone());
        Self::new(primary, fallback, dns, config.allow_free_providers, stats)
    }

    /// Every provider request first takes a token from `limiter`.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
    }

    /// Asks the providers about `ip` and returns canonical fields.
    ///
    /// # Errors
    ///
    /// Returns the [`ResolutionFailure`] that ended the lookup. With free
    /// providers disallowed this is always `CommercialPolicy`.
    pub async fn resolve(&self, ip: IpAddr) -> Result<GeoFields, ResolutionFailure> {
        self.throttle().await;
        let primary = self.primary.query(ip).await;

        if !self.allow_free_providers {
            if let Err(e) = &primary {
                debug!("Primary provider failed for {ip}: {e}");
            }
            return Err(ResolutionFailure::CommercialPolicy);
        }

        let response = match primary {
            Ok(body) => ProviderResponse::Primary(body),
            Err(ResolutionFailure::Provider(reason)) => {
                debug!("Primary provider refused {ip} ({reason}), trying fallback");
                self.throttle().await;
                ProviderResponse::Fallback(self.fallback.query(ip).await?)
            }
            Err(other) => return Err(other),
        };
        Ok(response.into_fields())
    }
}

impl<D: ReverseDns> Enricher for GeolocationResolver<D> {
    async fn enrich(&self, ip: IpAddr) -> EnrichmentRecord {
        self.stats.record_lookup();
        let fields = match self.resolve(ip).await {
            Ok(fields) => fields,
            Err(ResolutionFailure::CommercialPolicy) => {
                self.stats.record_failure(ResolutionFailure::CommercialPolicy.kind());
                debug!("No geolocation for {ip}: free providers disabled");
                GeoFields::default()
            }
            Err(failure) => {
                self.stats.record_failure(failure.kind());
                warn!("Geolocation lookup for {ip} failed: {failure}");
                GeoFields::default()
            }
        };

        let hostname = match &fields.hostname {
            Some(_) => None,
            None => self.dns.reverse_lookup(ip).await,
        };
        fields.into_record(ip, hostname)
    }
}
