//! Provider response shapes and the canonical field set.
//!
//! The two providers answer with differently shaped JSON. Each shape is a
//! variant of [`ProviderResponse`] and is converted into [`GeoFields`] by its
//! own `From` adapter; nothing downstream looks at provider-specific fields.

use std::net::IpAddr;

use chrono::Utc;
use serde::Deserialize;

use crate::config::{FIELD_PLACEHOLDER, HOSTNAME_PLACEHOLDER};
use crate::models::EnrichmentRecord;

/// Canonical geolocation fields, each possibly missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoFields {
    /// Hostname reported by the provider
    pub hostname: Option<String>,
    /// City name
    pub city: Option<String>,
    /// Region or state name
    pub region: Option<String>,
    /// Country code or name
    pub country: Option<String>,
    /// `"lat,lon"`
    pub location: Option<String>,
}

impl GeoFields {
    /// Builds the final record, substituting placeholders for anything missing.
    ///
    /// `hostname` overrides `self.hostname` (it is the provider hostname or the
    /// reverse DNS result, already chosen by the caller).
    pub fn into_record(self, ip: IpAddr, hostname: Option<String>) -> EnrichmentRecord {
        let placeholder = || FIELD_PLACEHOLDER.to_string();
        EnrichmentRecord {
            ip: ip.to_string(),
            hostname: hostname
                .or(self.hostname)
                .unwrap_or_else(|| HOSTNAME_PLACEHOLDER.to_string()),
            city: self.city.unwrap_or_else(placeholder),
            region: self.region.unwrap_or_else(placeholder),
            country: self.country.unwrap_or_else(placeholder),
            location: self.location.unwrap_or_else(placeholder),
            last_resolved: Utc::now().timestamp(),
        }
    }
}

/// Body returned by the primary provider (`/{ip}/json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryResponse {
    /// Echo of the queried IP
    #[serde(default)]
    pub ip: Option<String>,
    /// PTR name known to the provider
    #[serde(default)]
    pub hostname: Option<String>,
    /// City name
    #[serde(default)]
    pub city: Option<String>,
    /// Region name
    #[serde(default)]
    pub region: Option<String>,
    /// Two-letter country code
    #[serde(default)]
    pub country: Option<String>,
    /// `"lat,lon"`
    #[serde(default)]
    pub loc: Option<String>,
    /// Present when the provider rejects the request (rate limit, bad token)
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Body returned by the fallback provider (`/json/{ip}?fields=...`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResponse {
    /// `"success"` or `"fail"`
    #[serde(default)]
    pub status: Option<String>,
    /// Reason given with a `"fail"` status
    #[serde(default)]
    pub message: Option<String>,
    /// Country name
    #[serde(default)]
    pub country: Option<String>,
    /// Region name (`regionName`)
    #[serde(default)]
    pub region_name: Option<String>,
    /// City name
    #[serde(default)]
    pub city: Option<String>,
    /// Latitude
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude
    #[serde(default)]
    pub lon: Option<f64>,
    /// ISP name, used in place of a hostname
    #[serde(default)]
    pub isp: Option<String>,
    /// Echo of the queried IP
    #[serde(default)]
    pub query: Option<String>,
}

/// Response from whichever provider answered.
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    /// Answer from the commercial provider
    Primary(PrimaryResponse),
    /// Answer from the free provider
    Fallback(FallbackResponse),
}

impl ProviderResponse {
    /// Converts either shape into the canonical field set.
    pub fn into_fields(self) -> GeoFields {
        match self {
            ProviderResponse::Primary(body) => body.into(),
            ProviderResponse::Fallback(body) => body.into(),
        }
    }
}

impl From<PrimaryResponse> for GeoFields {
    fn from(body: PrimaryResponse) -> Self {
        GeoFields {
            hostname: non_empty(body.hostname),
            city: non_empty(body.city),
            region: non_empty(body.region),
            country: non_empty(body.country),
            location: non_empty(body.loc),
        }
    }
}

impl From<FallbackResponse> for GeoFields {
    fn from(body: FallbackResponse) -> Self {
        let location = match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Some(format!("{lat},{lon}")),
            _ => None,
        };
        GeoFields {
            // The free provider has no PTR data; the ISP name stands in for it.
            hostname: non_empty(body.isp),
            city: non_empty(body.city),
            region: non_empty(body.region_name),
            country: non_empty(body.country),
            location,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
