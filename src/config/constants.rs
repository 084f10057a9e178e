//! Configuration constants.
//!
//! Defaults for the CLI options plus the placeholder values written into
//! enrichment records when a field cannot be resolved.

use std::time::Duration;

/// Default path of the persisted enrichment cache
pub const DEFAULT_CACHE_PATH: &str = "./info_cache.json";

/// Default destination of the flush/export text file
pub const DEFAULT_EXPORT_PATH: &str = "./ip_address_info";

/// Default directory the HTML reports are written to
pub const DEFAULT_REPORT_DIR: &str = ".";

/// Report file name used when a single rolling report is produced
pub const REPORT_FILE_NAME: &str = "netmon_report.htm";

/// Suffix for timestamped reports (multiple report mode)
pub const REPORT_FILE_SUFFIX: &str = "_netmon_report.htm";

/// Days before a cached record must be re-resolved
pub const DEFAULT_REQUERY_DAYS: u64 = 3;

/// Seconds in one day, used to turn the requery setting into a TTL
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Default wait between cycles in seconds
pub const DEFAULT_REFRESH_SECONDS: u64 = 10;

/// Per-request timeout for provider calls
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Provider requests per second (0 disables the limiter)
pub const DEFAULT_LOOKUP_RPS: u32 = 1;

/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 5;

/// Grace period before the first cycle so the operator can read the banner
pub const STARTUP_DELAY: Duration = Duration::from_secs(2);

/// Primary (commercial) geolocation provider
pub const PRIMARY_PROVIDER_URL: &str = "https://ipinfo.io";

/// Fallback (free, non-commercial) geolocation provider
pub const FALLBACK_PROVIDER_URL: &str = "http://ip-api.com";

/// Fields requested from the fallback provider
pub const FALLBACK_FIELDS: &str = "status,message,country,regionName,city,lat,lon,isp,query";

/// User-Agent sent to both providers
pub const DEFAULT_USER_AGENT: &str = concat!("netmon_snapshot/", env!("CARGO_PKG_VERSION"));

// Placeholders
/// Substituted for city, region, country and location when unknown
pub const FIELD_PLACEHOLDER: &str = "*";
/// Substituted for the hostname when neither provider nor reverse DNS supply one
pub const HOSTNAME_PLACEHOLDER: &str = "not available";
