//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

/// Initializes the DNS resolver used for reverse (PTR) lookups.
///
/// Prefers the host's `/etc/resolv.conf`; falls back to the default public
/// resolver configuration when the system configuration cannot be read.
/// Timeouts are short because a missing PTR record is common and only costs
/// a placeholder hostname.
pub fn init_resolver() -> Arc<TokioAsyncResolver> {
    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok(system) => system,
        Err(e) => {
            log::debug!("Falling back to default DNS configuration: {e}");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };

    opts.timeout = Duration::from_secs(crate::config::DNS_TIMEOUT_SECS);
    opts.attempts = 2;

    Arc::new(TokioAsyncResolver::tokio(config, opts))
}
