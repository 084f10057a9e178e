//! Reverse DNS lookup (PTR records).

use std::net::IpAddr;

use hickory_resolver::TokioAsyncResolver;

/// Performs a reverse DNS lookup for an IP address.
///
/// Returns the first PTR name without its trailing dot, or `None` if the
/// lookup fails or yields no usable name.
pub async fn reverse_dns_lookup(ip: IpAddr, resolver: &TokioAsyncResolver) -> Option<String> {
    match resolver.reverse_lookup(ip).await {
        Ok(response) => response
            .iter()
            .map(|name| name.to_utf8())
            .map(|name| name.trim_end_matches('.').to_string())
            .find(|name| !name.is_empty()),
        Err(e) => {
            log::debug!("Reverse DNS lookup failed for {ip}: {e}");
            None
        }
    }
}
