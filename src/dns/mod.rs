//! Reverse DNS capability.
//!
//! The geolocation resolver only needs "IP in, hostname maybe out"; the
//! [`ReverseDns`] trait is that seam, with a `hickory-resolver` backed
//! implementation for production use.

mod resolution;

use std::net::IpAddr;
use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;

pub use resolution::reverse_dns_lookup;

/// Resolves an IP address to a hostname.
#[allow(async_fn_in_trait)]
pub trait ReverseDns {
    /// Returns the hostname for `ip`, or `None` when no name can be found.
    async fn reverse_lookup(&self, ip: IpAddr) -> Option<String>;
}

/// [`ReverseDns`] backed by a shared hickory resolver.
#[derive(Clone)]
pub struct HickoryReverseDns {
    resolver: Arc<TokioAsyncResolver>,
}

impl HickoryReverseDns {
    /// Wraps a resolver built by [`crate::initialization::init_resolver`].
    pub fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

impl ReverseDns for HickoryReverseDns {
    async fn reverse_lookup(&self, ip: IpAddr) -> Option<String> {
        reverse_dns_lookup(ip, &self.resolver).await
    }
}
