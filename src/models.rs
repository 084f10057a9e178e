//! Connection and enrichment records.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::classify::is_internal_addr;

/// Transport protocol of an observed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// TCP over IPv4 or IPv6
    Tcp,
    /// UDP over IPv4 or IPv6
    Udp,
}

impl Protocol {
    /// Label used in the report's "Type" column.
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP/IP",
            Protocol::Udp => "UDP/IP",
        }
    }
}

/// One row of the OS connection table, as handed over by a collector.
///
/// `remote` is `None` for sockets without an acknowledged peer
/// (listening TCP sockets, unconnected UDP sockets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConnection {
    /// Local address and port
    pub local: SocketAddr,
    /// Remote address and port, if there is a peer
    pub remote: Option<SocketAddr>,
    /// Transport protocol
    pub protocol: Protocol,
    /// Connection state as the OS names it (`ESTABLISHED`, `TIME_WAIT`, ...)
    pub status: String,
}

/// A connection with a remote peer, observed during the current cycle.
///
/// Never persisted; rebuilt from a fresh snapshot every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Local address and port
    pub local: SocketAddr,
    /// Remote address and port
    pub remote: SocketAddr,
    /// Transport protocol
    pub protocol: Protocol,
    /// Connection state as reported by the collector
    pub status: String,
    /// Unix seconds at which the snapshot was taken
    pub observed_at: i64,
    /// Remote peer is on the local network and is not enriched
    pub internal: bool,
}

impl ConnectionRecord {
    /// Builds a record from a raw row, or `None` when there is no remote peer.
    pub fn from_raw(raw: RawConnection, observed_at: i64) -> Option<Self> {
        let remote = raw.remote?;
        if remote.ip().is_unspecified() || remote.port() == 0 {
            return None;
        }
        Some(Self {
            local: raw.local,
            remote,
            protocol: raw.protocol,
            status: raw.status,
            observed_at,
            internal: is_internal_addr(remote.ip()),
        })
    }

    /// Address of the remote peer, without the port.
    pub fn remote_ip(&self) -> IpAddr {
        self.remote.ip()
    }

    /// Cache key of the remote endpoint (`ip:port`, IPv6 in brackets).
    pub fn endpoint_key(&self) -> String {
        endpoint_key(self.remote)
    }
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.status, self.local, self.remote)
    }
}

/// Formats the cache key for a remote endpoint.
pub fn endpoint_key(remote: SocketAddr) -> String {
    remote.to_string()
}

/// Cached metadata for a remote IP.
///
/// Every field carries either resolved data or a placeholder
/// (`"*"`, or `"not available"` for the hostname).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    /// The queried IP
    pub ip: String,
    /// Provider hostname, reverse DNS name, or `"not available"`
    pub hostname: String,
    /// City name or `"*"`
    pub city: String,
    /// Region name or `"*"`
    pub region: String,
    /// Country code or `"*"`
    pub country: String,
    /// `"lat,lon"` or `"*"`
    pub location: String,
    /// Unix seconds of the last resolution
    pub last_resolved: i64,
}

impl fmt::Display for EnrichmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.ip, self.hostname, self.city, self.region, self.country, self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(remote: Option<&str>) -> RawConnection {
        RawConnection {
            local: "192.168.1.10:50312".parse().unwrap(),
            remote: remote.map(|r| r.parse().unwrap()),
            protocol: Protocol::Tcp,
            status: "ESTABLISHED".to_string(),
        }
    }

    #[test]
    fn test_from_raw_requires_remote_peer() {
        assert!(ConnectionRecord::from_raw(raw(None), 0).is_none());
        assert!(ConnectionRecord::from_raw(raw(Some("0.0.0.0:0")), 0).is_none());
        assert!(ConnectionRecord::from_raw(raw(Some("[::]:0")), 0).is_none());
    }

    #[test]
    fn test_from_raw_classifies_remote() {
        let external = ConnectionRecord::from_raw(raw(Some("8.8.8.8:443")), 42).unwrap();
        assert!(!external.internal);
        assert_eq!(external.observed_at, 42);
        assert_eq!(external.endpoint_key(), "8.8.8.8:443");

        let internal = ConnectionRecord::from_raw(raw(Some("10.0.0.2:22")), 42).unwrap();
        assert!(internal.internal);
    }

    #[test]
    fn test_ipv6_endpoint_key_is_bracketed() {
        let record =
            ConnectionRecord::from_raw(raw(Some("[2607:f8b0::200e]:443")), 0).unwrap();
        assert_eq!(record.endpoint_key(), "[2607:f8b0::200e]:443");
    }

    #[test]
    fn test_connection_record_display_is_tab_separated() {
        let record = ConnectionRecord::from_raw(raw(Some("1.2.3.4:443")), 0).unwrap();
        assert_eq!(
            record.to_string(),
            "ESTABLISHED\t192.168.1.10:50312\t1.2.3.4:443"
        );
    }

    #[test]
    fn test_enrichment_record_display() {
        let record = EnrichmentRecord {
            ip: "1.2.3.4".into(),
            hostname: "host.example".into(),
            city: "Berlin".into(),
            region: "Land Berlin".into(),
            country: "DE".into(),
            location: "52.52,13.40".into(),
            last_resolved: 1,
        };
        assert_eq!(
            record.to_string(),
            "1.2.3.4,host.example,Berlin,Land Berlin,DE,52.52,13.40"
        );
    }
}
