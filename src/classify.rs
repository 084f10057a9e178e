//! Internal/external endpoint classification.
//!
//! Remote addresses inside private, loopback, link-local or reserved ranges
//! belong to the local network (or a NAT proxy) and are never sent to a
//! geolocation provider.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Returns `true` if `ip` is an internal address.
///
/// Unparseable input is treated as external (`false`) so it is still
/// processed rather than silently dropped.
///
/// ```
/// use netmon_snapshot::is_internal;
///
/// assert!(is_internal("192.168.1.20"));
/// assert!(is_internal("fe80::1"));
/// assert!(!is_internal("8.8.8.8"));
/// assert!(!is_internal("not-an-ip"));
/// ```
pub fn is_internal(ip: &str) -> bool {
    match ip.trim().parse::<IpAddr>() {
        Ok(addr) => is_internal_addr(addr),
        Err(_) => false,
    }
}

/// Typed variant of [`is_internal`].
pub fn is_internal_addr(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    }
}

/// Private ranges:
/// - 0.0.0.0/8 (this network)
/// - 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16 (RFC 1918)
/// - 127.0.0.0/8 (loopback)
/// - 169.254.0.0/16 (link-local)
/// - 192.0.0.0/29 and 192.0.0.170/31 (IETF protocol assignments)
/// - 192.0.2.0/24, 198.18.0.0/15, 198.51.100.0/24, 203.0.113.0/24
/// - 240.0.0.0/4 (reserved) including broadcast
///
/// Carrier-grade NAT space (100.64.0.0/10) is shared, not private, and is
/// classified as external.
fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let o = ip.octets();

    match o[0] {
        0 | 10 | 127 => true,
        169 => o[1] == 254,
        172 => (16..=31).contains(&o[1]),
        192 => match (o[1], o[2]) {
            (168, _) => true,
            (0, 0) => o[3] < 8 || o[3] == 170 || o[3] == 171,
            (0, 2) => true,
            _ => false,
        },
        198 => o[1] == 18 || o[1] == 19 || (o[1] == 51 && o[2] == 100),
        203 => o[1] == 0 && o[2] == 113,
        240..=255 => true,
        _ => false,
    }
}

/// Private ranges:
/// - ::1 (loopback) and :: (unspecified)
/// - fc00::/7 (unique local)
/// - fe80::/10 (link-local)
/// - 100::/64 (discard)
/// - 2001::/23 (IETF protocol assignments)
/// - 2001:db8::/32 (documentation)
/// - ::ffff:0:0/96 when the embedded IPv4 address is private
fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(v4);
    }

    let s = ip.segments();

    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    // fc00::/7
    if (s[0] & 0xfe00) == 0xfc00 {
        return true;
    }
    // fe80::/10
    if (s[0] & 0xffc0) == 0xfe80 {
        return true;
    }
    // 100::/64
    if s[0] == 0x0100 && s[1] == 0 && s[2] == 0 && s[3] == 0 {
        return true;
    }
    // 2001::/23 and 2001:db8::/32
    s[0] == 0x2001 && (s[1] < 0x0200 || s[1] == 0x0db8)
}
