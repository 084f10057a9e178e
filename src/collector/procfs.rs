//! Linux collector reading `/proc/net/{tcp,tcp6,udp,udp6}`.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use log::{debug, trace};

use super::ConnectionSource;
use crate::error_handling::CollectorError;
use crate::models::{Protocol, RawConnection};

const DEFAULT_PROC_NET: &str = "/proc/net";

/// Status reported for UDP sockets, which have no connection state
const UDP_STATUS: &str = "NONE";

/// Tables read on each snapshot.
const TABLES: [(&str, Protocol); 4] = [
    ("tcp", Protocol::Tcp),
    ("tcp6", Protocol::Tcp),
    ("udp", Protocol::Udp),
    ("udp6", Protocol::Udp),
];

/// Reads the kernel's socket tables.
///
/// A missing table (e.g. `tcp6` with IPv6 disabled) is skipped; the snapshot
/// only fails when no table at all can be read.
#[derive(Debug, Clone)]
pub struct ProcNetCollector {
    root: PathBuf,
}

impl ProcNetCollector {
    /// Collector over `/proc/net`.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_PROC_NET)
    }

    /// Reads tables from `root` instead of `/proc/net`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcNetCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSource for ProcNetCollector {
    fn snapshot(&mut self) -> Result<Vec<RawConnection>, CollectorError> {
        let mut connections = Vec::new();
        let mut first_error = None;
        let mut tables_read = 0usize;

        for (name, protocol) in TABLES {
            let path = self.root.join(name);
            match fs::read_to_string(&path) {
                Ok(content) => {
                    tables_read += 1;
                    let before = connections.len();
                    connections.extend(parse_table(&content, protocol));
                    trace!("{}: {} sockets", path.display(), connections.len() - before);
                }
                Err(e) => {
                    debug!("Skipping {}: {e}", path.display());
                    if first_error.is_none() {
                        first_error = Some((path, e));
                    }
                }
            }
        }

        if tables_read == 0 {
            if let Some((path, source)) = first_error {
                return Err(CollectorError::Unreadable {
                    path: path.display().to_string(),
                    source,
                });
            }
        }
        Ok(connections)
    }
}

/// Parses one `/proc/net` table. Malformed lines are skipped.
fn parse_table(content: &str, protocol: Protocol) -> Vec<RawConnection> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| parse_line(line, protocol))
        .collect()
}

fn parse_line(line: &str, protocol: Protocol) -> Option<RawConnection> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    let local = parse_socket(parts[1])?;
    let remote = parse_socket(parts[2])?;
    let remote = if remote.ip().is_unspecified() && remote.port() == 0 {
        None
    } else {
        Some(remote)
    };

    let status = match protocol {
        Protocol::Tcp => tcp_state(parts[3]).to_string(),
        Protocol::Udp => UDP_STATUS.to_string(),
    };

    Some(RawConnection {
        local,
        remote,
        protocol,
        status,
    })
}

/// Decodes `ADDR:PORT` where `ADDR` is 8 (IPv4) or 32 (IPv6) hex digits.
///
/// The kernel prints each 32-bit word of the address as a host-order integer,
/// so the word's native-endian bytes are the address bytes in network order.
fn parse_socket(field: &str) -> Option<SocketAddr> {
    let (addr, port) = field.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;

    let ip = match addr.len() {
        8 => {
            let word = u32::from_str_radix(addr, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.to_ne_bytes()))
        }
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
                let word = u32::from_str_radix(addr.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            let v6 = Ipv6Addr::from(octets);
            match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => IpAddr::V6(v6),
            }
        }
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}

fn tcp_state(hex: &str) -> &'static str {
    match hex {
        "01" => "ESTABLISHED",
        "02" => "SYN_SENT",
        "03" => "SYN_RECV",
        "04" => "FIN_WAIT1",
        "05" => "FIN_WAIT2",
        "06" => "TIME_WAIT",
        "07" => "CLOSE",
        "08" => "CLOSE_WAIT",
        "09" => "LAST_ACK",
        "0A" => "LISTEN",
        "0B" => "CLOSING",
        "0C" => "NEW_SYN_RECV",
        _ => "UNKNOWN",
    }
}
