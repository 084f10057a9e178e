// Shared test helpers for building monitors against fake collaborators.
//
// Provider HTTP is served by `httptest`; the connection table and reverse DNS
// are in-memory stand-ins.

#![allow(dead_code)] // not every test file uses every helper

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use netmon_snapshot::collector::ConnectionSource;
use netmon_snapshot::dns::ReverseDns;
use netmon_snapshot::error_handling::{CollectorError, LookupStats};
use netmon_snapshot::geoip::{FallbackProvider, GeolocationResolver, PrimaryProvider};
use netmon_snapshot::report::HtmlReportWriter;
use netmon_snapshot::{Config, Monitor, Protocol, RawConnection};

/// Connection table that returns the same rows every snapshot.
pub struct StaticTable(pub Vec<RawConnection>);

impl ConnectionSource for StaticTable {
    fn snapshot(&mut self) -> Result<Vec<RawConnection>, CollectorError> {
        Ok(self.0.clone())
    }
}

/// Reverse DNS with a fixed answer.
pub struct FixedDns(pub Option<&'static str>);

impl ReverseDns for FixedDns {
    async fn reverse_lookup(&self, _ip: IpAddr) -> Option<String> {
        self.0.map(str::to_string)
    }
}

/// An established TCP connection from a LAN host to `remote`.
pub fn tcp(remote: &str) -> RawConnection {
    RawConnection {
        local: "192.168.1.20:51515".parse().expect("valid local address"),
        remote: Some(remote.parse().expect("valid remote address")),
        protocol: Protocol::Tcp,
        status: "ESTABLISHED".to_string(),
    }
}

/// Single-pass config with cache and reports inside `dir`.
pub fn test_config(dir: &Path, primary: &str, fallback: &str, allow_free: bool) -> Config {
    Config {
        cache_path: dir.join("info_cache.json"),
        report_dir: dir.join("reports"),
        single_pass: true,
        allow_free_providers: allow_free,
        primary_url: primary.to_string(),
        fallback_url: fallback.to_string(),
        lookup_rps: 0,
        ..Default::default()
    }
}

pub type TestMonitor = Monitor<StaticTable, GeolocationResolver<FixedDns>, HtmlReportWriter>;

/// Monitor over `rows`, resolving through the providers named in `config`.
pub fn build_monitor(config: Config, rows: Vec<RawConnection>, dns: FixedDns) -> TestMonitor {
    let stats = Arc::new(LookupStats::new());
    let client = reqwest::Client::new();
    let resolver = GeolocationResolver::new(
        PrimaryProvider::new(client.clone(), config.primary_url.clone(), None),
        FallbackProvider::new(client, config.fallback_url.clone()),
        dns,
        config.allow_free_providers,
        Arc::clone(&stats),
    );
    let renderer = HtmlReportWriter::new(config.report_dir.clone(), false, 10);
    Monitor::new(config, StaticTable(rows), resolver, renderer, stats)
}
