//! HTML rendering of a cycle's connections.

use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeZone};

use crate::cache::EnrichmentCache;
use crate::config::{FIELD_PLACEHOLDER, HOSTNAME_PLACEHOLDER};
use crate::models::ConnectionRecord;

/// Marker shown in the metadata columns of internal connections
pub const INTERNAL_MARKER: &str = "internal";

const TITLE: &str = "Network Connection Snapshot Report";

const STYLE: &str = "body{margin:0;padding:20px 0 0 20px;background-color:#000;color:#fff;font-family:monospace;font-size:13px;}\
h1{font-size:20px;margin:0;}\
p{font-size:16px;margin:10px 0;}\
th{cursor:pointer;text-align:left;}\
.ip{color:#f5428a;}\
.internal{color:#888;}";

/// Click-to-sort for every table header; numeric columns compare as numbers.
const SORT_SCRIPT: &str = "var cell=function(tr,i){return tr.children[i].innerText||tr.children[i].textContent;};\
var cmp=function(i,asc){return function(a,b){var x=cell(asc?a:b,i),y=cell(asc?b:a,i);\
return x!==''&&y!==''&&!isNaN(x)&&!isNaN(y)?x-y:x.toString().localeCompare(y);};};\
window.onload=function(){document.querySelectorAll('th').forEach(function(th){th.addEventListener('click',function(){\
var table=th.closest('table');var idx=Array.prototype.indexOf.call(th.parentNode.children,th);\
Array.prototype.slice.call(table.querySelectorAll('tr:nth-child(n+2)')).sort(cmp(idx,this.asc=!this.asc))\
.forEach(function(tr){table.appendChild(tr);});});});};";

const COLUMNS: [&str; 10] = [
    "Local", "Remote", "Type", "Time", "State", "City", "Region", "Country", "Lat &amp; Long",
    "Hostname",
];

/// Options that change the document head.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// `(seconds, target)` for a `<meta http-equiv="refresh">` tag
    pub refresh: Option<(u64, String)>,
}

/// Renders the report document.
///
/// Every connection gets one row. External rows show the cached record for
/// their endpoint (placeholders if the cache has none); internal rows show
/// [`INTERNAL_MARKER`].
pub fn render_html(
    connections: &[ConnectionRecord],
    cache: &EnrichmentCache,
    generated_at: DateTime<Local>,
    options: &RenderOptions,
) -> String {
    let mut out = String::with_capacity(2048 + connections.len() * 256);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    if let Some((secs, target)) = &options.refresh {
        let _ = writeln!(
            out,
            "<meta http-equiv=\"refresh\" content=\"{secs}; url={}\">",
            escape_html(target)
        );
    }
    let _ = writeln!(out, "<title>{TITLE}</title>");
    let _ = writeln!(out, "<style type=\"text/css\">{STYLE}</style>");
    let _ = writeln!(out, "<script type=\"text/javascript\">{SORT_SCRIPT}</script>");
    out.push_str("</head>\n<body>\n");

    let _ = writeln!(out, "<h1>{TITLE}</h1>");
    let _ = writeln!(
        out,
        "<p>Report produced at {} with {} connections and {} entries in cache</p>",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        connections.len(),
        cache.len()
    );

    out.push_str("<table cellspacing=\"10\">\n<tr>");
    for column in COLUMNS {
        let _ = write!(out, "<th>{column}</th>");
    }
    out.push_str("</tr>\n");

    for connection in connections {
        write_row(&mut out, connection, cache);
    }

    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn write_row(out: &mut String, connection: &ConnectionRecord, cache: &EnrichmentCache) {
    let metadata: [String; 5] = if connection.internal {
        std::array::from_fn(|_| INTERNAL_MARKER.to_string())
    } else {
        match cache.get(&connection.endpoint_key()) {
            Some(record) => [
                record.city.clone(),
                record.region.clone(),
                record.country.clone(),
                record.location.clone(),
                record.hostname.clone(),
            ],
            None => [
                FIELD_PLACEHOLDER.to_string(),
                FIELD_PLACEHOLDER.to_string(),
                FIELD_PLACEHOLDER.to_string(),
                FIELD_PLACEHOLDER.to_string(),
                HOSTNAME_PLACEHOLDER.to_string(),
            ],
        }
    };

    let class = if connection.internal { " class=\"internal\"" } else { "" };
    let _ = write!(out, "<tr{class}>");
    write_endpoint(out, connection.local);
    write_endpoint(out, connection.remote);
    let _ = write!(out, "<td>{}</td>", connection.protocol.label());
    let _ = write!(out, "<td>{}</td>", format_observed(connection.observed_at));
    let _ = write!(out, "<td>{}</td>", escape_html(&connection.status));
    for value in &metadata {
        let _ = write!(out, "<td>{}</td>", escape_html(value));
    }
    out.push_str("</tr>\n");
}

fn write_endpoint(out: &mut String, addr: std::net::SocketAddr) {
    let ip = match addr {
        std::net::SocketAddr::V4(v4) => v4.ip().to_string(),
        std::net::SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
    };
    let _ = write!(out, "<td><span class=\"ip\">{ip}</span>:{}</td>", addr.port());
}

fn format_observed(observed_at: i64) -> String {
    match Local.timestamp_opt(observed_at, 0).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => observed_at.to_string(),
    }
}

/// Escapes text for an HTML text node or attribute value.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichmentRecord, Protocol};

    fn connection(remote: &str, internal: bool) -> ConnectionRecord {
        ConnectionRecord {
            local: "192.168.1.10:50000".parse().unwrap(),
            remote: remote.parse().unwrap(),
            protocol: Protocol::Tcp,
            status: "ESTABLISHED".to_string(),
            observed_at: 1_700_000_000,
            internal,
        }
    }

    fn record(ip: &str) -> EnrichmentRecord {
        EnrichmentRecord {
            ip: ip.to_string(),
            hostname: "one.one.one.one".to_string(),
            city: "Sydney".to_string(),
            region: "New South Wales".to_string(),
            country: "AU".to_string(),
            location: "-33.8688,151.2093".to_string(),
            last_resolved: 1_700_000_000,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_external_row_uses_cached_record() {
        let mut cache = EnrichmentCache::new();
        cache.share("1.1.1.1:443", record("1.1.1.1"));
        let html = render_html(
            &[connection("1.1.1.1:443", false)],
            &cache,
            Local::now(),
            &RenderOptions::default(),
        );
        assert!(html.contains("<td>Sydney</td>"));
        assert!(html.contains("<td>-33.8688,151.2093</td>"));
        assert!(html.contains("<td>TCP/IP</td>"));
        assert!(html.contains("with 1 connections and 1 entries in cache"));
        assert!(!html.contains("http-equiv"));
    }

    #[test]
    fn test_internal_row_is_marked() {
        let html = render_html(
            &[connection("10.0.0.5:22", true)],
            &EnrichmentCache::new(),
            Local::now(),
            &RenderOptions::default(),
        );
        assert!(html.contains("<tr class=\"internal\">"));
        assert!(html.contains("<td>internal</td>"));
    }

    #[test]
    fn test_missing_cache_entry_renders_placeholders() {
        let html = render_html(
            &[connection("5.6.7.8:80", false)],
            &EnrichmentCache::new(),
            Local::now(),
            &RenderOptions::default(),
        );
        assert!(html.contains("<td>*</td>"));
        assert!(html.contains("<td>not available</td>"));
    }

    #[test]
    fn test_refresh_meta_tag() {
        let options = RenderOptions {
            refresh: Some((10, "netmon_report.htm".to_string())),
        };
        let html = render_html(&[], &EnrichmentCache::new(), Local::now(), &options);
        assert!(html.contains(r#"<meta http-equiv="refresh" content="10; url=netmon_report.htm">"#));
    }

    #[test]
    fn test_ipv6_endpoint_is_bracketed() {
        let html = render_html(
            &[connection("[2606:4700::1111]:443", false)],
            &EnrichmentCache::new(),
            Local::now(),
            &RenderOptions::default(),
        );
        assert!(html.contains(r#"<span class="ip">[2606:4700::1111]</span>:443"#));
    }
}
