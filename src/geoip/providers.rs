//! HTTP transports for the two geolocation providers.

use std::net::IpAddr;

use log::trace;

use super::types::{FallbackResponse, PrimaryResponse};
use crate::config::FALLBACK_FIELDS;
use crate::error_handling::ResolutionFailure;

/// Longest slice of an error body kept in a failure message
const ERROR_BODY_PREVIEW: usize = 200;

/// Commercial provider queried first (`{base}/{ip}/json`).
#[derive(Debug, Clone)]
pub struct PrimaryProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PrimaryProvider {
    /// Provider rooted at `base_url`; `token` is sent as the `token` query
    /// parameter when present.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token,
        }
    }

    fn url(&self, ip: IpAddr) -> String {
        format!("{}/{ip}/json", self.base_url.trim_end_matches('/'))
    }

    /// Queries the provider.
    ///
    /// # Errors
    ///
    /// - `Transport` if no response arrives
    /// - `Provider` for a non-2xx status or an `error` member in the body
    /// - `Decode` if the body is not the expected JSON
    pub async fn query(&self, ip: IpAddr) -> Result<PrimaryResponse, ResolutionFailure> {
        trace!("Querying primary provider for {ip}");
        let mut request = self.client.get(self.url(ip));
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ResolutionFailure::Provider(format!(
                "HTTP {status}: {}",
                preview(&body)
            )));
        }

        let parsed: PrimaryResponse = serde_json::from_str(&body)?;
        if let Some(error) = &parsed.error {
            return Err(ResolutionFailure::Provider(describe_error(error)));
        }
        Ok(parsed)
    }
}

/// Free provider used when the primary one refuses a request.
#[derive(Debug, Clone)]
pub struct FallbackProvider {
    client: reqwest::Client,
    base_url: String,
}

impl FallbackProvider {
    /// Provider rooted at `base_url`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, ip: IpAddr) -> String {
        format!(
            "{}/json/{ip}?fields={FALLBACK_FIELDS}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Queries the provider.
    ///
    /// # Errors
    ///
    /// Same classification as [`PrimaryProvider::query`]; a body with
    /// `"status":"fail"` is a `Provider` error.
    pub async fn query(&self, ip: IpAddr) -> Result<FallbackResponse, ResolutionFailure> {
        trace!("Querying fallback provider for {ip}");
        let response = self.client.get(self.url(ip)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ResolutionFailure::Provider(format!(
                "HTTP {status}: {}",
                preview(&body)
            )));
        }

        let parsed: FallbackResponse = serde_json::from_str(&body)?;
        if parsed.status.as_deref() == Some("fail") {
            return Err(ResolutionFailure::Provider(
                parsed
                    .message
                    .unwrap_or_else(|| "fallback provider reported failure".to_string()),
            ));
        }
        Ok(parsed)
    }
}

/// Extracts a readable message from the primary provider's `error` member,
/// which is either a string or `{"title": ..., "message": ...}`.
fn describe_error(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => {
            let title = map.get("title").and_then(|v| v.as_str());
            let message = map.get("message").and_then(|v| v.as_str());
            match (title, message) {
                (Some(t), Some(m)) => format!("{t}: {m}"),
                (Some(t), None) => t.to_string(),
                (None, Some(m)) => m.to_string(),
                (None, None) => error.to_string(),
            }
        }
        other => other.to_string(),
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn ip() -> IpAddr {
        "8.8.8.8".parse().unwrap()
    }

    #[tokio::test]
    async fn test_primary_success() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/8.8.8.8/json")).respond_with(
                status_code(200).body(r#"{"ip":"8.8.8.8","city":"Mountain View"}"#),
            ),
        );

        let provider = PrimaryProvider::new(
            reqwest::Client::new(),
            server.url_str("/").trim_end_matches('/'),
            None,
        );
        let body = provider.query(ip()).await.unwrap();
        assert_eq!(body.city.as_deref(), Some("Mountain View"));
    }

    #[tokio::test]
    async fn test_primary_sends_token() {
        let server = Server::run();
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("GET", "/8.8.8.8/json"),
                request::query(url_decoded(contains(("token", "abc123")))),
            ])
            .respond_with(status_code(200).body(r#"{"ip":"8.8.8.8"}"#)),
        );

        let provider =
            PrimaryProvider::new(reqwest::Client::new(), server.url_str("/"), Some("abc123".into()));
        assert!(provider.query(ip()).await.is_ok());
    }

    #[tokio::test]
    async fn test_primary_token_is_url_encoded() {
        let server = Server::run();
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("GET", "/8.8.8.8/json"),
                request::query(url_decoded(contains(("token", "a&b=c d")))),
                request::query(url_decoded(len(eq(1usize)))),
            ])
            .respond_with(status_code(200).body(r#"{"ip":"8.8.8.8"}"#)),
        );

        let provider =
            PrimaryProvider::new(reqwest::Client::new(), server.url_str("/"), Some("a&b=c d".into()));
        assert!(provider.query(ip()).await.is_ok());
    }

    #[tokio::test]
    async fn test_primary_rate_limited_is_provider_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/8.8.8.8/json")).respond_with(
                status_code(429).body(r#"{"error":{"title":"Rate limit exceeded","message":"Upgrade"}}"#),
            ),
        );

        let provider = PrimaryProvider::new(reqwest::Client::new(), server.url_str("/"), None);
        let err = provider.query(ip()).await.unwrap_err();
        assert!(matches!(err, ResolutionFailure::Provider(_)));
    }

    #[tokio::test]
    async fn test_primary_error_body_is_provider_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/8.8.8.8/json")).respond_with(
                status_code(200).body(r#"{"error":{"title":"Wrong ip","message":"Please provide a valid IP address"}}"#),
            ),
        );

        let provider = PrimaryProvider::new(reqwest::Client::new(), server.url_str("/"), None);
        match provider.query(ip()).await {
            Err(ResolutionFailure::Provider(msg)) => assert!(msg.contains("Wrong ip")),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_primary_garbage_is_decode_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/8.8.8.8/json"))
                .respond_with(status_code(200).body("<html>oops</html>")),
        );

        let provider = PrimaryProvider::new(reqwest::Client::new(), server.url_str("/"), None);
        let err = provider.query(ip()).await.unwrap_err();
        assert!(matches!(err, ResolutionFailure::Decode(_)));
    }

    #[tokio::test]
    async fn test_primary_unreachable_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let provider =
            PrimaryProvider::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
        let err = provider.query(ip()).await.unwrap_err();
        assert!(matches!(err, ResolutionFailure::Transport(_)));
    }

    #[tokio::test]
    async fn test_fallback_requests_fields() {
        let server = Server::run();
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("GET", "/json/8.8.8.8"),
                request::query(url_decoded(contains(("fields", FALLBACK_FIELDS)))),
            ])
            .respond_with(status_code(200).body(r#"{"status":"success","lat":1.5,"lon":2.5}"#)),
        );

        let provider = FallbackProvider::new(reqwest::Client::new(), server.url_str("/"));
        let body = provider.query(ip()).await.unwrap();
        assert_eq!(body.lat, Some(1.5));
    }

    #[tokio::test]
    async fn test_fallback_fail_status_is_provider_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/json/8.8.8.8")).respond_with(
                status_code(200).body(r#"{"status":"fail","message":"reserved range"}"#),
            ),
        );

        let provider = FallbackProvider::new(reqwest::Client::new(), server.url_str("/"));
        match provider.query(ip()).await {
            Err(ResolutionFailure::Provider(msg)) => assert_eq!(msg, "reserved range"),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn test_describe_error_shapes() {
        assert_eq!(describe_error(&serde_json::json!("boom")), "boom");
        assert_eq!(
            describe_error(&serde_json::json!({"title": "t", "message": "m"})),
            "t: m"
        );
    }
}
