//! HTTP fetch client
//!
//! Thin wrapper over a reqwest session. It owns the timeout policy and maps
//! every network-side failure into the upstream error class. No retries are
//! attempted here; a transient failure surfaces to the caller as is.

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::error::{AnisourceError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the HTTP client and the sites it talks to
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Base URL of the anime site, no trailing slash (default: https://animepahe.com)
    pub site_url: String,
    /// Base URL of the ranking site, no trailing slash (default: https://myanimelist.net)
    pub ranking_site_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: USER_AGENT.to_string(),
            site_url: "https://animepahe.com".to_string(),
            ranking_site_url: "https://myanimelist.net".to_string(),
        }
    }
}

/// HTTP client wrapper
///
/// Handles all HTTP communication: timeout, user agent, cookie session and
/// status checking. Header sets are built by the caller per request.
pub struct AnisourceClient {
    client: reqwest::Client,
}

impl AnisourceClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(AnisourceError::Upstream)?;

        Ok(Self { client })
    }

    /// Fetch a URL and return the body as text
    ///
    /// # Arguments
    /// * `url` - Absolute URL, query string included
    /// * `headers` - Headers for this request
    ///
    /// # Errors
    /// - `Upstream` - Transport failure or unreadable body
    /// - `UpstreamStatus` - Any non-2xx status
    pub async fn fetch_text(&self, url: &str, headers: HeaderMap) -> Result<String> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(AnisourceError::Upstream)?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Fetched");

        if !status.is_success() {
            return Err(AnisourceError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(AnisourceError::Upstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.site_url, "https://animepahe.com");
        assert_eq!(config.ranking_site_url, "https://myanimelist.net");
    }

    #[test]
    fn test_client_creation() {
        let client = AnisourceClient::new();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_text_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("referer", "https://animepahe.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnisourceClient::new().unwrap();
        let headers = crate::headers::referer_headers("https://animepahe.com").unwrap();
        let body = client
            .fetch_text(&format!("{}/page", server.uri()), headers)
            .await
            .unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_fetch_text_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = AnisourceClient::new().unwrap();
        let url = format!("{}/missing", server.uri());
        let result = client.fetch_text(&url, HeaderMap::new()).await;
        match result {
            Err(AnisourceError::UpstreamStatus { status, url: failed }) => {
                assert_eq!(status, 404);
                assert_eq!(failed, url);
            }
            _ => panic!("Expected UpstreamStatus error"),
        }
    }

    #[tokio::test]
    async fn test_fetch_text_connection_refused() {
        let client = AnisourceClient::new().unwrap();
        let result = client
            .fetch_text("http://127.0.0.1:1/unreachable", HeaderMap::new())
            .await;
        match result {
            Err(e) => assert!(e.is_upstream()),
            Ok(_) => panic!("Expected upstream error"),
        }
    }
}
