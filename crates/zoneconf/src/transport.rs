//! Bundle transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::types::{BundleHeaders, CacheInfo, FetcherConfig, RawResponse, ZoneCode};

/// User agent for bundle requests.
const USER_AGENT_VALUE: &str = concat!("zoneconf/", env!("CARGO_PKG_VERSION"));

/// Transport used to retrieve the compressed bundle for a zone.
///
/// Injected into [`ConfigFetcher`](crate::fetcher::ConfigFetcher) at
/// construction. Implementations return the response for any HTTP status;
/// status policy belongs to the fetcher. Cache-aware transports mark
/// responses they serve from a local store via [`CacheInfo`].
#[async_trait]
pub trait BundleTransport: Send + Sync {
    /// Issue the request for the given zone and return the raw response.
    async fn fetch_bundle(&self, zone: &ZoneCode) -> FetchResult<RawResponse>;
}

/// Plain HTTPS transport without a local cache.
///
/// Every response it produces is live, so the fetcher's local reference
/// clock for these responses is always the current time.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client.
    client: reqwest::Client,

    /// Base URL for the distribution endpoint.
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &FetcherConfig) -> FetchResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| FetchError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        // Normalize base URL (remove trailing slash)
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bundle_url(&self, zone: &ZoneCode) -> String {
        format!("{}/config/{}", self.base_url, zone)
    }
}

#[async_trait]
impl BundleTransport for HttpTransport {
    async fn fetch_bundle(&self, zone: &ZoneCode) -> FetchResult<RawResponse> {
        let url = self.bundle_url(zone);
        debug!(url = %url, "requesting configuration bundle");

        let response = self.client.get(&url).send().await?;

        let status = response.status().as_u16();
        let headers = BundleHeaders::from_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
            cache: CacheInfo::live(),
        })
    }
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_transport(mock_server: &MockServer) -> HttpTransport {
        let config = FetcherConfig::default().with_base_url(mock_server.uri());
        HttpTransport::new(&config).expect("failed to create transport")
    }

    #[tokio::test]
    async fn fetches_body_and_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/config/DE"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"archive bytes".to_vec())
                    .insert_header("etag", "\"v42\""),
            )
            .mount(&mock_server)
            .await;

        let transport = create_transport(&mock_server).await;
        let response = transport
            .fetch_bundle(&ZoneCode::new("DE"))
            .await
            .expect("fetch failed");

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"archive bytes");
        assert_eq!(response.headers.etag.as_deref(), Some("\"v42\""));
        assert!(!response.cache.served_from_cache);
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_raised() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/config/XX"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such zone"))
            .mount(&mock_server)
            .await;

        let transport = create_transport(&mock_server).await;
        let response = transport
            .fetch_bundle(&ZoneCode::new("XX"))
            .await
            .expect("transport must not fail on status");

        assert_eq!(response.status, 404);
        assert_eq!(response.body, b"no such zone");
    }

    #[tokio::test]
    async fn sends_user_agent_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/config/DE"))
            .and(header("user-agent", USER_AGENT_VALUE))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = create_transport(&mock_server).await;
        let _ = transport.fetch_bundle(&ZoneCode::new("DE")).await;
    }
}
