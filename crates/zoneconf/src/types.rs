//! Core data types for the bundle client.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier selecting which regional bundle to fetch.
///
/// Supplied by configuration and never mutated by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneCode(String);

impl ZoneCode {
    /// Create a zone code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The underlying identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for ZoneCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// Headers extracted from a bundle response.
#[derive(Debug, Clone, Default)]
pub struct BundleHeaders {
    /// `Date` header value, verbatim.
    pub date: Option<String>,

    /// ETag for conditional requests.
    pub etag: Option<String>,

    /// Cache-Control header.
    pub cache_control: Option<String>,

    /// Content-Length.
    pub content_length: Option<u64>,
}

impl BundleHeaders {
    /// Parse headers from a response.
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        Self {
            date: headers
                .get(reqwest::header::DATE)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            etag: headers
                .get(reqwest::header::ETAG)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            cache_control: headers
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            content_length: headers
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok()),
        }
    }
}

/// Cache metadata a transport attaches to each response.
#[derive(Debug, Clone, Default)]
pub struct CacheInfo {
    /// Whether the response was served from a local HTTP cache rather than
    /// fetched live for this call.
    pub served_from_cache: bool,

    /// When the originally cached request was issued, if cache-served.
    pub original_request_at: Option<DateTime<Utc>>,
}

impl CacheInfo {
    /// Metadata for a response fetched live from the network.
    pub fn live() -> Self {
        Self::default()
    }

    /// Metadata for a cache-served response, given the original request
    /// timestamp in milliseconds since the epoch.
    pub fn cached_at_millis(request_millis: i64) -> Self {
        Self {
            served_from_cache: true,
            original_request_at: DateTime::from_timestamp_millis(request_millis),
        }
    }
}

/// Transport-level result of a bundle request.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,

    /// Parsed response headers.
    pub headers: BundleHeaders,

    /// Raw body bytes (the compressed archive).
    pub body: Vec<u8>,

    /// Cache metadata from the transport layer.
    pub cache: CacheInfo,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A verified configuration bundle.
///
/// Constructed only after signature verification succeeds; `raw_data` is
/// always the verified payload bytes.
#[derive(Debug, Clone)]
pub struct ConfigDownload {
    /// Verified configuration payload. Opaque to this crate.
    pub raw_data: Vec<u8>,

    /// Authoritative server timestamp for this fetch.
    pub server_time: DateTime<Utc>,

    /// `server_time - local_time`; negative when the local clock is ahead
    /// of the server.
    pub local_offset: TimeDelta,
}

/// Fetcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Base URL for the distribution endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Trusted public keys (Base64 SPKI DER), supplied out-of-band.
    #[serde(default)]
    pub trusted_keys: Vec<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://cdn.zoneconf.dev/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            trusted_keys: Vec::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl FetcherConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `ZONECONF_BASE_URL` | Distribution base URL |
    /// | `ZONECONF_TRUSTED_KEYS` | Comma-separated Base64 SPKI public keys |
    /// | `ZONECONF_TIMEOUT` | Request timeout in seconds |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ZONECONF_BASE_URL").unwrap_or_else(|_| default_base_url()),
            trusted_keys: std::env::var("ZONECONF_TRUSTED_KEYS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|key| !key.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            timeout_secs: std::env::var("ZONECONF_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Add a trusted key (Base64 SPKI DER).
    pub fn with_trusted_key(mut self, key: impl Into<String>) -> Self {
        self.trusted_keys.push(key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = FetcherConfig::default()
            .with_base_url("https://mirror.example.dev/v1")
            .with_trusted_key("AAAA")
            .with_timeout_secs(5);

        assert_eq!(config.base_url, "https://mirror.example.dev/v1");
        assert_eq!(config.trusted_keys, vec!["AAAA".to_string()]);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = FetcherConfig::default();
        assert_eq!(config.base_url, "https://cdn.zoneconf.dev/v1");
        assert!(config.trusted_keys.is_empty());
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn cache_info_from_millis() {
        let info = CacheInfo::cached_at_millis(1_641_369_605_000);
        assert!(info.served_from_cache);

        let at = info.original_request_at.unwrap();
        assert_eq!(at.timestamp_millis(), 1_641_369_605_000);
    }

    #[test]
    fn live_response_has_no_cache_metadata() {
        let info = CacheInfo::live();
        assert!(!info.served_from_cache);
        assert!(info.original_request_at.is_none());
    }

    #[test]
    fn success_status_range() {
        let mut response = RawResponse {
            status: 200,
            headers: BundleHeaders::default(),
            body: Vec::new(),
            cache: CacheInfo::live(),
        };
        assert!(response.is_success());

        response.status = 204;
        assert!(response.is_success());

        response.status = 304;
        assert!(!response.is_success());

        response.status = 404;
        assert!(!response.is_success());
    }

    #[test]
    fn bundle_headers_from_response_headers() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::DATE,
            "Wed, 05 Jan 2022 08:00:00 GMT".parse().unwrap(),
        );
        headers.insert(reqwest::header::ETAG, "\"abc123\"".parse().unwrap());
        headers.insert(reqwest::header::CONTENT_LENGTH, "512".parse().unwrap());

        let parsed = BundleHeaders::from_headers(&headers);
        assert_eq!(
            parsed.date.as_deref(),
            Some("Wed, 05 Jan 2022 08:00:00 GMT")
        );
        assert_eq!(parsed.etag.as_deref(), Some("\"abc123\""));
        assert_eq!(parsed.content_length, Some(512));
        assert!(parsed.cache_control.is_none());
    }

    #[test]
    fn zone_code_display() {
        let zone = ZoneCode::new("DE");
        assert_eq!(zone.to_string(), "DE");
        assert_eq!(zone.as_str(), "DE");
        assert_eq!(ZoneCode::from("DE"), zone);
    }
}
