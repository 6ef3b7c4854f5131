//! Signed configuration bundle client.
//!
//! This crate retrieves a remotely hosted, digitally signed configuration
//! bundle over HTTP, verifies it against a set of trusted Ed25519 keys
//! before any byte of it is trusted, and reconciles the server clock
//! against the local clock so callers can detect drift.
//!
//! The bundle is a zip archive with two fixed entries: `export.bin` (the
//! opaque configuration payload) and `export.sig` (a detached signature
//! over the payload bytes). A fetch is all-or-nothing: no
//! [`ConfigDownload`] is ever produced for an unverified payload.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use zoneconf::{
//!     CacheController, ConfigFetcher, FetcherConfig, HttpTransport, NoopCacheStore,
//!     SignatureVerifier, TrustStore, ZoneCode,
//! };
//!
//! # async fn example() -> zoneconf::FetchResult<()> {
//! let config = FetcherConfig::from_env();
//! let trust = TrustStore::from_encoded_keys(&config.trusted_keys)?;
//!
//! let fetcher = ConfigFetcher::new(
//!     Arc::new(HttpTransport::new(&config)?),
//!     SignatureVerifier::new(trust),
//!     CacheController::new(Arc::new(NoopCacheStore)),
//! );
//!
//! let download = fetcher.fetch(&ZoneCode::new("DE")).await?;
//! println!("clock offset: {} ms", download.local_offset.num_milliseconds());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `ZONECONF_BASE_URL` | Distribution base URL (default: `https://cdn.zoneconf.dev/v1`) |
//! | `ZONECONF_TRUSTED_KEYS` | Comma-separated Base64 SPKI public keys |
//! | `ZONECONF_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod archive;
pub mod cache;
pub mod error;
pub mod fetcher;
pub mod time;
pub mod transport;
pub mod trust;
pub mod types;
pub mod verify;

// Re-export main types
pub use cache::{CacheController, HttpCacheStore, NoopCacheStore};
pub use error::{FetchError, FetchResult};
pub use fetcher::{ConfigFetcher, PAYLOAD_ENTRY, SIGNATURE_ENTRY};
pub use time::resolve_server_time;
pub use transport::{BundleTransport, HttpTransport};
pub use trust::{TrustStore, TrustedKey};
pub use types::{
    BundleHeaders, CacheInfo, ConfigDownload, FetcherConfig, RawResponse, ZoneCode,
};
pub use verify::{SignatureVerifier, Verification};
