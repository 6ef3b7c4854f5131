//! Bundle fetch orchestration.
//!
//! One fetch is a strictly linear pipeline: transport → raw bytes →
//! extracted entries → verified payload → timestamped result. Nothing is
//! retained between calls, so concurrent fetches need no synchronization.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::archive;
use crate::cache::CacheController;
use crate::error::{FetchError, FetchResult};
use crate::time::resolve_server_time;
use crate::transport::BundleTransport;
use crate::types::{ConfigDownload, RawResponse, ZoneCode};
use crate::verify::{SignatureVerifier, Verification};

/// Archive entry holding the configuration payload.
pub const PAYLOAD_ENTRY: &str = "export.bin";

/// Archive entry holding the detached signature over the payload.
pub const SIGNATURE_ENTRY: &str = "export.sig";

/// Fetches, verifies, and timestamps configuration bundles.
///
/// All collaborators are injected at construction. A fetch is
/// all-or-nothing: a [`ConfigDownload`] is produced only when the archive
/// is intact, both fixed entries are present, and the detached signature
/// validates against a trusted key.
pub struct ConfigFetcher {
    transport: Arc<dyn BundleTransport>,
    verifier: SignatureVerifier,
    cache: CacheController,
}

impl ConfigFetcher {
    /// Create a fetcher from its collaborators.
    pub fn new(
        transport: Arc<dyn BundleTransport>,
        verifier: SignatureVerifier,
        cache: CacheController,
    ) -> Self {
        Self {
            transport,
            verifier,
            cache,
        }
    }

    /// The cache facade (eviction and response inspection).
    pub fn cache(&self) -> &CacheController {
        &self.cache
    }

    /// Fetch and verify the configuration bundle for a zone.
    pub async fn fetch(&self, zone: &ZoneCode) -> FetchResult<ConfigDownload> {
        let response = self.transport.fetch_bundle(zone).await?;

        if !response.is_success() {
            return Err(FetchError::Transport {
                status: response.status,
                body: body_snippet(&response),
            });
        }

        let local_time = self.local_reference_time(zone, &response);

        let entries = archive::unzip(&response.body)?;
        debug!(zone = %zone, entries = entries.len(), "bundle archive extracted");

        let payload = entries
            .get(PAYLOAD_ENTRY)
            .ok_or_else(|| FetchError::MissingEntry {
                entry: PAYLOAD_ENTRY.to_string(),
            })?;
        let signature = entries
            .get(SIGNATURE_ENTRY)
            .ok_or_else(|| FetchError::MissingEntry {
                entry: SIGNATURE_ENTRY.to_string(),
            })?;

        match self.verifier.check(payload, signature) {
            Verification::Verified { key_fingerprint } => {
                debug!(zone = %zone, key = %key_fingerprint, "bundle signature verified");
            }
            Verification::Rejected { reason } => {
                return Err(FetchError::SignatureRejected { reason });
            }
        }

        let server_time = resolve_server_time(
            response.headers.date.as_deref(),
            self.cache.cached_request_timestamp(&response),
        )
        .unwrap_or(local_time);
        let local_offset = server_time - local_time;

        info!(
            zone = %zone,
            bytes = payload.len(),
            server_time = %server_time,
            offset_ms = local_offset.num_milliseconds(),
            "configuration bundle fetched"
        );

        Ok(ConfigDownload {
            raw_data: payload.clone(),
            server_time,
            local_offset,
        })
    }

    /// Local reference clock for the offset computation.
    ///
    /// For a cache-served response this is the moment the original request
    /// was issued, not now; otherwise the current clock.
    fn local_reference_time(&self, zone: &ZoneCode, response: &RawResponse) -> DateTime<Utc> {
        if self.cache.was_cache_served(response) {
            match self.cache.cached_request_timestamp(response) {
                Some(at) => at,
                None => {
                    warn!(zone = %zone, "cache-served response without request timestamp");
                    Utc::now()
                }
            }
        } else {
            Utc::now()
        }
    }
}

fn body_snippet(response: &RawResponse) -> String {
    const MAX_CHARS: usize = 256;
    String::from_utf8_lossy(&response.body)
        .chars()
        .take(MAX_CHARS)
        .collect()
}
