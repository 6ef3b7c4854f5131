//! HTTP cache control.
//!
//! The cache itself lives with the transport layer; this module consumes
//! only its evict-all capability plus the cache metadata the transport
//! attaches to each response. Eviction thread-safety is delegated entirely
//! to the underlying store; a fetch racing an eviction may observe either
//! cache state.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::FetchResult;
use crate::types::RawResponse;

/// Evict-all capability of the underlying HTTP cache.
#[async_trait]
pub trait HttpCacheStore: Send + Sync {
    /// Remove every cached entry. Evicting an empty cache is a no-op, not
    /// an error.
    async fn evict_all(&self) -> FetchResult<()>;
}

/// Cache store for transports without a local cache.
#[derive(Debug, Clone, Default)]
pub struct NoopCacheStore;

#[async_trait]
impl HttpCacheStore for NoopCacheStore {
    async fn evict_all(&self) -> FetchResult<()> {
        Ok(())
    }
}

/// Inspection and eviction facade over the transport's HTTP cache.
#[derive(Clone)]
pub struct CacheController {
    store: Arc<dyn HttpCacheStore>,
}

impl CacheController {
    /// Wrap an external cache store.
    pub fn new(store: Arc<dyn HttpCacheStore>) -> Self {
        Self { store }
    }

    /// Clear all entries from the underlying cache. Idempotent.
    pub async fn evict_all(&self) -> FetchResult<()> {
        debug!("evicting all cached bundle responses");
        self.store.evict_all().await
    }

    /// Whether the response was served from the local cache.
    pub fn was_cache_served(&self, response: &RawResponse) -> bool {
        response.cache.served_from_cache
    }

    /// When the originally cached request was issued, if cache-served.
    pub fn cached_request_timestamp(&self, response: &RawResponse) -> Option<DateTime<Utc>> {
        response.cache.original_request_at
    }
}

impl fmt::Debug for CacheController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheController").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::types::{BundleHeaders, CacheInfo};

    struct CountingStore {
        evictions: AtomicUsize,
    }

    #[async_trait]
    impl HttpCacheStore for CountingStore {
        async fn evict_all(&self) -> FetchResult<()> {
            self.evictions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn response_with(cache: CacheInfo) -> RawResponse {
        RawResponse {
            status: 200,
            headers: BundleHeaders::default(),
            body: Vec::new(),
            cache,
        }
    }

    #[tokio::test]
    async fn eviction_delegates_to_store() {
        let store = Arc::new(CountingStore {
            evictions: AtomicUsize::new(0),
        });
        let controller = CacheController::new(store.clone());

        controller.evict_all().await.unwrap();
        controller.evict_all().await.unwrap();

        assert_eq!(store.evictions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn noop_store_eviction_is_idempotent() {
        let controller = CacheController::new(Arc::new(NoopCacheStore));
        controller.evict_all().await.unwrap();
        controller.evict_all().await.unwrap();
    }

    #[test]
    fn live_response_is_not_cache_served() {
        let controller = CacheController::new(Arc::new(NoopCacheStore));
        let response = response_with(CacheInfo::live());

        assert!(!controller.was_cache_served(&response));
        assert!(controller.cached_request_timestamp(&response).is_none());
    }

    #[test]
    fn cached_response_exposes_request_timestamp() {
        let controller = CacheController::new(Arc::new(NoopCacheStore));
        let response = response_with(CacheInfo::cached_at_millis(1_641_369_605_000));

        assert!(controller.was_cache_served(&response));
        let at = controller.cached_request_timestamp(&response).unwrap();
        assert_eq!(at.timestamp_millis(), 1_641_369_605_000);
    }
}
