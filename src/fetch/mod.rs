//! Fetch Module
//!
//! Read-through access to remote layer bitmaps. A fetch either yields bytes
//! or an absent layer; it never fails the caller.

mod source;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::FetchCache;
use crate::error::FetchError;
use crate::layers::LayerRequest;

pub use source::{HttpLayerSource, LayerSource, MemoryLayerSource};

// == Fetched Layer ==
/// Outcome of fetching one layer. `bytes` is `None` when the layer is absent.
#[derive(Debug, Clone)]
pub struct FetchedLayer {
    pub key: String,
    pub bytes: Option<Bytes>,
}

impl FetchedLayer {
    pub fn is_present(&self) -> bool {
        self.bytes.is_some()
    }
}

// == Layer Fetcher ==
/// Cache-backed layer fetcher shared by all requests.
///
/// Two requests missing the same URL at once may both hit the source; the
/// later insert simply replaces the earlier one.
#[derive(Clone)]
pub struct LayerFetcher {
    cache: Arc<RwLock<FetchCache>>,
    source: Arc<dyn LayerSource>,
    timeout: Duration,
}

impl LayerFetcher {
    pub fn new(cache: Arc<RwLock<FetchCache>>, source: Arc<dyn LayerSource>, timeout: Duration) -> Self {
        Self {
            cache,
            source,
            timeout,
        }
    }

    /// Shared handle to the underlying cache.
    pub fn cache(&self) -> Arc<RwLock<FetchCache>> {
        self.cache.clone()
    }

    // == Fetch ==
    /// Returns the bytes at `url`, from cache when fresh.
    ///
    /// Cache hits only take the read lock; the write lock is taken to store
    /// a fresh fetch.
    ///
    /// Network errors, error statuses and timeouts all yield `None`.
    pub async fn fetch(&self, url: &str) -> Option<Bytes> {
        let cached = self.cache.read().await.get(url);
        if let Some(bytes) = cached {
            debug!(url, "Layer served from cache");
            return Some(bytes);
        }

        let result = match tokio::time::timeout(self.timeout, self.source.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout.as_millis() as u64)),
        };

        match result {
            Ok(bytes) => {
                self.cache.write().await.insert(url.to_string(), bytes.clone());
                Some(bytes)
            }
            Err(e) => {
                warn!(url, error = %e, "Layer fetch failed, treating layer as absent");
                None
            }
        }
    }

    // == Fetch All ==
    /// Fetches every request concurrently, preserving request order.
    pub async fn fetch_all(&self, requests: &[LayerRequest]) -> Vec<FetchedLayer> {
        let fetches = requests.iter().map(|request| async move {
            FetchedLayer {
                key: request.key.clone(),
                bytes: self.fetch(&request.url).await,
            }
        });

        let layers = join_all(fetches).await;
        debug!(
            requested = requests.len(),
            present = layers.iter().filter(|l| l.is_present()).count(),
            "Layer fan-out complete"
        );
        layers
    }
}
