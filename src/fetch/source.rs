//! Layer sources: where layer bytes come from on a cache miss.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use tracing::{debug, trace, warn};

use crate::error::FetchError;

/// User-Agent sent to the layer object store.
const USER_AGENT: &str = concat!("square_renderer/", env!("CARGO_PKG_VERSION"));

/// Something that can fetch raw layer bytes by URL.
///
/// Implementations report failures as [`FetchError`]; the fetcher turns
/// them into absent layers.
pub trait LayerSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, FetchError>>;
}

// == HTTP Source ==
/// Fetches layers from the remote object store over HTTP.
#[derive(Clone)]
pub struct HttpLayerSource {
    client: reqwest::Client,
}

impl HttpLayerSource {
    /// Creates a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| FetchError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl LayerSource for HttpLayerSource {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, FetchError>> {
        Box::pin(async move {
            trace!(url, "Layer GET starting");

            let response = self.client.get(url).send().await.map_err(|e| {
                warn!(
                    url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "Layer request failed"
                );
                FetchError::Request(e.to_string())
            })?;

            let status = response.status();
            if !status.is_success() {
                debug!(url, status = status.as_u16(), "Layer request returned error status");
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FetchError::Request(format!("failed to read body: {e}")))?;
            trace!(url, bytes = bytes.len(), "Layer body read");
            Ok(bytes)
        })
    }
}

// == In-Memory Source ==
/// Serves layers from a map held in memory and counts every fetch.
///
/// Useful for offline rendering and for exercising the pipeline without a
/// network. URLs not in the map behave like a 404.
#[derive(Debug, Default)]
pub struct MemoryLayerSource {
    layers: RwLock<HashMap<String, Bytes>>,
    failing: RwLock<Vec<String>>,
    fetches: RwLock<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl MemoryLayerSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers bytes to serve for `url`.
    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Bytes>) {
        if let Ok(mut layers) = self.layers.write() {
            layers.insert(url.into(), bytes.into());
        }
    }

    /// Makes every fetch of `url` fail as if the network were down.
    pub fn fail(&self, url: impl Into<String>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.push(url.into());
        }
    }

    /// Number of fetches issued for `url`.
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches
            .read()
            .map(|f| f.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of fetches issued overall.
    pub fn total_fetches(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl LayerSource for MemoryLayerSource {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, FetchError>> {
        Box::pin(async move {
            self.total.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut fetches) = self.fetches.write() {
                *fetches.entry(url.to_string()).or_insert(0) += 1;
            }

            let failing = self
                .failing
                .read()
                .map(|f| f.iter().any(|u| u == url))
                .unwrap_or(false);
            if failing {
                return Err(FetchError::Request(format!("simulated network error for {url}")));
            }

            self.layers
                .read()
                .ok()
                .and_then(|layers| layers.get(url).cloned())
                .ok_or_else(|| FetchError::NotFound(url.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_serves_and_counts() {
        let source = MemoryLayerSource::new();
        source.insert("u", Bytes::from_static(b"png"));

        assert_eq!(source.fetch("u").await.unwrap().as_ref(), b"png");
        assert!(matches!(source.fetch("missing").await, Err(FetchError::NotFound(_))));
        assert_eq!(source.fetch_count("u"), 1);
        assert_eq!(source.total_fetches(), 2);
    }

    #[tokio::test]
    async fn test_memory_source_simulated_failure() {
        let source = MemoryLayerSource::new();
        source.insert("u", Bytes::from_static(b"png"));
        source.fail("u");

        assert!(matches!(source.fetch("u").await, Err(FetchError::Request(_))));
    }

    #[test]
    fn test_http_source_builds() {
        assert!(HttpLayerSource::new(Duration::from_secs(5)).is_ok());
    }
}
