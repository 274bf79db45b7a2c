//! API Handlers
//!
//! HTTP request handlers for each renderer endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use crate::cache::FetchCache;
use crate::config::Config;
use crate::error::{FetchError, RenderError, Result};
use crate::exploration::{ExplorationStore, JsonFileExplorationStore, MemoryExplorationStore};
use crate::fetch::{HttpLayerSource, LayerFetcher, LayerSource};
use crate::models::{HealthResponse, SquareQuery, StatsResponse};
use crate::overlay::OverlayCache;
use crate::render::Renderer;

/// Application state shared across all handlers.
///
/// Holds the renderer (and through it the shared fetch and overlay caches).
#[derive(Clone)]
pub struct AppState {
    /// Square renderer
    pub renderer: Arc<Renderer>,
    /// `max-age` sent with rendered images, in seconds
    pub response_max_age: u64,
}

impl AppState {
    /// Creates a new AppState around an existing renderer.
    pub fn new(renderer: Renderer, response_max_age: u64) -> Self {
        Self {
            renderer: Arc::new(renderer),
            response_max_age,
        }
    }

    /// Wires caches, layer source and exploration store from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, FetchError> {
        let source: Arc<dyn LayerSource> = Arc::new(HttpLayerSource::new(config.fetch_timeout())?);
        let store: Arc<dyn ExplorationStore> = match &config.exploration_state_path {
            Some(path) => Arc::new(JsonFileExplorationStore::new(path)),
            None => Arc::new(MemoryExplorationStore::new()),
        };
        Ok(Self::with_parts(config, source, store))
    }

    /// Builds state from configuration with the given collaborators.
    pub fn with_parts(
        config: &Config,
        source: Arc<dyn LayerSource>,
        store: Arc<dyn ExplorationStore>,
    ) -> Self {
        let cache = Arc::new(RwLock::new(FetchCache::new(
            std::time::Duration::from_secs(config.fetch_cache_ttl),
            config.fetch_cache_soft_capacity,
        )));
        let fetcher = LayerFetcher::new(cache, source, config.fetch_timeout());
        let overlays = Arc::new(OverlayCache::new(config.canvas_width, config.canvas_height));
        let renderer = Renderer::new(
            fetcher,
            overlays,
            store,
            config.layer_base_url.clone(),
            config.fetch_timeout(),
        );
        Self::new(renderer, config.response_max_age)
    }

    /// Shared handle to the fetch cache.
    pub fn cache(&self) -> Arc<RwLock<FetchCache>> {
        self.renderer.fetcher().cache()
    }
}

/// Handler for GET /map/square
///
/// Renders the requested square as PNG.
///
/// A query string that does not deserialize is answered with a JSON 400
/// like every other rejected request.
pub async fn square_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<SquareQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(|rejection| RenderError::InvalidQuery(rejection.body_text()))?;
    let request = query.into_render_request();
    let rendered = state.renderer.render(&request).await?;

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.response_max_age),
        ),
    ];
    Ok((headers, rendered.png).into_response())
}

/// Handler for GET /stats
///
/// Returns fetch cache and overlay cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache().read().await.stats();
    Json(StatsResponse::new(
        &stats,
        state.renderer.overlays().generations(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryLayerSource;

    fn test_state() -> AppState {
        let config = Config {
            canvas_width: 64,
            canvas_height: 48,
            ..Config::default()
        };
        AppState::with_parts(
            &config,
            Arc::new(MemoryLayerSource::new()),
            Arc::new(MemoryExplorationStore::new()),
        )
    }

    #[tokio::test]
    async fn test_square_handler_invalid_square() {
        let query = SquareQuery {
            square: Some("K1".to_string()),
            ..Default::default()
        };
        let result = square_handler(State(test_state()), Ok(Query(query))).await;
        assert!(matches!(result, Err(RenderError::InvalidSquare(_))));
    }

    #[tokio::test]
    async fn test_square_handler_missing_base() {
        let query = SquareQuery {
            square: Some("A1".to_string()),
            ..Default::default()
        };
        let result = square_handler(State(test_state()), Ok(Query(query))).await;
        assert!(matches!(result, Err(RenderError::BaseLayerUnavailable(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(test_state())).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.overlay_generations, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_from_config_builds() {
        assert!(AppState::from_config(&Config::default()).is_ok());
    }
}
