//! Configuration Module
//!
//! Handles loading and managing renderer configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_SOFT_CAPACITY, DEFAULT_TTL_SECS};

/// Default location of the square layer bitmaps.
pub const DEFAULT_LAYER_BASE_URL: &str = "https://storage.googleapis.com/tinglebot/maps/squares";

/// Renderer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL under which every layer bitmap is addressed
    pub layer_base_url: String,
    /// Time-to-live of fetched layer bytes, in seconds
    pub fetch_cache_ttl: u64,
    /// Entry count above which an insert triggers a stale sweep
    pub fetch_cache_soft_capacity: usize,
    /// Per-fetch timeout in seconds
    pub fetch_timeout: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Output raster width in pixels
    pub canvas_width: u32,
    /// Output raster height in pixels
    pub canvas_height: u32,
    /// `max-age` advertised on rendered images, in seconds
    pub response_max_age: u64,
    /// Optional JSON snapshot of exploration state
    pub exploration_state_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `LAYER_BASE_URL` - Layer object store base URL
    /// - `FETCH_CACHE_TTL` - Fetched layer TTL in seconds (default: 300)
    /// - `FETCH_CACHE_SOFT_CAPACITY` - Sweep threshold (default: 200)
    /// - `FETCH_TIMEOUT` - Per-fetch timeout in seconds (default: 10)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `CANVAS_WIDTH` / `CANVAS_HEIGHT` - Output size (default: 2400x1666)
    /// - `RESPONSE_MAX_AGE` - Cache-Control max-age (default: 60)
    /// - `EXPLORATION_STATE_PATH` - Exploration JSON file (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            layer_base_url: env::var("LAYER_BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.layer_base_url),
            fetch_cache_ttl: parse_var("FETCH_CACHE_TTL").unwrap_or(defaults.fetch_cache_ttl),
            fetch_cache_soft_capacity: parse_var("FETCH_CACHE_SOFT_CAPACITY")
                .unwrap_or(defaults.fetch_cache_soft_capacity),
            fetch_timeout: parse_var("FETCH_TIMEOUT").unwrap_or(defaults.fetch_timeout),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            canvas_width: parse_var::<u32>("CANVAS_WIDTH")
                .filter(|w| *w > 1)
                .unwrap_or(defaults.canvas_width),
            canvas_height: parse_var::<u32>("CANVAS_HEIGHT")
                .filter(|h| *h > 1)
                .unwrap_or(defaults.canvas_height),
            response_max_age: parse_var("RESPONSE_MAX_AGE").unwrap_or(defaults.response_max_age),
            exploration_state_path: env::var("EXPLORATION_STATE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Per-fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            layer_base_url: DEFAULT_LAYER_BASE_URL.to_string(),
            fetch_cache_ttl: DEFAULT_TTL_SECS,
            fetch_cache_soft_capacity: DEFAULT_SOFT_CAPACITY,
            fetch_timeout: 10,
            cleanup_interval: 60,
            canvas_width: 2400,
            canvas_height: 1666,
            response_max_age: 60,
            exploration_state_path: None,
        }
    }
}
