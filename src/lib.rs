//! Square Renderer - composites map squares on demand
//!
//! Fetches the layered artwork of one map square, applies the viewer's
//! fog-of-war and overlays, and serves the result as PNG over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod exploration;
pub mod fetch;
pub mod layers;
pub mod models;
pub mod overlay;
pub mod render;
pub mod square;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
