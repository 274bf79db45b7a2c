//! API Module
//!
//! HTTP handlers and routing for the renderer.
//!
//! # Endpoints
//! - `GET /map/square?square=H8&quadrant=Q3&noMask=false&highlight=true`
//! - `GET /stats` - Fetch cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
