//! Error types for the square renderer
//!
//! Only failures that abort a whole render live in [`RenderError`]. Per-layer
//! failures are logged and turned into absent layers by their callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Render Error Enum ==
/// Errors that terminate a render request.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Square identifier did not match `[A-J](1-12)`
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    /// Query string could not be deserialized at all
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Quadrant identifier was not one of Q1..Q4
    #[error("Invalid quadrant: {0}")]
    InvalidQuadrant(String),

    /// The mandatory base layer could not be fetched or decoded
    #[error("Base layer unavailable: {0}")]
    BaseLayerUnavailable(String),

    /// Flattening or PNG encoding of the final raster failed
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RenderError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RenderError::InvalidSquare(_)
            | RenderError::InvalidQuery(_)
            | RenderError::InvalidQuadrant(_) => {
                StatusCode::BAD_REQUEST
            }
            RenderError::BaseLayerUnavailable(_) => StatusCode::BAD_GATEWAY,
            RenderError::Encoding(_) | RenderError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Fetch Error ==
/// Failure of a single remote layer fetch. Never surfaced to clients.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("layer not found: {0}")]
    NotFound(String),
}

// == Store Error ==
/// Failure of an exploration-state lookup. Never surfaced to clients.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// == Result Type Alias ==
/// Convenience Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
