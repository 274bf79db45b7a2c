//! Request DTOs for the renderer API
//!
//! Defines the query parameters accepted by the square endpoint.

use serde::Deserialize;

use crate::render::RenderRequest;

/// Query string of `GET /map/square`.
///
/// # Fields
/// - `square`: square id such as `H8` (required, validated by the renderer)
/// - `quadrant`: viewer's current quadrant `Q1`..`Q4`
/// - `noMask`: boolean-ish, skip fog entirely
/// - `highlight`: boolean-ish, outline the current quadrant
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SquareQuery {
    #[serde(default)]
    pub square: Option<String>,
    #[serde(default)]
    pub quadrant: Option<String>,
    #[serde(default, rename = "noMask")]
    pub no_mask: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
}

/// Interprets a boolean-ish query value; absent or unrecognised is `false`.
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes" | "on")
    )
}

impl SquareQuery {
    /// Converts into a render request. A missing square becomes an empty id,
    /// which the renderer rejects.
    pub fn into_render_request(self) -> RenderRequest {
        RenderRequest {
            square: self.square.unwrap_or_default(),
            quadrant: self.quadrant,
            no_mask: parse_flag(self.no_mask.as_deref()),
            highlight: parse_flag(self.highlight.as_deref()),
        }
    }
}
