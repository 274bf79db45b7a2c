//! Layer Module
//!
//! Maps a square to the ordered list of layer bitmaps it needs. Pure: no I/O
//! and no failure mode.

pub mod membership;

use serde::Serialize;

use crate::square::SquareId;
use membership::{
    contains, BLIGHT_SQUARES, INARIKO_CIRCLE_SQUARES, LDW_SQUARES, OTHER_PATH_SQUARES,
    PSL_SQUARES, RUDANIA_CIRCLE_SQUARES, SHARED_CIRCLE_SQUARES,
};

/// Layer names as they appear in the object store.
pub mod names {
    pub const BASE: &str = "MAP_0002_Map-Base";
    pub const FOG: &str = "MAP_0001_hidden-areas";
    pub const BLIGHT: &str = "MAP_0000_BLIGHT";
    pub const REGION_BORDERS: &str = "MAP_0001s_0003_Region-Borders";
    pub const PATH_PSL: &str = "MAP_0003s_0000_PSL";
    pub const PATH_LDW: &str = "MAP_0003s_0001_LDW";
    pub const PATH_OTHER: &str = "MAP_0003s_0002_Other-Paths";
    pub const CIRCLE_RUDANIA_INNER: &str = "MAP_0004s_0000_Rudania-Circle-Inner";
    pub const CIRCLE_RUDANIA_OUTER: &str = "MAP_0004s_0001_Rudania-Circle-Outer";
    pub const CIRCLE_INARIKO_INNER: &str = "MAP_0004s_0002_Inariko-Circle-Inner";
    pub const CIRCLE_INARIKO_OUTER: &str = "MAP_0004s_0003_Inariko-Circle-Outer";
    pub const CIRCLE_VHINTL_INNER: &str = "MAP_0004s_0004_Vhintl-Circle-Inner";
    pub const CIRCLE_VHINTL_OUTER: &str = "MAP_0004s_0005_Vhintl-Circle-Outer";
}

// == Layer Request ==
/// One layer bitmap to fetch for a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerRequest {
    /// Layer name, used as the composite key
    pub key: String,
    /// Fully resolved object URL
    pub url: String,
}

impl LayerRequest {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
        }
    }
}

/// Per-request knobs that change which layers are requested.
#[derive(Debug, Clone, Default)]
pub struct LayerOptions {
    /// Replaces the base layer URL (from the exploration store)
    pub base_override: Option<String>,
    /// Whether the fog layer is needed at all
    pub include_fog: bool,
}

/// Builds the object URL of `layer` for `square`.
pub fn layer_url(base_url: &str, layer: &str, square: &SquareId) -> String {
    format!(
        "{}/{layer}/{layer}_{square}.png",
        base_url.trim_end_matches('/')
    )
}

/// Optional overlay layers that apply to `square`, in z-order.
pub fn overlay_layer_names(square: &SquareId) -> Vec<&'static str> {
    let key = square.to_string();
    let mut layers = Vec::new();

    if contains(BLIGHT_SQUARES, &key) {
        layers.push(names::BLIGHT);
    }

    layers.push(names::REGION_BORDERS);

    for (table, name) in [
        (PSL_SQUARES, names::PATH_PSL),
        (LDW_SQUARES, names::PATH_LDW),
        (OTHER_PATH_SQUARES, names::PATH_OTHER),
    ] {
        if contains(table, &key) {
            layers.push(name);
        }
    }

    layers.extend(circle_layer_names(&key));
    layers
}

/// Village ring layers: zero, two or four depending on the square's group.
fn circle_layer_names(square: &str) -> &'static [&'static str] {
    if contains(RUDANIA_CIRCLE_SQUARES, square) {
        &[names::CIRCLE_RUDANIA_INNER, names::CIRCLE_RUDANIA_OUTER]
    } else if contains(INARIKO_CIRCLE_SQUARES, square) {
        &[names::CIRCLE_INARIKO_INNER, names::CIRCLE_INARIKO_OUTER]
    } else if contains(SHARED_CIRCLE_SQUARES, square) {
        &[
            names::CIRCLE_RUDANIA_INNER,
            names::CIRCLE_RUDANIA_OUTER,
            names::CIRCLE_VHINTL_INNER,
            names::CIRCLE_VHINTL_OUTER,
        ]
    } else {
        &[]
    }
}

// == Resolver ==
/// Resolves every layer a render of `square` needs.
///
/// The base layer is always first, the fog layer (when requested) last;
/// optional overlays sit between them in z-order.
pub fn resolve_layers(base_url: &str, square: &SquareId, options: &LayerOptions) -> Vec<LayerRequest> {
    let base = options
        .base_override
        .clone()
        .unwrap_or_else(|| layer_url(base_url, names::BASE, square));

    let mut requests = vec![LayerRequest::new(names::BASE, base)];
    requests.extend(
        overlay_layer_names(square)
            .into_iter()
            .map(|name| LayerRequest::new(name, layer_url(base_url, name, square))),
    );

    if options.include_fog {
        requests.push(LayerRequest::new(
            names::FOG,
            layer_url(base_url, names::FOG, square),
        ));
    }

    requests
}
