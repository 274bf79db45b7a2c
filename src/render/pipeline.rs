//! Square render pipeline.
//!
//! `Validating -> ResolvingLayers -> Fetching -> Compositing -> Encoding ->
//! Done`, or `Failed` from any stage. Only an invalid request, a missing
//! base layer or an encoding failure reach `Failed`; every optional layer or
//! overlay that goes wrong is logged and left out.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::future::try_join;
use tracing::{debug, info, instrument, warn};

use super::compositor::{decode, encode_png, fit_to_canvas, flatten, CompositeInput};
use super::fog::{extract_fog, fogged_quadrants};
use crate::error::{RenderError, Result};
use crate::exploration::{resolve_snapshot, ExplorationStore};
use crate::fetch::{FetchedLayer, LayerFetcher};
use crate::layers::{names, resolve_layers, LayerOptions};
use crate::overlay::highlight::{border_strips, HIGHLIGHT_COLOR, HIGHLIGHT_WIDTH};
use crate::overlay::OverlayCache;
use crate::square::{QuadrantId, SquareId};

// == Render Request ==
/// Raw render parameters as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// Square id, validated by the pipeline
    pub square: String,
    /// Viewer's current quadrant (always revealed)
    pub quadrant: Option<String>,
    /// Skip fog entirely
    pub no_mask: bool,
    /// Outline the current quadrant
    pub highlight: bool,
}

impl RenderRequest {
    pub fn new(square: impl Into<String>) -> Self {
        Self {
            square: square.into(),
            ..Default::default()
        }
    }
}

// == Render Stage ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Validating,
    ResolvingLayers,
    Fetching,
    Compositing,
    Encoding,
    Done,
    Failed,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStage::Validating => "validating",
            RenderStage::ResolvingLayers => "resolving-layers",
            RenderStage::Fetching => "fetching",
            RenderStage::Compositing => "compositing",
            RenderStage::Encoding => "encoding",
            RenderStage::Done => "done",
            RenderStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(square: &str, stage: RenderStage) {
    debug!(square, stage = %stage, "Render stage");
}

// == Rendered Square ==
/// A finished render.
#[derive(Debug, Clone)]
pub struct RenderedSquare {
    pub square: SquareId,
    /// PNG bytes
    pub png: Bytes,
    /// Keys of everything composited, bottom to top, starting with the base
    pub layers: Vec<String>,
    /// Quadrants that were obscured
    pub fogged: Vec<QuadrantId>,
}

impl RenderedSquare {
    /// Number of fog patches actually composited.
    pub fn fog_patch_count(&self) -> usize {
        self.layers.iter().filter(|k| k.starts_with("fog-")).count()
    }
}

// == Renderer ==
/// Renders squares using shared fetch and overlay caches.
pub struct Renderer {
    fetcher: LayerFetcher,
    overlays: Arc<OverlayCache>,
    store: Arc<dyn ExplorationStore>,
    base_url: String,
    lookup_timeout: Duration,
}

impl Renderer {
    /// The canvas size is taken from `overlays`.
    pub fn new(
        fetcher: LayerFetcher,
        overlays: Arc<OverlayCache>,
        store: Arc<dyn ExplorationStore>,
        base_url: impl Into<String>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            overlays,
            store,
            base_url: base_url.into(),
            lookup_timeout,
        }
    }

    pub fn fetcher(&self) -> &LayerFetcher {
        &self.fetcher
    }

    pub fn overlays(&self) -> &Arc<OverlayCache> {
        &self.overlays
    }

    /// Renders one square.
    #[instrument(skip(self, request), fields(square = %request.square))]
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderedSquare> {
        let started = Instant::now();
        let result = self.run(request).await;

        match &result {
            Ok(rendered) => info!(
                square = %rendered.square,
                stage = %RenderStage::Done,
                layers = rendered.layers.len(),
                fogged = rendered.fogged.len(),
                bytes = rendered.png.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Square rendered"
            ),
            Err(e) => warn!(
                square = %request.square,
                stage = %RenderStage::Failed,
                error = %e,
                "Square render failed"
            ),
        }

        result
    }

    async fn run(&self, request: &RenderRequest) -> Result<RenderedSquare> {
        enter(&request.square, RenderStage::Validating);
        let square = SquareId::parse(&request.square)?;
        let current = request
            .quadrant
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .map(str::parse::<QuadrantId>)
            .transpose()?;
        let label = square.to_string();

        let snapshot = resolve_snapshot(self.store.as_ref(), &square, self.lookup_timeout).await;
        let fogged = if request.no_mask {
            Vec::new()
        } else {
            fogged_quadrants(&snapshot.statuses, current)
        };

        enter(&label, RenderStage::ResolvingLayers);
        let options = LayerOptions {
            base_override: snapshot.base_override,
            include_fog: !fogged.is_empty(),
        };
        let mut requests = resolve_layers(&self.base_url, &square, &options);
        let base_index = requests
            .iter()
            .position(|r| r.key == names::BASE)
            .ok_or_else(|| RenderError::Internal(format!("{label}: no base layer resolved")))?;
        let base_request = requests.remove(base_index);

        enter(&label, RenderStage::Fetching);
        // A missing base aborts the render and drops the optional fetches still in flight
        let base_fetch = async {
            self.fetcher
                .fetch(&base_request.url)
                .await
                .ok_or_else(|| RenderError::BaseLayerUnavailable(label.clone()))
        };
        let optional_fetch = async { Ok::<_, RenderError>(self.fetcher.fetch_all(&requests).await) };
        let (base, fetched) = try_join(base_fetch, optional_fetch).await?;

        let mut fog = None;
        let mut overlays = Vec::new();
        for layer in fetched {
            if layer.key == names::FOG {
                fog = layer.bytes;
            } else {
                overlays.push(layer);
            }
        }

        let plan = CompositionPlan {
            square,
            base,
            overlays,
            fog,
            fogged: fogged.clone(),
            current,
            highlight: request.highlight,
            overlay_cache: self.overlays.clone(),
        };

        let (png, layers) = tokio::task::spawn_blocking(move || compose(plan))
            .await
            .map_err(|e| RenderError::Internal(format!("composition task failed: {e}")))??;

        Ok(RenderedSquare {
            square,
            png: Bytes::from(png),
            layers,
            fogged,
        })
    }
}

/// Everything the blocking composition step needs.
struct CompositionPlan {
    square: SquareId,
    base: Bytes,
    overlays: Vec<FetchedLayer>,
    fog: Option<Bytes>,
    fogged: Vec<QuadrantId>,
    current: Option<QuadrantId>,
    highlight: bool,
    overlay_cache: Arc<OverlayCache>,
}

/// Decodes, stacks and encodes a square. Runs on the blocking pool.
fn compose(plan: CompositionPlan) -> Result<(Vec<u8>, Vec<String>)> {
    let label = plan.square.to_string();
    let (width, height) = plan.overlay_cache.dimensions();
    enter(&label, RenderStage::Compositing);

    let base = decode(&plan.base)
        .map_err(|e| RenderError::BaseLayerUnavailable(format!("{label}: undecodable base layer: {e}")))?;
    let mut canvas = fit_to_canvas(base, width, height);

    let mut inputs: Vec<CompositeInput> = Vec::new();

    for layer in plan.overlays {
        let Some(bytes) = layer.bytes else {
            debug!(square = %label, layer = %layer.key, "Optional layer absent");
            continue;
        };
        match decode(&bytes) {
            Ok(image) => inputs.push(CompositeInput::full(layer.key, fit_to_canvas(image, width, height))),
            Err(e) => warn!(square = %label, layer = %layer.key, error = %e, "Dropping undecodable layer"),
        }
    }

    if !plan.fogged.is_empty() {
        match plan.fog.as_deref().map(decode) {
            Some(Ok(fog)) => {
                let fog = fit_to_canvas(fog, width, height);
                inputs.extend(extract_fog(&fog, &plan.fogged));
            }
            Some(Err(e)) => warn!(square = %label, error = %e, "Fog layer undecodable, rendering without fog"),
            None => warn!(square = %label, "Fog layer unavailable, rendering without fog"),
        }
    }

    inputs.extend(plan.overlay_cache.placements(plan.current));

    if plan.highlight {
        if let Some(quadrant) = plan.current {
            inputs.extend(border_strips(
                quadrant.rect(width, height),
                HIGHLIGHT_WIDTH,
                HIGHLIGHT_COLOR,
            ));
        }
    }

    flatten(&mut canvas, &inputs);

    enter(&label, RenderStage::Encoding);
    let png = encode_png(&canvas)?;

    let layers = std::iter::once(names::BASE.to_string())
        .chain(inputs.into_iter().map(|input| input.key))
        .collect();
    Ok((png, layers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FetchCache;
    use crate::exploration::{MemoryExplorationStore, SquareRecord};
    use crate::error::FetchError;
    use crate::fetch::{LayerSource, MemoryLayerSource};
    use futures::future::BoxFuture;
    use crate::layers::layer_url;
    use crate::square::QuadrantStatus;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tokio::sync::RwLock;

    const BASE_URL: &str = "https://layers.test";
    const W: u32 = 64;
    const H: u32 = 48;

    fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba(px));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png).unwrap();
        buffer
    }

    struct Fixture {
        source: Arc<MemoryLayerSource>,
        store: Arc<MemoryExplorationStore>,
        renderer: Renderer,
    }

    fn fixture() -> Fixture {
        let source = Arc::new(MemoryLayerSource::new());
        let store = Arc::new(MemoryExplorationStore::new());
        let cache = Arc::new(RwLock::new(FetchCache::new(Duration::from_secs(60), 200)));
        let fetcher = LayerFetcher::new(cache, source.clone(), Duration::from_secs(2));
        let renderer = Renderer::new(
            fetcher,
            Arc::new(OverlayCache::new(W, H)),
            store.clone(),
            BASE_URL,
            Duration::from_secs(1),
        );
        Fixture {
            source,
            store,
            renderer,
        }
    }

    fn seed_all_layers(source: &MemoryLayerSource, square: &str) {
        let square = SquareId::parse(square).unwrap();
        // Base at a different size to exercise resizing
        source.insert(layer_url(BASE_URL, names::BASE, &square), png(32, 24, [40, 120, 40, 255]));
        source.insert(layer_url(BASE_URL, names::FOG, &square), png(W, H, [20, 20, 20, 230]));
        for name in crate::layers::overlay_layer_names(&square) {
            source.insert(layer_url(BASE_URL, name, &square), png(W, H, [255, 0, 0, 40]));
        }
    }

    #[tokio::test]
    async fn test_default_render_fogs_all_quadrants() {
        let fx = fixture();
        seed_all_layers(&fx.source, "H8");

        let rendered = fx.renderer.render(&RenderRequest::new("H8")).await.unwrap();

        assert_eq!(rendered.fogged, QuadrantId::ALL.to_vec());
        assert_eq!(rendered.fog_patch_count(), 4);
        assert_eq!(rendered.layers[0], names::BASE);
        assert!(rendered.layers.contains(&names::BLIGHT.to_string()));
        assert!(rendered.layers.contains(&names::REGION_BORDERS.to_string()));

        let decoded = decode(&rendered.png).unwrap();
        assert_eq!(decoded.dimensions(), (W, H));
    }

    #[tokio::test]
    async fn test_z_order() {
        let fx = fixture();
        seed_all_layers(&fx.source, "H8");
        let request = RenderRequest {
            square: "H8".into(),
            quadrant: Some("Q3".into()),
            no_mask: false,
            highlight: true,
        };

        let rendered = fx.renderer.render(&request).await.unwrap();
        let pos = |key: &str| rendered.layers.iter().position(|k| k == key).unwrap();

        assert!(pos(names::BLIGHT) < pos(names::REGION_BORDERS));
        assert!(pos(names::REGION_BORDERS) < pos(names::PATH_PSL));
        assert!(pos(names::PATH_LDW) < pos("fog-Q1"));
        assert!(pos("fog-Q4") < pos("grid-vertical"));
        assert!(pos("grid-horizontal") < pos("badge-Q1"));
        assert!(pos("badge-Q4") < pos("highlight-top"));
        assert_eq!(rendered.layers.last().unwrap(), "highlight-right");
        assert!(rendered.layers.contains(&"badge-Q3-current".to_string()));
        assert!(!rendered.fogged.contains(&QuadrantId::Q3));
    }

    #[tokio::test]
    async fn test_no_mask_skips_fog_and_fog_fetch() {
        let fx = fixture();
        seed_all_layers(&fx.source, "A1");
        let mut request = RenderRequest::new("A1");
        request.no_mask = true;

        let rendered = fx.renderer.render(&request).await.unwrap();

        assert!(rendered.fogged.is_empty());
        assert_eq!(rendered.fog_patch_count(), 0);
        let fog_url = layer_url(BASE_URL, names::FOG, &SquareId::parse("A1").unwrap());
        assert_eq!(fx.source.fetch_count(&fog_url), 0);
    }

    #[tokio::test]
    async fn test_missing_base_fails() {
        let fx = fixture();
        let result = fx.renderer.render(&RenderRequest::new("B2")).await;
        assert!(matches!(result, Err(RenderError::BaseLayerUnavailable(_))));
    }

    /// Fails the base layer at once; every other layer hangs.
    struct StalledOverlaySource;

    impl LayerSource for StalledOverlaySource {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, std::result::Result<Bytes, FetchError>> {
            Box::pin(async move {
                if url.contains(names::BASE) {
                    return Err(FetchError::Request("connection refused".to_string()));
                }
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Bytes::from_static(b"late"))
            })
        }
    }

    #[tokio::test]
    async fn test_missing_base_abandons_pending_layers() {
        let cache = Arc::new(RwLock::new(FetchCache::new(Duration::from_secs(60), 200)));
        let fetcher = LayerFetcher::new(cache, Arc::new(StalledOverlaySource), Duration::from_secs(5));
        let renderer = Renderer::new(
            fetcher,
            Arc::new(OverlayCache::new(W, H)),
            Arc::new(MemoryExplorationStore::new()),
            BASE_URL,
            Duration::from_secs(1),
        );

        let started = Instant::now();
        let result = renderer.render(&RenderRequest::new("H8")).await;

        assert!(matches!(result, Err(RenderError::BaseLayerUnavailable(_))));
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "render waited {:?} for optional layers",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_undecodable_base_fails() {
        let fx = fixture();
        let square = SquareId::parse("B2").unwrap();
        fx.source.insert(layer_url(BASE_URL, names::BASE, &square), b"garbage".to_vec());

        let result = fx.renderer.render(&RenderRequest::new("B2")).await;
        assert!(matches!(result, Err(RenderError::BaseLayerUnavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_inputs_rejected() {
        let fx = fixture();
        assert!(matches!(
            fx.renderer.render(&RenderRequest::new("Z99")).await,
            Err(RenderError::InvalidSquare(_))
        ));

        let mut request = RenderRequest::new("A1");
        request.quadrant = Some("Q7".into());
        assert!(matches!(
            fx.renderer.render(&request).await,
            Err(RenderError::InvalidQuadrant(_))
        ));
    }

    #[tokio::test]
    async fn test_optional_layers_degrade() {
        let fx = fixture();
        let square = SquareId::parse("H8").unwrap();
        fx.source.insert(layer_url(BASE_URL, names::BASE, &square), png(W, H, [0, 0, 255, 255]));
        // Borders present but corrupt; every other optional layer and the fog missing
        fx.source.insert(layer_url(BASE_URL, names::REGION_BORDERS, &square), b"nope".to_vec());

        let rendered = fx.renderer.render(&RenderRequest::new("H8")).await.unwrap();

        assert_eq!(rendered.fog_patch_count(), 0);
        assert!(!rendered.layers.contains(&names::REGION_BORDERS.to_string()));
        assert!(rendered.layers.contains(&"grid-vertical".to_string()));
    }

    #[tokio::test]
    async fn test_explored_quadrants_not_fogged() {
        let fx = fixture();
        seed_all_layers(&fx.source, "C4");
        let square = SquareId::parse("C4").unwrap();
        fx.store.set_record(
            SquareRecord::new(&square)
                .with_quadrant(QuadrantId::Q1, QuadrantStatus::Explored)
                .with_quadrant(QuadrantId::Q2, QuadrantStatus::Secured),
        );

        let rendered = fx.renderer.render(&RenderRequest::new("c4")).await.unwrap();
        assert_eq!(rendered.fogged, vec![QuadrantId::Q3, QuadrantId::Q4]);
        assert_eq!(rendered.fog_patch_count(), 2);
    }

    #[tokio::test]
    async fn test_base_override_from_store() {
        let fx = fixture();
        let square = SquareId::parse("D5").unwrap();
        fx.source.insert("https://cdn.test/custom-d5.png", png(W, H, [1, 2, 3, 255]));
        fx.store.set_record(SquareRecord::new(&square).with_image("https://cdn.test/custom-d5.png"));

        let rendered = fx.renderer.render(&RenderRequest::new("D5")).await.unwrap();
        assert_eq!(rendered.layers[0], names::BASE);
        assert_eq!(fx.source.fetch_count("https://cdn.test/custom-d5.png"), 1);
        assert_eq!(
            fx.source.fetch_count(&layer_url(BASE_URL, names::BASE, &square)),
            0
        );
    }

    #[tokio::test]
    async fn test_fog_visible_in_output_pixels() {
        let fx = fixture();
        let square = SquareId::parse("A1").unwrap();
        fx.source.insert(layer_url(BASE_URL, names::BASE, &square), png(W, H, [0, 255, 0, 255]));
        fx.source.insert(layer_url(BASE_URL, names::FOG, &square), png(W, H, [0, 0, 0, 255]));
        let mut request = RenderRequest::new("A1");
        request.quadrant = Some("Q4".into());

        let rendered = fx.renderer.render(&request).await.unwrap();
        let out = decode(&rendered.png).unwrap();

        // Centre-ish pixel of Q1 (fogged) vs Q4 (revealed), away from badges and grid
        let q1 = out.get_pixel(W / 4 + 6, H / 2 - 4);
        let q4 = out.get_pixel(W - 3, H - 3);
        assert_eq!(q1.0, [0, 0, 0, 255]);
        assert_eq!(q4.0, [0, 255, 0, 255]);
    }
}
