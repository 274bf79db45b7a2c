//! Render Module
//!
//! Turns a square request into one PNG: fog selection, layer compositing and
//! encoding.

mod compositor;
pub mod fog;
mod pipeline;


pub use compositor::{decode, encode_png, fit_to_canvas, flatten, CompositeInput};
pub use pipeline::{RenderRequest, RenderStage, RenderedSquare, Renderer};
