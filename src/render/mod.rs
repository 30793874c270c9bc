mod canvas;
mod frame;
mod layer_stack;
mod layered_frame;
mod null_renderer;
mod primitives;

pub use canvas::{
    CanvasHost, CanvasRef, DrawingSurface, RecordingCanvas, RecordingSurface, SurfaceCommand,
    draw_primitive, replay, trace_path,
};
pub use frame::RenderFrame;
pub use layer_stack::{LayerSlot, LayerStack, LineLayerType};
pub use layered_frame::{LayerFrame, LayerPrimitives, LayeredRenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    BlendMode, CirclePrimitive, Color, LinePrimitive, PathPrimitive, Primitive, RectPrimitive,
    Stroke, TextHAlign, TextPrimitive, TextVAlign,
};

use crate::error::ChartResult;

/// Contract implemented by any vector-mode rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from chart domain and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{
    CairoCanvas, CairoContextRenderer, CairoRenderStats, CairoRenderer, CairoSurface,
};
