use tracing::{debug, trace, warn};

use crate::core::{Dimensions, Serie};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{InteractionState, PointerEvent};
use crate::render::{CanvasHost, CanvasRef, DrawingSurface, replay};

use super::builtin_layers::{LayerContext, build_layer};
use super::pointer::{PointerContext, PointerController};
use super::{
    ConfigDiagnostic, CustomLayerProps, Layer, LineCanvasConfig, LineScene, Tooltip,
    log_diagnostics, validate_data,
};

/// Canvas line chart: paints every layer in list order on a surface obtained
/// from its [`CanvasHost`].
///
/// The backing store is `dimensions * pixel_ratio` device pixels; drawing
/// happens in CSS pixels through a scale transform.
pub struct LineCanvas<H: CanvasHost> {
    host: H,
    canvas_ref: Option<CanvasRef<H::Handle>>,
    dimensions: Dimensions,
    data: Vec<Serie>,
    config: LineCanvasConfig,
    diagnostics: Vec<ConfigDiagnostic>,
    scene: Option<LineScene>,
    pointer: PointerController,
}

impl<H: CanvasHost> LineCanvas<H> {
    #[must_use]
    pub fn new(host: H, config: LineCanvasConfig) -> Self {
        let mut chart = Self {
            host,
            canvas_ref: None,
            dimensions: Dimensions::new(0, 0),
            data: Vec::new(),
            config: LineCanvasConfig::default(),
            diagnostics: Vec::new(),
            scene: None,
            pointer: PointerController::default(),
        };
        chart.set_config(config);
        chart
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> ChartResult<Self> {
        self.set_dimensions(dimensions)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<Serie>) -> Self {
        self.set_data(data);
        self
    }

    /// Slot that receives the host handle after each paint.
    #[must_use]
    pub fn with_canvas_ref(mut self, canvas_ref: CanvasRef<H::Handle>) -> Self {
        self.set_canvas_ref(Some(canvas_ref));
        self
    }

    /// Installs `canvas_ref`; a different previous ref is cleared, the same
    /// ref keeps its handle.
    pub fn set_canvas_ref(&mut self, canvas_ref: Option<CanvasRef<H::Handle>>) {
        if let Some(previous) = self.canvas_ref.take() {
            let same = canvas_ref
                .as_ref()
                .is_some_and(|next| next.same_slot(&previous));
            if !same {
                previous.clear();
            }
        }
        self.canvas_ref = canvas_ref;
    }

    pub fn set_dimensions(&mut self, dimensions: Dimensions) -> ChartResult<()> {
        if !dimensions.is_valid() {
            return Err(ChartError::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
            });
        }
        if dimensions != self.dimensions {
            self.dimensions = dimensions;
            self.invalidate();
        }
        Ok(())
    }

    pub fn set_data(&mut self, data: Vec<Serie>) {
        self.data = data;
        self.invalidate();
    }

    pub fn set_config(&mut self, mut config: LineCanvasConfig) {
        self.diagnostics = config.check_ranges();
        self.config = config;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.scene = None;
        self.pointer.reset();
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub fn data(&self) -> &[Serie] {
        &self.data
    }

    #[must_use]
    pub fn config(&self) -> &LineCanvasConfig {
        &self.config
    }

    #[must_use]
    pub fn diagnostics(&self) -> Vec<ConfigDiagnostic> {
        let mut diagnostics = self.diagnostics.clone();
        diagnostics.extend(validate_data(&self.data));
        diagnostics
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionState {
        self.pointer.state()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Size of the backing store in device pixels.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        let ratio = self.config.pixel_ratio;
        let scale = |length: u32| (f64::from(length) * ratio).round().max(0.0) as u32;
        (scale(self.dimensions.width), scale(self.dimensions.height))
    }

    pub fn scene(&mut self) -> ChartResult<&LineScene> {
        if self.scene.is_none() {
            if !self.dimensions.is_valid() {
                return Err(ChartError::InvalidDimensions {
                    width: self.dimensions.width,
                    height: self.dimensions.height,
                });
            }
            let scene = LineScene::compute(&self.data, &self.config.common, self.dimensions)?;
            self.scene = Some(scene);
        }
        self.scene
            .as_ref()
            .ok_or_else(|| ChartError::InvalidData("scene is unavailable".to_owned()))
    }

    fn uses_mesh(&self) -> bool {
        let common = &self.config.common;
        common.is_interactive && common.enable_slices.axis().is_none()
    }

    pub fn render(&mut self) -> ChartResult<()> {
        log_diagnostics(&self.diagnostics());
        let mesh = self.uses_mesh();
        let (width_px, height_px) = self.pixel_size();
        self.scene()?;
        let Some(scene) = self.scene.as_ref() else {
            return Err(ChartError::InvalidData("scene is unavailable".to_owned()));
        };
        let config = &self.config;
        let current_point = self.pointer.current_point(scene);
        let current_slice = self.pointer.current_slice(scene);
        let ctx = LayerContext {
            scene,
            props: &config.common,
            current_point,
            current_slice,
            mesh,
            defs: &[],
            fill: &[],
        };
        let dimensions = self.dimensions;
        debug!(width_px, height_px, ratio = config.pixel_ratio, "painting line canvas");

        self.host.draw(width_px, height_px, &mut |surface| {
            surface.save();
            surface.scale(config.pixel_ratio, config.pixel_ratio);
            let painted = paint_layers(surface, &ctx, config, dimensions);
            surface.restore();
            painted
        })?;

        if let Some(canvas_ref) = &self.canvas_ref {
            canvas_ref.set(self.host.handle());
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        event: PointerEvent,
        handle: impl FnOnce(&mut PointerController, &PointerContext<'_>, PointerEvent) -> bool,
    ) -> ChartResult<bool> {
        let mesh = self.uses_mesh();
        self.scene()?;
        let Some(scene) = self.scene.as_ref() else {
            return Ok(false);
        };
        let ctx = PointerContext {
            scene,
            props: &self.config.common,
            mesh,
            touch_crosshair: true,
        };
        let changed = handle(&mut self.pointer, &ctx, event);
        if changed {
            self.render()?;
        }
        Ok(changed)
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> ChartResult<bool> {
        self.dispatch(event, PointerController::pointer_move)
    }

    pub fn pointer_leave(&mut self, event: PointerEvent) -> ChartResult<bool> {
        self.dispatch(event, PointerController::pointer_leave)
    }

    pub fn click(&mut self, event: PointerEvent) -> ChartResult<bool> {
        self.dispatch(event, PointerController::click)
    }

    pub fn touch_start(&mut self, event: PointerEvent) -> ChartResult<bool> {
        self.dispatch(event, PointerController::touch_start)
    }

    pub fn touch_move(&mut self, event: PointerEvent) -> ChartResult<bool> {
        self.dispatch(event, PointerController::touch_move)
    }

    pub fn touch_end(&mut self, event: PointerEvent) -> ChartResult<bool> {
        self.dispatch(event, PointerController::touch_end)
    }

    #[must_use]
    pub fn tooltip(&self) -> Option<Tooltip> {
        let scene = self.scene.as_ref()?;
        self.pointer.tooltip(&PointerContext {
            scene,
            props: &self.config.common,
            mesh: self.uses_mesh(),
            touch_crosshair: true,
        })
    }
}

impl<H: CanvasHost> Drop for LineCanvas<H> {
    fn drop(&mut self) {
        if let Some(canvas_ref) = self.canvas_ref.take() {
            canvas_ref.clear();
        }
    }
}

fn paint_layers(
    surface: &mut dyn DrawingSurface,
    ctx: &LayerContext<'_>,
    config: &LineCanvasConfig,
    dimensions: Dimensions,
) -> ChartResult<()> {
    let common = &config.common;
    let (width, height) = (f64::from(dimensions.width), f64::from(dimensions.height));
    surface.clear(width, height)?;
    if common.theme.background.alpha > 0.0 {
        surface.begin_path();
        surface.rect(0.0, 0.0, width, height);
        surface.set_fill_color(common.theme.background);
        surface.fill()?;
    }
    if !ctx.scene.inner.is_drawable() {
        warn!(
            width = ctx.scene.inner.width,
            height = ctx.scene.inner.height,
            "inner area is empty, nothing to draw"
        );
        return Ok(());
    }

    surface.translate(common.margin.left, common.margin.top);
    for layer in &config.canvas.layers {
        match layer {
            Layer::Builtin(kind) => {
                trace!(layer = %kind, "painting built-in layer");
                replay(surface, &build_layer(*kind, ctx).primitives)?;
            }
            Layer::Custom(draw) => {
                let props = CustomLayerProps::new(
                    ctx.scene,
                    common,
                    ctx.current_point,
                    ctx.current_slice,
                );
                surface.save();
                let drawn = draw(&props, surface);
                surface.restore();
                if let Err(err) = drawn {
                    warn!(error = %err, "custom canvas layer failed");
                }
            }
        }
    }
    Ok(())
}
