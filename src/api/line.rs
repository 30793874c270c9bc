use tracing::{debug, warn};

use crate::core::{Dimensions, Serie};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{InteractionState, PointerEvent};
use crate::render::{LayeredRenderFrame, Renderer};

use super::builtin_layers::{LayerContext, build_layer};
use super::pointer::{PointerContext, PointerController};
use super::{
    ConfigDiagnostic, CustomLayerProps, Layer, LineScene, LineSvgConfig, SpringConfig, Tooltip,
    layer_stack, log_diagnostics, validate_data,
};

/// Vector line chart: lays out the configured layers into a
/// [`LayeredRenderFrame`] and hands the flattened frame to a [`Renderer`].
pub struct Line<R: Renderer> {
    renderer: R,
    dimensions: Dimensions,
    data: Vec<Serie>,
    config: LineSvgConfig,
    diagnostics: Vec<ConfigDiagnostic>,
    scene: Option<LineScene>,
    pointer: PointerController,
}

impl<R: Renderer> Line<R> {
    /// Creates a chart without data; dimensions must be set before the
    /// first render.
    #[must_use]
    pub fn new(renderer: R, config: LineSvgConfig) -> Self {
        let mut line = Self {
            renderer,
            dimensions: Dimensions::new(0, 0),
            data: Vec::new(),
            config: LineSvgConfig::default(),
            diagnostics: Vec::new(),
            scene: None,
            pointer: PointerController::default(),
        };
        line.set_config(config);
        line
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

    /// Replaces the configuration; out-of-range values are reset and
    /// reported through [`Self::diagnostics`].
    pub fn set_config(&mut self, mut config: LineSvgConfig) {
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
    pub fn config(&self) -> &LineSvgConfig {
        &self.config
    }

    /// Configuration and data problems found so far.
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

    /// Spring used for transitions, `None` when animation is off.
    #[must_use]
    pub fn motion(&self) -> Option<SpringConfig> {
        self.config
            .svg
            .animate
            .then(|| self.config.svg.motion_config.spring())
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Scene of the current data, configuration and dimensions.
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
        common.is_interactive && self.config.svg.use_mesh && common.enable_slices.axis().is_none()
    }

    /// Builds every layer in list order.
    ///
    /// A non-positive inner area yields layers without content.
    pub fn build_frame(&mut self) -> ChartResult<LayeredRenderFrame> {
        let mesh = self.uses_mesh();
        self.scene()?;
        let Some(scene) = self.scene.as_ref() else {
            return Err(ChartError::InvalidData("scene is unavailable".to_owned()));
        };
        let config = &self.config;
        let common = &config.common;
        let mut frame = LayeredRenderFrame::from_stack(
            self.dimensions,
            common.margin,
            &layer_stack(&config.svg.layers),
        );
        if !scene.inner.is_drawable() {
            warn!(
                width = scene.inner.width,
                height = scene.inner.height,
                "inner area is empty, nothing to draw"
            );
            return Ok(frame);
        }

        let current_point = self.pointer.current_point(scene);
        let current_slice = self.pointer.current_slice(scene);
        let ctx = LayerContext {
            scene,
            props: common,
            current_point,
            current_slice,
            mesh,
            defs: &config.svg.defs,
            fill: &config.svg.fill,
        };
        for (index, layer) in config.svg.layers.iter().enumerate() {
            let content = match layer {
                Layer::Builtin(kind) => build_layer(*kind, &ctx),
                Layer::Custom(draw) => {
                    let props = CustomLayerProps::new(scene, common, current_point, current_slice);
                    draw(&props)
                }
            };
            frame.set_layer_at(index, content);
        }
        Ok(frame)
    }

    pub fn render(&mut self) -> ChartResult<()> {
        log_diagnostics(&self.diagnostics());
        let frame = self.build_frame()?.flatten();
        debug!(primitives = frame.primitives.len(), "rendering line chart");
        self.renderer.render(&frame)
    }

    /// Renders into an external cairo context, e.g. from a GTK draw callback.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> ChartResult<()>
    where
        R: crate::render::CairoContextRenderer,
    {
        log_diagnostics(&self.diagnostics());
        let frame = self.build_frame()?.flatten();
        debug!(primitives = frame.primitives.len(), "rendering line chart on cairo context");
        self.renderer.render_on_cairo_context(context, &frame)
    }

    fn dispatch(
        &mut self,
        event: PointerEvent,
        handle: impl FnOnce(&mut PointerController, &PointerContext<'_>, PointerEvent) -> bool,
    ) -> ChartResult<bool> {
        let mesh = self.uses_mesh();
        let touch_crosshair = self.config.svg.enable_touch_crosshair;
        self.scene()?;
        let Some(scene) = self.scene.as_ref() else {
            return Ok(false);
        };
        let ctx = PointerContext {
            scene,
            props: &self.config.common,
            mesh,
            touch_crosshair,
        };
        let changed = handle(&mut self.pointer, &ctx, event);
        if changed {
            self.render()?;
        }
        Ok(changed)
    }

    /// Moves the pointer; re-renders and returns `true` when the active
    /// point or slice changed.
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

    /// Tooltip of the active point or slice.
    #[must_use]
    pub fn tooltip(&self) -> Option<Tooltip> {
        let scene = self.scene.as_ref()?;
        self.pointer.tooltip(&PointerContext {
            scene,
            props: &self.config.common,
            mesh: self.uses_mesh(),
            touch_crosshair: self.config.svg.enable_touch_crosshair,
        })
    }
}
