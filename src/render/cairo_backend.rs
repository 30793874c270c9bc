use std::path::Path;

use cairo::{Context, Format, ImageSurface, Operator};
use pango::FontDescription;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    BlendMode, CanvasHost, Color, DrawingSurface, Primitive, RenderFrame, Renderer, TextHAlign,
    TextVAlign, draw_primitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub texts_drawn: usize,
    pub paths_drawn: usize,
    pub circles_drawn: usize,
}

impl CairoRenderStats {
    fn record(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Line(_) => self.lines_drawn += 1,
            Primitive::Rect(_) => self.rects_drawn += 1,
            Primitive::Text(_) => self.texts_drawn += 1,
            Primitive::Path(_) => self.paths_drawn += 1,
            Primitive::Circle(_) => self.circles_drawn += 1,
        }
    }
}

/// [`DrawingSurface`] over a Cairo context, text laid out with Pango.
pub struct CairoSurface<'a> {
    context: &'a Context,
    fill_color: Color,
    stroke_color: Color,
}

impl<'a> CairoSurface<'a> {
    #[must_use]
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
        }
    }

    fn apply_color(&self, color: Color) {
        self.context
            .set_source_rgba(color.red, color.green, color.blue, color.alpha);
    }
}

impl DrawingSurface for CairoSurface<'_> {
    fn save(&mut self) {
        // Save/restore only fail on an already broken context, which the next
        // paint operation reports.
        let _ = self.context.save();
    }

    fn restore(&mut self) {
        let _ = self.context.restore();
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.context.scale(sx, sy);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.context.translate(dx, dy);
    }

    fn rotate(&mut self, radians: f64) {
        self.context.rotate(radians);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.context.set_line_width(width);
    }

    fn set_line_dash(&mut self, dash: Option<[f64; 2]>) {
        match dash {
            Some(pattern) => self.context.set_dash(&pattern, 0.0),
            None => self.context.set_dash(&[], 0.0),
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.context.set_operator(operator_for(mode));
    }

    fn begin_path(&mut self) {
        self.context.new_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.context.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.context.line_to(x, y);
    }

    fn bezier_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.context.curve_to(x1, y1, x2, y2, x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.context.new_sub_path();
        self.context.arc(cx, cy, radius, start, end);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.rectangle(x, y, width, height);
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn fill(&mut self) -> ChartResult<()> {
        self.apply_color(self.fill_color);
        self.context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill path", err))
    }

    fn stroke(&mut self) -> ChartResult<()> {
        self.apply_color(self.stroke_color);
        self.context
            .stroke_preserve()
            .map_err(|err| map_backend_error("failed to stroke path", err))
    }

    fn clear(&mut self, width: f64, height: f64) -> ChartResult<()> {
        self.context.save().map_err(|err| map_backend_error("failed to save state", err))?;
        self.context.set_operator(Operator::Clear);
        self.context.rectangle(0.0, 0.0, width, height);
        let cleared = self
            .context
            .fill()
            .map_err(|err| map_backend_error("failed to clear surface", err));
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to restore state", err))?;
        cleared
    }

    fn fill_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font_size_px: f64,
        h_align: TextHAlign,
        v_align: TextVAlign,
    ) -> ChartResult<()> {
        let layout = pangocairo::functions::create_layout(self.context);
        let font_description = FontDescription::from_string(&format!("Sans {font_size_px}"));
        layout.set_font_description(Some(&font_description));
        layout.set_text(text);

        let (text_width, text_height) = layout.pixel_size();
        let left = match h_align {
            TextHAlign::Left => x,
            TextHAlign::Center => x - f64::from(text_width) / 2.0,
            TextHAlign::Right => x - f64::from(text_width),
        };
        let top = match v_align {
            TextVAlign::Top => y,
            TextVAlign::Middle => y - f64::from(text_height) / 2.0,
            TextVAlign::Alphabetic => y - f64::from(layout.baseline()) / f64::from(pango::SCALE),
        };

        self.context.new_path();
        self.apply_color(self.fill_color);
        self.context.move_to(left, top);
        pangocairo::functions::show_layout(self.context, &layout);
        self.context.new_path();
        Ok(())
    }
}

fn operator_for(mode: BlendMode) -> Operator {
    match mode {
        BlendMode::Normal => Operator::Over,
        BlendMode::Multiply => Operator::Multiply,
        BlendMode::Screen => Operator::Screen,
        BlendMode::Overlay => Operator::Overlay,
        BlendMode::Darken => Operator::Darken,
        BlendMode::Lighten => Operator::Lighten,
        BlendMode::ColorDodge => Operator::ColorDodge,
        BlendMode::ColorBurn => Operator::ColorBurn,
        BlendMode::HardLight => Operator::HardLight,
        BlendMode::SoftLight => Operator::SoftLight,
        BlendMode::Difference => Operator::Difference,
        BlendMode::Exclusion => Operator::Exclusion,
        BlendMode::Hue => Operator::HslHue,
        BlendMode::Saturation => Operator::HslSaturation,
        BlendMode::Color => Operator::HslColor,
        BlendMode::Luminosity => Operator::HslLuminosity,
    }
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(&mut self, context: &Context, frame: &RenderFrame)
    -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo renderer for vector-mode frames.
///
/// Supports offscreen image-surface rendering through `Renderer::render` and
/// in-place rendering on an external context through `CairoContextRenderer`.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        Ok(Self {
            surface: create_image_surface(width, height)?,
            clear_color: Color::WHITE,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> ChartResult<()> {
        write_surface_png(&self.surface, path.as_ref())
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        context.set_source_rgba(
            self.clear_color.red,
            self.clear_color.green,
            self.clear_color.blue,
            self.clear_color.alpha,
        );
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut surface = CairoSurface::new(context);
        let mut stats = CairoRenderStats::default();
        for primitive in &frame.primitives {
            draw_primitive(&mut surface, primitive)?;
            stats.record(primitive);
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let (width, height) = (self.surface.width(), self.surface.height());
        let (frame_width, frame_height) = (
            i32::try_from(frame.dimensions.width).unwrap_or(i32::MAX),
            i32::try_from(frame.dimensions.height).unwrap_or(i32::MAX),
        );
        if (width, height) != (frame_width, frame_height) {
            self.surface = create_image_surface(frame_width, frame_height)?;
        }
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

/// Canvas host backed by a Cairo image surface.
///
/// The handle is the image surface itself; Cairo surfaces are reference
/// counted, so a handle obtained through a `CanvasRef` stays valid after the
/// next resize replaces the backing store.
#[derive(Debug)]
pub struct CairoCanvas {
    surface: ImageSurface,
}

impl CairoCanvas {
    pub fn new() -> ChartResult<Self> {
        Ok(Self {
            surface: create_image_surface(1, 1)?,
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> ChartResult<()> {
        write_surface_png(&self.surface, path.as_ref())
    }
}

impl CanvasHost for CairoCanvas {
    type Handle = ImageSurface;

    fn draw(
        &mut self,
        width: u32,
        height: u32,
        paint: &mut dyn FnMut(&mut dyn DrawingSurface) -> ChartResult<()>,
    ) -> ChartResult<()> {
        let width = i32::try_from(width).map_err(|_| ChartError::InvalidDimensions {
            width,
            height,
        })?;
        let height = i32::try_from(height).map_err(|_| ChartError::InvalidDimensions {
            width: width.unsigned_abs(),
            height,
        })?;
        if self.surface.width() != width || self.surface.height() != height {
            self.surface = create_image_surface(width, height)?;
        }
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        let mut surface = CairoSurface::new(&context);
        paint(&mut surface)
    }

    fn handle(&self) -> Self::Handle {
        self.surface.clone()
    }
}

fn create_image_surface(width: i32, height: i32) -> ChartResult<ImageSurface> {
    if width <= 0 || height <= 0 {
        return Err(ChartError::InvalidDimensions {
            width: width.max(0).unsigned_abs(),
            height: height.max(0).unsigned_abs(),
        });
    }
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn write_surface_png(surface: &ImageSurface, path: &Path) -> ChartResult<()> {
    let mut file = std::fs::File::create(path)
        .map_err(|err| ChartError::Backend(format!("failed to create {}: {err}", path.display())))?;
    surface
        .write_to_png(&mut file)
        .map_err(|err| ChartError::Backend(format!("failed to encode png: {err}")))
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
