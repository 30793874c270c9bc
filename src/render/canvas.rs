//! Immediate-mode drawing surface used by the canvas chart.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::fmt;
use std::rc::Rc;

use crate::core::PathCommand;
use crate::error::ChartResult;

use super::{
    BlendMode, CirclePrimitive, Color, LinePrimitive, PathPrimitive, Primitive, RectPrimitive,
    Stroke, TextHAlign, TextPrimitive, TextVAlign,
};

/// Subset of a 2D canvas context the chart draws with.
///
/// Path construction is infallible; painting operations report backend
/// failures.
pub trait DrawingSurface {
    fn save(&mut self);
    fn restore(&mut self);
    fn scale(&mut self, sx: f64, sy: f64);
    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, radians: f64);

    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, dash: Option<[f64; 2]>);
    fn set_blend_mode(&mut self, mode: BlendMode);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn bezier_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64);
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn close_path(&mut self);

    fn fill(&mut self) -> ChartResult<()>;
    fn stroke(&mut self) -> ChartResult<()>;
    fn clear(&mut self, width: f64, height: f64) -> ChartResult<()>;
    fn fill_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font_size_px: f64,
        h_align: TextHAlign,
        v_align: TextVAlign,
    ) -> ChartResult<()>;
}

/// Appends path commands to the current path.
pub fn trace_path(surface: &mut dyn DrawingSurface, commands: &[PathCommand]) {
    for command in commands {
        match *command {
            PathCommand::MoveTo { x, y } => surface.move_to(x, y),
            PathCommand::LineTo { x, y } => surface.line_to(x, y),
            PathCommand::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => surface.bezier_curve_to(x1, y1, x2, y2, x, y),
            PathCommand::ClosePath => surface.close_path(),
        }
    }
}

fn stroke_with(surface: &mut dyn DrawingSurface, stroke: Stroke) -> ChartResult<()> {
    if stroke.width <= 0.0 {
        return Ok(());
    }
    surface.set_stroke_color(stroke.color);
    surface.set_line_width(stroke.width);
    surface.stroke()
}

/// Draws one primitive with the surface's current transform.
pub fn draw_primitive(surface: &mut dyn DrawingSurface, primitive: &Primitive) -> ChartResult<()> {
    match primitive {
        Primitive::Line(line) => draw_line(surface, line),
        Primitive::Rect(rect) => draw_rect(surface, rect),
        Primitive::Text(text) => draw_text(surface, text),
        Primitive::Path(path) => draw_path(surface, path),
        Primitive::Circle(circle) => draw_circle(surface, circle),
    }
}

/// Draws primitives in order.
pub fn replay(surface: &mut dyn DrawingSurface, primitives: &[Primitive]) -> ChartResult<()> {
    for primitive in primitives {
        draw_primitive(surface, primitive)?;
    }
    Ok(())
}

fn draw_line(surface: &mut dyn DrawingSurface, line: &LinePrimitive) -> ChartResult<()> {
    surface.begin_path();
    surface.set_line_dash(line.dash);
    surface.move_to(line.x1, line.y1);
    surface.line_to(line.x2, line.y2);
    stroke_with(surface, Stroke::new(line.color, line.stroke_width))?;
    surface.set_line_dash(None);
    Ok(())
}

fn draw_rect(surface: &mut dyn DrawingSurface, rect: &RectPrimitive) -> ChartResult<()> {
    surface.begin_path();
    surface.rect(rect.x, rect.y, rect.width, rect.height);
    if let Some(fill) = rect.fill {
        surface.set_fill_color(fill);
        surface.fill()?;
    }
    if let Some(border) = rect.border {
        stroke_with(surface, border)?;
    }
    Ok(())
}

fn draw_text(surface: &mut dyn DrawingSurface, text: &TextPrimitive) -> ChartResult<()> {
    if text.text.is_empty() {
        return Ok(());
    }
    surface.set_fill_color(text.color);
    if text.rotation_deg == 0.0 {
        return surface.fill_text(
            &text.text,
            text.x,
            text.y,
            text.font_size_px,
            text.h_align,
            text.v_align,
        );
    }
    surface.save();
    surface.translate(text.x, text.y);
    surface.rotate(text.rotation_deg.to_radians());
    let drawn = surface.fill_text(
        &text.text,
        0.0,
        0.0,
        text.font_size_px,
        text.h_align,
        text.v_align,
    );
    surface.restore();
    drawn
}

fn draw_path(surface: &mut dyn DrawingSurface, path: &PathPrimitive) -> ChartResult<()> {
    if path.commands.is_empty() {
        return Ok(());
    }
    let blended = path.blend_mode != BlendMode::Normal;
    if blended {
        surface.save();
        surface.set_blend_mode(path.blend_mode);
    }
    surface.begin_path();
    trace_path(surface, &path.commands);
    let mut painted = Ok(());
    if let Some(fill) = path.fill {
        surface.set_fill_color(fill);
        painted = surface.fill();
    }
    if painted.is_ok() {
        if let Some(stroke) = path.stroke {
            painted = stroke_with(surface, stroke);
        }
    }
    if blended {
        surface.restore();
    }
    painted
}

fn draw_circle(surface: &mut dyn DrawingSurface, circle: &CirclePrimitive) -> ChartResult<()> {
    surface.begin_path();
    surface.arc(circle.cx, circle.cy, circle.radius, 0.0, TAU);
    surface.set_fill_color(circle.fill);
    surface.fill()?;
    if let Some(border) = circle.border {
        stroke_with(surface, border)?;
    }
    Ok(())
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Save,
    Restore,
    Scale(f64, f64),
    Translate(f64, f64),
    Rotate(f64),
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(f64),
    SetLineDash(Option<[f64; 2]>),
    SetBlendMode(BlendMode),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    BezierCurveTo(f64, f64, f64, f64, f64, f64),
    Arc {
        cx: f64,
        cy: f64,
        radius: f64,
    },
    Rect(f64, f64, f64, f64),
    ClosePath,
    Fill,
    Stroke,
    Clear(f64, f64),
    FillText {
        text: String,
        x: f64,
        y: f64,
        font_size_px: f64,
    },
    /// Marker written by callers to delimit sections of a recording.
    Mark(String),
}

/// Surface that records every call, for headless hosts and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn mark(&mut self, label: impl Into<String>) {
        self.commands.push(SurfaceCommand::Mark(label.into()));
    }

    /// Labels of every recorded `Mark`, in order.
    #[must_use]
    pub fn marks(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                SurfaceCommand::Mark(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                SurfaceCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn save(&mut self) {
        self.commands.push(SurfaceCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(SurfaceCommand::Restore);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.commands.push(SurfaceCommand::Scale(sx, sy));
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.commands.push(SurfaceCommand::Translate(dx, dy));
    }

    fn rotate(&mut self, radians: f64) {
        self.commands.push(SurfaceCommand::Rotate(radians));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(SurfaceCommand::SetFillColor(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(SurfaceCommand::SetStrokeColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(SurfaceCommand::SetLineWidth(width));
    }

    fn set_line_dash(&mut self, dash: Option<[f64; 2]>) {
        self.commands.push(SurfaceCommand::SetLineDash(dash));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.commands.push(SurfaceCommand::SetBlendMode(mode));
    }

    fn begin_path(&mut self) {
        self.commands.push(SurfaceCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(SurfaceCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(SurfaceCommand::LineTo(x, y));
    }

    fn bezier_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.commands
            .push(SurfaceCommand::BezierCurveTo(x1, y1, x2, y2, x, y));
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, _start: f64, _end: f64) {
        self.commands.push(SurfaceCommand::Arc { cx, cy, radius });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(SurfaceCommand::Rect(x, y, width, height));
    }

    fn close_path(&mut self) {
        self.commands.push(SurfaceCommand::ClosePath);
    }

    fn fill(&mut self) -> ChartResult<()> {
        self.commands.push(SurfaceCommand::Fill);
        Ok(())
    }

    fn stroke(&mut self) -> ChartResult<()> {
        self.commands.push(SurfaceCommand::Stroke);
        Ok(())
    }

    fn clear(&mut self, width: f64, height: f64) -> ChartResult<()> {
        self.commands.push(SurfaceCommand::Clear(width, height));
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font_size_px: f64,
        _h_align: TextHAlign,
        _v_align: TextVAlign,
    ) -> ChartResult<()> {
        self.commands.push(SurfaceCommand::FillText {
            text: text.to_owned(),
            x,
            y,
            font_size_px,
        });
        Ok(())
    }
}

/// Host owning the backing store of a canvas chart.
pub trait CanvasHost {
    /// Handle given out through a [`CanvasRef`], e.g. for image export.
    type Handle: Clone;

    /// Resizes the backing store to `width` x `height` device pixels and runs
    /// `paint` against a fresh surface.
    fn draw(
        &mut self,
        width: u32,
        height: u32,
        paint: &mut dyn FnMut(&mut dyn DrawingSurface) -> ChartResult<()>,
    ) -> ChartResult<()>;

    fn handle(&self) -> Self::Handle;
}

/// Shared slot through which a caller obtains the host's canvas handle.
///
/// Cloning a `CanvasRef` shares the slot, so the caller keeps one clone and
/// passes another down to the chart.
pub struct CanvasRef<H>(Rc<RefCell<Option<H>>>);

impl<H> CanvasRef<H> {
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    pub fn set(&self, handle: H) {
        *self.0.borrow_mut() = Some(handle);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    /// Whether both refs share the same slot.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<H: Clone> CanvasRef<H> {
    #[must_use]
    pub fn get(&self) -> Option<H> {
        self.0.borrow().clone()
    }
}

impl<H> Clone for CanvasRef<H> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<H> Default for CanvasRef<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for CanvasRef<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasRef")
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// Headless canvas host keeping the last pass as a recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    surface: Rc<RefCell<RecordingSurface>>,
    draw_count: usize,
}

impl RecordingCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    /// Copy of the last recorded pass.
    #[must_use]
    pub fn recording(&self) -> RecordingSurface {
        self.surface.borrow().clone()
    }
}

impl CanvasHost for RecordingCanvas {
    type Handle = Rc<RefCell<RecordingSurface>>;

    fn draw(
        &mut self,
        width: u32,
        height: u32,
        paint: &mut dyn FnMut(&mut dyn DrawingSurface) -> ChartResult<()>,
    ) -> ChartResult<()> {
        let mut surface = RecordingSurface::new(width, height);
        let painted = paint(&mut surface);
        *self.surface.borrow_mut() = surface;
        self.draw_count += 1;
        painted
    }

    fn handle(&self) -> Self::Handle {
        Rc::clone(&self.surface)
    }
}
