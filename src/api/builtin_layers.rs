//! Primitives of the built-in layers, in inner-area coordinates.

use tracing::trace;

use crate::core::{Axis, PathCommand};
use crate::extensions::{MarkerTheme, build_markers};
use crate::interaction::voronoi_cell;
use crate::render::{
    CirclePrimitive, Color, LayerPrimitives, LineLayerType, PathPrimitive, RectPrimitive, Stroke,
    TextHAlign,
};

use super::axes::build_axis;
use super::legends::build_legend;
use super::{
    AxisPosition, LineCommonProps, LineScene, Point, PointSymbolProps, Slice, SvgDef, SvgFillRule,
    fill_for, legend_data,
};

const DEBUG_STROKE: Color = Color::rgba(1.0, 0.0, 0.0, 0.75);
const DEBUG_HIGHLIGHT: Color = Color::rgba(1.0, 0.0, 0.0, 0.35);

/// Everything a built-in layer reads during one pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayerContext<'a> {
    pub scene: &'a LineScene,
    pub props: &'a LineCommonProps,
    pub current_point: Option<&'a Point>,
    pub current_slice: Option<&'a Slice>,
    /// Whether the Voronoi mesh handles hover.
    pub mesh: bool,
    pub defs: &'a [SvgDef],
    pub fill: &'a [SvgFillRule],
}

pub(crate) fn build_layer(kind: LineLayerType, ctx: &LayerContext<'_>) -> LayerPrimitives {
    let mut out = LayerPrimitives::new();
    match kind {
        LineLayerType::Grid => grid(&mut out, ctx),
        LineLayerType::Markers => markers(&mut out, ctx),
        LineLayerType::Axes => axes(&mut out, ctx),
        LineLayerType::Areas => areas(&mut out, ctx),
        LineLayerType::Crosshair => crosshair(&mut out, ctx),
        LineLayerType::Lines => lines(&mut out, ctx),
        LineLayerType::Points => points(&mut out, ctx),
        LineLayerType::Slices => slices(&mut out, ctx),
        LineLayerType::Mesh => mesh(&mut out, ctx),
        LineLayerType::Legends => legends(&mut out, ctx),
    }
    trace!(layer = %kind, primitives = out.len(), "built layer");
    out
}

fn grid(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    let style = props.theme.grid.line;
    if !style.is_visible() {
        return;
    }
    let (width, height) = (scene.inner.width, scene.inner.height);
    if props.enable_grid_x {
        for value in scene.x_scale.tick_values(props.grid_x_values.as_ref()) {
            if let Some(x) = scene.x_scale.map(&value) {
                out.push(style.line(x, 0.0, x, height));
            }
        }
    }
    if props.enable_grid_y {
        for value in scene.y_scale.tick_values(props.grid_y_values.as_ref()) {
            if let Some(y) = scene.y_scale.map(&value) {
                out.push(style.line(0.0, y, width, y));
            }
        }
    }
}

fn markers(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    let theme = props.theme.markers;
    build_markers(
        out,
        &props.markers,
        &scene.x_scale,
        &scene.y_scale,
        scene.inner,
        MarkerTheme {
            line_color: theme.line_color,
            line_width: theme.line_stroke_width,
            font_size: theme.text.font_size,
            text_color: theme.text.fill,
        },
    );
}

fn axes(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    let axes = [
        (AxisPosition::Top, props.axis_top.as_ref(), &scene.x_scale),
        (AxisPosition::Right, props.axis_right.as_ref(), &scene.y_scale),
        (AxisPosition::Bottom, props.axis_bottom.as_ref(), &scene.x_scale),
        (AxisPosition::Left, props.axis_left.as_ref(), &scene.y_scale),
    ];
    for (position, axis, scale) in axes {
        if let Some(axis) = axis {
            build_axis(out, position, axis, scale, scene.inner, &props.theme);
        }
    }
}

fn areas(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    if !props.enable_area {
        return;
    }
    for serie in scene.series.iter().rev() {
        let commands = scene
            .line_generator
            .generate_area(&serie.positions(), scene.area_baseline);
        let base = fill_for(ctx.defs, ctx.fill, &serie.id)
            .and_then(SvgDef::representative_color)
            .unwrap_or(serie.color);
        let color = base.with_alpha(base.alpha * props.area_opacity);
        out.push(PathPrimitive::filled(commands, color).with_blend_mode(props.area_blend_mode));
    }
}

fn lines(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    for serie in scene.series.iter().rev() {
        let commands = scene.line_generator.generate(&serie.positions());
        if commands.is_empty() {
            continue;
        }
        out.push(PathPrimitive::stroked(
            commands,
            Stroke::new(serie.color, props.line_width),
        ));
    }
}

fn points(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    if !props.enable_points {
        return;
    }
    for point in &scene.points {
        match &props.point_symbol {
            Some(symbol) => {
                let symbol_props = PointSymbolProps {
                    point,
                    size: props.point_size,
                    color: point.color,
                    border_width: props.point_border_width,
                    border_color: point.border_color,
                };
                for primitive in symbol(&symbol_props) {
                    out.push(primitive.translated(point.x, point.y));
                }
            }
            None => {
                let circle = CirclePrimitive::new(point.x, point.y, props.point_size / 2.0, point.color);
                out.push(if props.point_border_width > 0.0 {
                    circle.with_border(Stroke::new(point.border_color, props.point_border_width))
                } else {
                    circle
                });
            }
        }
    }

    if props.enable_point_label {
        let style = props.theme.dots.text;
        for point in &scene.points {
            out.push(style.text(
                props.point_label.text(point),
                point.x,
                point.y + props.point_label_y_offset,
                TextHAlign::Center,
            ));
        }
    }
}

fn slices(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    if props.enable_slices.axis().is_none() {
        return;
    }
    for slice in &scene.slices {
        let rect = RectPrimitive::new(slice.x0, slice.y0, slice.width, slice.height);
        if !props.debug_slices {
            out.push(rect);
            continue;
        }
        let rect = rect.with_border(Stroke::new(DEBUG_STROKE, 1.0));
        out.push(if ctx.current_slice == Some(slice) {
            rect.with_fill(DEBUG_HIGHLIGHT)
        } else {
            rect
        });
    }
}

fn mesh(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    if !ctx.mesh {
        return;
    }
    let (width, height) = (scene.inner.width, scene.inner.height);
    out.push(RectPrimitive::new(0.0, 0.0, width, height));
    if !props.debug_mesh {
        return;
    }

    let positions: Vec<(f64, f64)> = scene.points.iter().map(|point| (point.x, point.y)).collect();
    for (index, point) in scene.points.iter().enumerate() {
        let commands = polygon_commands(&voronoi_cell(&positions, index, width, height));
        if commands.is_empty() {
            continue;
        }
        let mut cell = PathPrimitive::stroked(commands, Stroke::new(DEBUG_STROKE, 1.0));
        if ctx.current_point.is_some_and(|current| current.id == point.id) {
            cell.fill = Some(DEBUG_HIGHLIGHT);
        }
        out.push(cell);
    }
}

fn polygon_commands(polygon: &[(f64, f64)]) -> Vec<PathCommand> {
    let Some((&(x, y), rest)) = polygon.split_first() else {
        return Vec::new();
    };
    let mut commands = Vec::with_capacity(polygon.len() + 1);
    commands.push(PathCommand::MoveTo { x, y });
    commands.extend(rest.iter().map(|&(x, y)| PathCommand::LineTo { x, y }));
    commands.push(PathCommand::ClosePath);
    commands
}

fn crosshair(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    if !props.is_interactive || !props.enable_crosshair {
        return;
    }
    let style = props.theme.crosshair.line;
    let (width, height) = (scene.inner.width, scene.inner.height);

    if let Some(point) = ctx.current_point {
        for (x1, y1, x2, y2) in props.crosshair_type.segments(point.x, point.y, width, height) {
            out.push(style.line(x1, y1, x2, y2));
        }
    } else if let Some(slice) = ctx.current_slice {
        match props.enable_slices.axis() {
            Some(Axis::X) => out.push(style.line(slice.x, 0.0, slice.x, height)),
            Some(Axis::Y) => out.push(style.line(0.0, slice.y, width, slice.y)),
            None => {}
        }
    }
}

fn legends(out: &mut LayerPrimitives, ctx: &LayerContext<'_>) {
    let LayerContext { scene, props, .. } = *ctx;
    if props.legends.is_empty() {
        return;
    }
    let data = legend_data(&scene.series);
    for legend in &props.legends {
        build_legend(out, legend, &data, scene.inner, &props.theme);
    }
}
