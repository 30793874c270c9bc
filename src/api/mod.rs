//! Public surface of the line chart: prop contracts, scene computation,
//! layers, the two renderer entry points and their responsive adapters.

mod axes;
mod builtin_layers;
mod colors;
mod layers;
mod legends;
mod line;
mod line_canvas;
mod motion;
mod pointer;
mod props;
mod responsive;
mod scene;
pub(crate) mod schema;
mod svg_defs;
mod theme;
mod tooltip;

pub use axes::{AxisLegendPosition, AxisPosition, AxisProps};
pub use colors::{
    ColorModifier, ColorScheme, InheritedColor, InheritedColorFn, OrdinalColorScaleConfig,
    SerieColorFn, ThemeColorKey,
};
pub use layers::{
    CanvasLayer, CanvasLayerFn, CustomLayerProps, Layer, SvgLayer, SvgLayerFn, canonical_layers,
    layer_stack,
};
pub use legends::{
    LegendAnchor, LegendDatum, LegendDirection, LegendItemDirection, LegendProps,
    LegendSymbolShape, legend_data,
};
pub use line::Line;
pub use line_canvas::LineCanvas;
pub use motion::{MotionConfig, MotionPreset, SpringConfig};
pub use props::{
    CanvasProps, ChartEventFn, EventTarget, FixedDisplay, HostDisplay, LineCanvasConfig,
    LineCommonProps, LineSvgConfig, PartialCanvasProps, PartialLineCanvasConfig,
    PartialLineCommonProps, PartialLineSvgConfig, PartialSvgProps, SvgProps, event_handler,
    host_pixel_ratio, validate_data,
};
pub use responsive::{
    ContainerMeasure, HeadlessContainer, LineCanvasProps, LineCanvasRenderer, LineSvgProps,
    LineSvgRenderer, ResponsiveLine, ResponsiveLineCanvas, SizeListener, SizeSubscription,
};
pub use scene::{
    ComputedSerie, LineScene, Point, PointData, PointLabel, PointLabelField, PointLabelFn,
    PointSymbolFn, PointSymbolProps, Slice, compute_slices,
};
pub use schema::{ConfigDiagnostic, DiagnosticKind, JsonConfig, log_diagnostics};
pub use svg_defs::{FillMatch, GradientStop, SvgDef, SvgFillRule, fill_for};
pub use theme::{
    AxisTheme, AxisTicksTheme, CrosshairLineStyle, CrosshairTheme, GridTheme, LineElementTheme,
    LineStyle, MarkersTheme, TextElementTheme, TextStyle, Theme, TooltipTheme,
};
pub use tooltip::{
    PointTooltipFn, SliceTooltipFn, SliceTooltipProps, Tooltip, TooltipContent, TooltipRow,
    default_point_tooltip, default_slice_tooltip, point_tooltip, slice_tooltip,
};
