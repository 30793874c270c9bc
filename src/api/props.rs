//! Prop contracts of the vector and canvas line charts.
//!
//! Fields shared by both rendering modes live in [`LineCommonProps`]; each
//! mode adds its own table. Every table has an all-optional partial twin
//! whose `resolve` fills unset fields with the documented defaults.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::core::{
    Callback, DatumValue, LineCurve, Margin, ScaleSpec, Serie, TicksSpec, ValueFormat,
};
use crate::error::{ChartError, ChartResult};
use crate::extensions::CartesianMarker;
use crate::interaction::{CrosshairType, PointerEvent, SliceMode};
use crate::render::BlendMode;

use super::schema::{
    ConfigDiagnostic, DiagnosticKind, JsonConfig, check_range, config_table,
};
use super::{
    AxisProps, CanvasLayer, InheritedColor, LegendProps, MotionConfig, OrdinalColorScaleConfig,
    Point, PointLabel, PointSymbolFn, PointTooltipFn, Slice, SliceTooltipFn, SvgDef, SvgFillRule,
    SvgLayer, Theme, ThemeColorKey, canonical_layers,
};

/// What an interaction event designates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventTarget<'a> {
    Point(&'a Point),
    Slice(&'a Slice),
}

pub type ChartEventFn = dyn for<'a> Fn(EventTarget<'a>, PointerEvent);

/// Wraps a closure as an event handler.
#[must_use]
pub fn event_handler(
    handler: impl for<'a> Fn(EventTarget<'a>, PointerEvent) + 'static,
) -> Callback<ChartEventFn> {
    let handler: Rc<ChartEventFn> = Rc::new(handler);
    Callback::from_rc(handler)
}

type EventHandler = Option<Callback<ChartEventFn>>;

config_table! {
    /// Props shared by the vector and canvas line charts.
    pub struct LineCommonProps / PartialLineCommonProps {
        margin: Margin = Margin::default() => "margin" as data,
        theme: Theme = Theme::default() => "theme" as data,

        x_scale: ScaleSpec = ScaleSpec::point() => "xScale" as data,
        x_format: Option<ValueFormat> = None => "xFormat" as data,
        y_scale: ScaleSpec = ScaleSpec::linear() => "yScale" as data,
        y_format: Option<ValueFormat> = None => "yFormat" as data,

        curve: LineCurve = LineCurve::Linear => "curve" as data,
        line_width: f64 = 2.0 => "lineWidth" as data,
        colors: OrdinalColorScaleConfig = OrdinalColorScaleConfig::default() => "colors" as data,

        enable_area: bool = false => "enableArea" as data,
        area_baseline_value: DatumValue = DatumValue::Number(0.0) => "areaBaselineValue" as data,
        area_opacity: f64 = 0.2 => "areaOpacity" as data,
        area_blend_mode: BlendMode = BlendMode::Normal => "areaBlendMode" as data,

        axis_top: Option<AxisProps> = None => "axisTop" as data,
        axis_right: Option<AxisProps> = None => "axisRight" as data,
        axis_bottom: Option<AxisProps> = Some(AxisProps::default()) => "axisBottom" as data,
        axis_left: Option<AxisProps> = Some(AxisProps::default()) => "axisLeft" as data,

        enable_grid_x: bool = true => "enableGridX" as data,
        enable_grid_y: bool = true => "enableGridY" as data,
        grid_x_values: Option<TicksSpec> = None => "gridXValues" as data,
        grid_y_values: Option<TicksSpec> = None => "gridYValues" as data,

        enable_points: bool = true => "enablePoints" as data,
        /// Replaces the default circle.
        point_symbol: Option<Callback<PointSymbolFn>> = None => "pointSymbol" as code,
        point_size: f64 = 6.0 => "pointSize" as data,
        point_color: InheritedColor = InheritedColor::from_serie() => "pointColor" as data,
        point_border_width: f64 = 0.0 => "pointBorderWidth" as data,
        point_border_color: InheritedColor =
            InheritedColor::Theme(ThemeColorKey::Background) => "pointBorderColor" as data,
        enable_point_label: bool = false => "enablePointLabel" as data,
        point_label: PointLabel = PointLabel::default() => "pointLabel" as data,
        point_label_y_offset: f64 = -12.0 => "pointLabelYOffset" as data,

        markers: Vec<CartesianMarker> = Vec::new() => "markers" as data,
        legends: Vec<LegendProps> = Vec::new() => "legends" as data,

        is_interactive: bool = true => "isInteractive" as data,
        /// `None` shows the built-in point tooltip.
        tooltip: Option<Callback<PointTooltipFn>> = None => "tooltip" as code,
        tooltip_format: Option<ValueFormat> = None => "tooltipFormat" as data,
        enable_slices: SliceMode = SliceMode::Disabled => "enableSlices" as data,
        debug_slices: bool = false => "debugSlices" as data,
        /// `None` shows the built-in slice tooltip.
        slice_tooltip: Option<Callback<SliceTooltipFn>> = None => "sliceTooltip" as code,
        debug_mesh: bool = false => "debugMesh" as data,
        enable_crosshair: bool = true => "enableCrosshair" as data,
        crosshair_type: CrosshairType = CrosshairType::BottomLeft => "crosshairType" as data,

        on_mouse_enter: EventHandler = None => "onMouseEnter" as code,
        on_mouse_move: EventHandler = None => "onMouseMove" as code,
        on_mouse_leave: EventHandler = None => "onMouseLeave" as code,
        on_click: EventHandler = None => "onClick" as code,
        on_touch_start: EventHandler = None => "onTouchStart" as code,
        on_touch_move: EventHandler = None => "onTouchMove" as code,
        on_touch_end: EventHandler = None => "onTouchEnd" as code,
    }
}

impl LineCommonProps {
    /// Resets numeric fields outside their accepted range to their defaults.
    pub fn check_ranges(&mut self) -> Vec<ConfigDiagnostic> {
        let defaults = Self::default();
        let mut diagnostics = Vec::new();
        let non_negative = |value: f64| value >= 0.0;
        check_range(
            &mut self.point_size,
            defaults.point_size,
            "pointSize",
            ">= 0",
            non_negative,
            &mut diagnostics,
        );
        check_range(
            &mut self.line_width,
            defaults.line_width,
            "lineWidth",
            ">= 0",
            non_negative,
            &mut diagnostics,
        );
        check_range(
            &mut self.area_opacity,
            defaults.area_opacity,
            "areaOpacity",
            "within [0, 1]",
            |value| (0.0..=1.0).contains(&value),
            &mut diagnostics,
        );
        check_range(
            &mut self.point_border_width,
            defaults.point_border_width,
            "pointBorderWidth",
            ">= 0",
            non_negative,
            &mut diagnostics,
        );
        check_range(
            &mut self.point_label_y_offset,
            defaults.point_label_y_offset,
            "pointLabelYOffset",
            "finite",
            |_| true,
            &mut diagnostics,
        );
        if !self.margin.is_finite() {
            diagnostics.push(ConfigDiagnostic::out_of_range("margin", "every side must be finite"));
            self.margin = defaults.margin;
        }
        diagnostics
    }
}

config_table! {
    /// Props of the vector (SVG) line chart only.
    pub struct SvgProps / PartialSvgProps {
        layers: Vec<SvgLayer> = canonical_layers() => "layers" as data,
        use_mesh: bool = false => "useMesh" as data,
        enable_touch_crosshair: bool = false => "enableTouchCrosshair" as data,
        animate: bool = true => "animate" as data,
        motion_config: MotionConfig = MotionConfig::default() => "motionConfig" as data,
        defs: Vec<SvgDef> = Vec::new() => "defs" as data,
        fill: Vec<SvgFillRule> = Vec::new() => "fill" as data,
        role: String = "img".to_owned() => "role" as data,
        render_wrapper: bool = true => "renderWrapper" as data,
    }
}

config_table! {
    /// Props of the canvas line chart only.
    pub struct CanvasProps / PartialCanvasProps {
        layers: Vec<CanvasLayer> = canonical_layers() => "layers" as data,
    }
}

/// Resolved configuration of the vector line chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineSvgConfig {
    pub common: LineCommonProps,
    pub svg: SvgProps,
}

impl LineSvgConfig {
    pub fn check_ranges(&mut self) -> Vec<ConfigDiagnostic> {
        self.common.check_ranges()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialLineSvgConfig {
    pub common: PartialLineCommonProps,
    pub svg: PartialSvgProps,
}

impl PartialLineSvgConfig {
    #[must_use]
    pub fn resolve(self) -> LineSvgConfig {
        LineSvgConfig {
            common: self.common.resolve(),
            svg: self.svg.resolve(),
        }
    }

    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            common: self.common.merge(overrides.common),
            svg: self.svg.merge(overrides.svg),
        }
    }

    /// Loads the data fields of a JSON object.
    ///
    /// Fields that fail to parse, unknown fields and function-valued fields
    /// become diagnostics; only input that is not a JSON object is an error.
    pub fn from_json_str(json: &str) -> ChartResult<JsonConfig<Self>> {
        let mut partial = Self::default();
        let diagnostics = apply_json_object(json, |key, value, diagnostics| {
            if PartialLineCommonProps::FIELDS.contains(&key) {
                partial.common.apply_json_field(key, value, diagnostics)
            } else {
                partial.svg.apply_json_field(key, value, diagnostics)
            }
        })?;
        Ok(JsonConfig {
            partial,
            diagnostics,
        })
    }
}

/// Source of the device pixel ratio for canvas charts.
pub trait HostDisplay {
    /// `None` when the host cannot tell.
    fn device_pixel_ratio(&self) -> Option<f64>;
}

/// Display with a fixed, possibly unknown, pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedDisplay(pub Option<f64>);

impl HostDisplay for FixedDisplay {
    fn device_pixel_ratio(&self) -> Option<f64> {
        self.0
    }
}

/// Ratio reported by `host`, or 1 when it reports nothing usable.
#[must_use]
pub fn host_pixel_ratio(host: &dyn HostDisplay) -> f64 {
    host.device_pixel_ratio()
        .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
        .unwrap_or(1.0)
}

/// Resolved configuration of the canvas line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineCanvasConfig {
    pub common: LineCommonProps,
    pub canvas: CanvasProps,
    pub pixel_ratio: f64,
}

impl Default for LineCanvasConfig {
    fn default() -> Self {
        PartialLineCanvasConfig::default().resolve(&FixedDisplay(None))
    }
}

impl LineCanvasConfig {
    /// Range checks; a rejected pixel ratio falls back to 1.
    pub fn check_ranges(&mut self) -> Vec<ConfigDiagnostic> {
        let mut diagnostics = self.common.check_ranges();
        check_range(
            &mut self.pixel_ratio,
            1.0,
            "pixelRatio",
            "> 0",
            |ratio| ratio > 0.0,
            &mut diagnostics,
        );
        diagnostics
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialLineCanvasConfig {
    pub common: PartialLineCommonProps,
    pub canvas: PartialCanvasProps,
    /// Defaults to the host display ratio.
    pub pixel_ratio: Option<f64>,
}

impl PartialLineCanvasConfig {
    #[must_use]
    pub fn resolve(self, host: &dyn HostDisplay) -> LineCanvasConfig {
        let pixel_ratio = self
            .pixel_ratio
            .unwrap_or_else(|| host_pixel_ratio(host));
        debug!(pixel_ratio, "resolved canvas pixel ratio");
        LineCanvasConfig {
            common: self.common.resolve(),
            canvas: self.canvas.resolve(),
            pixel_ratio,
        }
    }

    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            common: self.common.merge(overrides.common),
            canvas: self.canvas.merge(overrides.canvas),
            pixel_ratio: overrides.pixel_ratio.or(self.pixel_ratio),
        }
    }

    pub fn from_json_str(json: &str) -> ChartResult<JsonConfig<Self>> {
        let mut partial = Self::default();
        let diagnostics = apply_json_object(json, |key, value, diagnostics| {
            if key == "pixelRatio" {
                match serde_json::from_value::<f64>(value) {
                    Ok(ratio) => partial.pixel_ratio = Some(ratio),
                    Err(err) => diagnostics
                        .push(ConfigDiagnostic::invalid_shape("pixelRatio", err.to_string())),
                }
                return true;
            }
            if PartialLineCommonProps::FIELDS.contains(&key) {
                partial.common.apply_json_field(key, value, diagnostics)
            } else {
                partial.canvas.apply_json_field(key, value, diagnostics)
            }
        })?;
        Ok(JsonConfig {
            partial,
            diagnostics,
        })
    }
}

fn apply_json_object(
    json: &str,
    mut apply: impl FnMut(&str, serde_json::Value, &mut Vec<ConfigDiagnostic>) -> bool,
) -> ChartResult<Vec<ConfigDiagnostic>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|err| ChartError::InvalidData(format!("config is not valid JSON: {err}")))?;
    let serde_json::Value::Object(entries) = value else {
        return Err(ChartError::config("config", "expected a JSON object"));
    };

    let mut diagnostics = Vec::new();
    for (key, value) in entries {
        if !apply(&key, value, &mut diagnostics) {
            diagnostics.push(ConfigDiagnostic::new(key, DiagnosticKind::UnknownField));
        }
    }
    Ok(diagnostics)
}

/// Reports data problems: no series at all, empty or repeated series ids,
/// and series without points.
#[must_use]
pub fn validate_data(data: &[Serie]) -> Vec<ConfigDiagnostic> {
    if data.is_empty() {
        return vec![ConfigDiagnostic::new("data", DiagnosticKind::MissingRequired)];
    }

    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();
    for (index, serie) in data.iter().enumerate() {
        let field = format!("data[{index}]");
        if serie.id.is_empty() {
            diagnostics.push(ConfigDiagnostic::new(&field, DiagnosticKind::EmptySeriesId));
        } else if !seen.insert(serie.id.to_string()) {
            diagnostics.push(ConfigDiagnostic::new(&field, DiagnosticKind::DuplicateSeriesId));
        }
        if serie.data.is_empty() {
            diagnostics.push(ConfigDiagnostic::new(field, DiagnosticKind::EmptySeries));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::{
        FixedDisplay, LineCommonProps, PartialLineCanvasConfig, PartialLineCommonProps,
        PartialLineSvgConfig, validate_data,
    };
    use crate::api::DiagnosticKind;
    use crate::core::{Datum, Serie};
    use crate::render::LineLayerType;

    #[test]
    fn defaults_match_the_documented_table() {
        let props = LineCommonProps::default();
        assert_eq!(props.point_size, 6.0);
        assert_eq!(props.line_width, 2.0);
        assert_eq!(props.area_opacity, 0.2);
        assert_eq!(props.point_label_y_offset, -12.0);
        assert!(props.axis_top.is_none() && props.axis_bottom.is_some());

        let config = PartialLineSvgConfig::default().resolve();
        assert_eq!(config.svg.role, "img");
        assert!(!config.svg.use_mesh);
        assert_eq!(config.svg.layers.len(), LineLayerType::CANONICAL.len());
    }

    #[test]
    fn json_config_collects_diagnostics_without_failing() {
        let json = r#"{
            "pointSize": 9,
            "lineWidth": "thick",
            "tooltip": "custom",
            "width": 400,
            "useMesh": true
        }"#;
        let loaded = PartialLineSvgConfig::from_json_str(json).expect("object");
        assert_eq!(loaded.partial.common.point_size, Some(9.0));
        assert_eq!(loaded.partial.svg.use_mesh, Some(true));
        let kinds: Vec<(&str, &DiagnosticKind)> = loaded
            .diagnostics
            .iter()
            .map(|diagnostic| (diagnostic.field.as_str(), &diagnostic.kind))
            .collect();
        assert!(matches!(kinds[0], ("lineWidth", DiagnosticKind::InvalidShape(_))));
        assert_eq!(kinds[1], ("tooltip", &DiagnosticKind::CodeOnlyField));
        assert_eq!(kinds[2], ("width", &DiagnosticKind::UnknownField));
        assert_eq!(loaded.partial.resolve().common.line_width, 2.0);
    }

    #[test]
    fn oversized_format_precision_falls_back_to_the_default() {
        let loaded = PartialLineSvgConfig::from_json_str(r#"{"yFormat": ".70000f"}"#)
            .expect("object");
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].field, "yFormat");
        assert!(matches!(loaded.diagnostics[0].kind, DiagnosticKind::InvalidShape(_)));
        assert!(loaded.partial.resolve().common.y_format.is_none());
    }

    #[test]
    fn non_object_json_is_an_error() {
        assert!(PartialLineSvgConfig::from_json_str("[1, 2]").is_err());
        assert!(PartialLineSvgConfig::from_json_str("{").is_err());
    }

    #[test]
    fn range_checks_reset_rejected_values() {
        let mut props = PartialLineCommonProps {
            area_opacity: Some(1.5),
            point_size: Some(-1.0),
            ..PartialLineCommonProps::default()
        }
        .resolve();
        let diagnostics = props.check_ranges();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(props.area_opacity, 0.2);
        assert_eq!(props.point_size, 6.0);
    }

    #[test]
    fn canvas_pixel_ratio_follows_the_host() {
        let config = PartialLineCanvasConfig::default().resolve(&FixedDisplay(Some(2.0)));
        assert_eq!(config.pixel_ratio, 2.0);
        let config = PartialLineCanvasConfig::default().resolve(&FixedDisplay(Some(f64::NAN)));
        assert_eq!(config.pixel_ratio, 1.0);

        let loaded = PartialLineCanvasConfig::from_json_str(r#"{"pixelRatio": 3}"#).expect("json");
        let mut config = loaded.partial.resolve(&FixedDisplay(Some(2.0)));
        assert_eq!(config.pixel_ratio, 3.0);
        config.pixel_ratio = 0.0;
        assert_eq!(config.check_ranges().len(), 1);
        assert_eq!(config.pixel_ratio, 1.0);
    }

    #[test]
    fn data_validation_flags_ids_and_empty_series() {
        let data = vec![
            Serie::new("a", vec![Datum::new(0, 1)]),
            Serie::new("a", vec![Datum::new(0, 2)]),
            Serie::new("", Vec::new()),
        ];
        let kinds: Vec<DiagnosticKind> = validate_data(&data)
            .into_iter()
            .map(|diagnostic| diagnostic.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::DuplicateSeriesId,
                DiagnosticKind::EmptySeriesId,
                DiagnosticKind::EmptySeries
            ]
        );
        assert_eq!(validate_data(&[])[0].kind, DiagnosticKind::MissingRequired);
    }
}
