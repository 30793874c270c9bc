use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{Axis, DatumValue, InnerDimensions, Scale};
use crate::render::{Color, LayerPrimitives, LinePrimitive, TextHAlign, TextPrimitive, TextVAlign};

/// Where a marker label sits relative to the marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerLegendPosition {
    TopLeft,
    Top,
    #[default]
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerLegendOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Stroke override for a marker line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerLineStyle {
    pub stroke: Option<Color>,
    pub stroke_width: Option<f64>,
    pub stroke_dasharray: Option<[f64; 2]>,
}

/// Reference line across the inner area at a data value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartesianMarker {
    /// `x` draws a vertical line, `y` a horizontal one.
    pub axis: Axis,
    pub value: DatumValue,
    #[serde(default)]
    pub legend: Option<String>,
    #[serde(default)]
    pub legend_position: MarkerLegendPosition,
    #[serde(default = "default_legend_offset")]
    pub legend_offset_x: f64,
    #[serde(default = "default_legend_offset")]
    pub legend_offset_y: f64,
    #[serde(default)]
    pub legend_orientation: MarkerLegendOrientation,
    #[serde(default)]
    pub line_style: Option<MarkerLineStyle>,
    #[serde(default)]
    pub text_color: Option<Color>,
}

fn default_legend_offset() -> f64 {
    14.0
}

impl CartesianMarker {
    #[must_use]
    pub fn new(axis: Axis, value: impl Into<DatumValue>) -> Self {
        Self {
            axis,
            value: value.into(),
            legend: None,
            legend_position: MarkerLegendPosition::default(),
            legend_offset_x: default_legend_offset(),
            legend_offset_y: default_legend_offset(),
            legend_orientation: MarkerLegendOrientation::default(),
            line_style: None,
            text_color: None,
        }
    }

    #[must_use]
    pub fn with_legend(mut self, legend: impl Into<String>, position: MarkerLegendPosition) -> Self {
        self.legend = Some(legend.into());
        self.legend_position = position;
        self
    }
}

/// Default stroke and label style of markers, taken from the theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerTheme {
    pub line_color: Color,
    pub line_width: f64,
    pub font_size: f64,
    pub text_color: Color,
}

/// Draws every marker whose value maps onto its axis; markers off the
/// scale are skipped with a warning.
pub fn build_markers(
    out: &mut LayerPrimitives,
    markers: &[CartesianMarker],
    x_scale: &Scale,
    y_scale: &Scale,
    inner: InnerDimensions,
    theme: MarkerTheme,
) {
    for marker in markers {
        let scale = match marker.axis {
            Axis::X => x_scale,
            Axis::Y => y_scale,
        };
        let Some(offset) = scale.map(&marker.value) else {
            warn!(axis = ?marker.axis, value = %marker.value, "marker value is outside the scale");
            continue;
        };

        let style = marker.line_style.unwrap_or_default();
        let (x1, y1, x2, y2) = match marker.axis {
            Axis::X => (offset, 0.0, offset, inner.height),
            Axis::Y => (0.0, offset, inner.width, offset),
        };
        let line = LinePrimitive::new(
            x1,
            y1,
            x2,
            y2,
            style.stroke_width.unwrap_or(theme.line_width),
            style.stroke.unwrap_or(theme.line_color),
        );
        out.push(match style.stroke_dasharray {
            Some([on, off]) => line.dashed(on, off),
            None => line,
        });

        if let Some(legend) = marker.legend.as_deref().filter(|legend| !legend.is_empty()) {
            out.push(marker_label(marker, legend, offset, inner, theme));
        }
    }
}

fn marker_label(
    marker: &CartesianMarker,
    legend: &str,
    offset: f64,
    inner: InnerDimensions,
    theme: MarkerTheme,
) -> TextPrimitive {
    use MarkerLegendPosition as P;

    let (dx, dy) = (marker.legend_offset_x, marker.legend_offset_y);
    let (width, height) = (inner.width, inner.height);
    let (x, y, h_align, v_align) = match marker.axis {
        Axis::X => match marker.legend_position {
            P::TopLeft => (offset - dx, dy, TextHAlign::Right, TextVAlign::Middle),
            P::Top => (offset, -dy, TextHAlign::Center, TextVAlign::Middle),
            P::TopRight => (offset + dx, dy, TextHAlign::Left, TextVAlign::Middle),
            P::Right => (offset + dx, height / 2.0, TextHAlign::Left, TextVAlign::Middle),
            P::BottomRight => (offset + dx, height - dy, TextHAlign::Left, TextVAlign::Middle),
            P::Bottom => (offset, height + dy, TextHAlign::Center, TextVAlign::Middle),
            P::BottomLeft => (offset - dx, height - dy, TextHAlign::Right, TextVAlign::Middle),
            P::Left => (offset - dx, height / 2.0, TextHAlign::Right, TextVAlign::Middle),
        },
        Axis::Y => match marker.legend_position {
            P::TopLeft => (dx, offset - dy, TextHAlign::Left, TextVAlign::Alphabetic),
            P::Top => (width / 2.0, offset - dy, TextHAlign::Center, TextVAlign::Alphabetic),
            P::TopRight => (width - dx, offset - dy, TextHAlign::Right, TextVAlign::Alphabetic),
            P::Right => (width + dx, offset, TextHAlign::Left, TextVAlign::Middle),
            P::BottomRight => (width - dx, offset + dy, TextHAlign::Right, TextVAlign::Top),
            P::Bottom => (width / 2.0, offset + dy, TextHAlign::Center, TextVAlign::Top),
            P::BottomLeft => (dx, offset + dy, TextHAlign::Left, TextVAlign::Top),
            P::Left => (-dx, offset, TextHAlign::Right, TextVAlign::Middle),
        },
    };

    let text = TextPrimitive::new(
        legend,
        x,
        y,
        theme.font_size,
        marker.text_color.unwrap_or(theme.text_color),
        h_align,
    )
    .with_v_align(v_align);
    match marker.legend_orientation {
        MarkerLegendOrientation::Horizontal => text,
        MarkerLegendOrientation::Vertical => text.rotated(-90.0),
    }
}

#[cfg(test)]
mod tests {
    use super::{CartesianMarker, MarkerLegendPosition, MarkerTheme, build_markers};
    use crate::core::{Axis, DatumValue, InnerDimensions, Scale, ScaleSpec};
    use crate::render::{Color, LayerPrimitives, Primitive, TextHAlign};

    fn theme() -> MarkerTheme {
        MarkerTheme {
            line_color: Color::BLACK,
            line_width: 1.0,
            font_size: 11.0,
            text_color: Color::BLACK,
        }
    }

    fn scales() -> (Scale, Scale) {
        let x = Scale::compute(
            &ScaleSpec::point(),
            &["a", "b", "c"].map(DatumValue::from),
            (0.0, 200.0),
        )
        .expect("x");
        let y = Scale::compute(
            &ScaleSpec::linear(),
            &[DatumValue::Number(0.0), DatumValue::Number(10.0)],
            (100.0, 0.0),
        )
        .expect("y");
        (x, y)
    }

    #[test]
    fn y_marker_spans_the_inner_width_with_a_label() {
        let (x, y) = scales();
        let mut out = LayerPrimitives::new();
        let marker = CartesianMarker::new(Axis::Y, 5.0).with_legend("limit", MarkerLegendPosition::TopLeft);
        let inner = InnerDimensions {
            width: 200.0,
            height: 100.0,
        };
        build_markers(&mut out, &[marker], &x, &y, inner, theme());

        assert_eq!(out.len(), 2);
        match (&out.primitives[0], &out.primitives[1]) {
            (Primitive::Line(line), Primitive::Text(text)) => {
                assert_eq!((line.x1, line.y1, line.x2, line.y2), (0.0, 50.0, 200.0, 50.0));
                assert_eq!((text.x, text.y, text.h_align), (14.0, 36.0, TextHAlign::Left));
            }
            other => panic!("unexpected primitives: {other:?}"),
        }
    }

    #[test]
    fn markers_off_the_scale_are_skipped() {
        let (x, y) = scales();
        let mut out = LayerPrimitives::new();
        let inner = InnerDimensions {
            width: 200.0,
            height: 100.0,
        };
        build_markers(
            &mut out,
            &[CartesianMarker::new(Axis::X, "z"), CartesianMarker::new(Axis::X, "b")],
            &x,
            &y,
            inner,
            theme(),
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn markers_deserialize_with_default_offsets() {
        let marker: CartesianMarker =
            serde_json::from_str(r#"{"axis": "x", "value": 3, "legend": "now"}"#).expect("marker");
        assert_eq!(marker.legend_offset_x, 14.0);
        assert_eq!(marker.legend_position, MarkerLegendPosition::TopRight);
    }
}
