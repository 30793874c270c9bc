use serde::{Deserialize, Serialize};

use crate::core::{DatumValue, InnerDimensions, Scale, TicksSpec, ValueFormat, format_value};
use crate::render::{LayerPrimitives, TextHAlign, TextVAlign};

use super::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisLegendPosition {
    Start,
    Middle,
    #[default]
    End,
}

/// Side of the inner area an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    Top,
    Right,
    Bottom,
    Left,
}

impl AxisPosition {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Settings of one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisProps {
    pub tick_values: Option<TicksSpec>,
    pub tick_size: f64,
    pub tick_padding: f64,
    /// Clockwise label rotation in degrees.
    pub tick_rotation: f64,
    pub format: Option<ValueFormat>,
    pub legend: Option<String>,
    pub legend_position: AxisLegendPosition,
    pub legend_offset: f64,
}

impl Default for AxisProps {
    fn default() -> Self {
        Self {
            tick_values: None,
            tick_size: 5.0,
            tick_padding: 5.0,
            tick_rotation: 0.0,
            format: None,
            legend: None,
            legend_position: AxisLegendPosition::End,
            legend_offset: 0.0,
        }
    }
}

/// Draws one axis: its domain line, ticks with labels, and legend.
pub(crate) fn build_axis(
    out: &mut LayerPrimitives,
    position: AxisPosition,
    axis: &AxisProps,
    scale: &Scale,
    inner: InnerDimensions,
    theme: &Theme,
) {
    let (origin_x, origin_y) = match position {
        AxisPosition::Top | AxisPosition::Left => (0.0, 0.0),
        AxisPosition::Bottom => (0.0, inner.height),
        AxisPosition::Right => (inner.width, 0.0),
    };

    let domain = theme.axis.domain.line;
    if domain.is_visible() {
        let line = if position.is_horizontal() {
            domain.line(0.0, origin_y, inner.width, origin_y)
        } else {
            domain.line(origin_x, 0.0, origin_x, inner.height)
        };
        out.push(line);
    }

    let ticks = theme.axis.ticks;
    let outward = match position {
        AxisPosition::Top | AxisPosition::Left => -1.0,
        AxisPosition::Bottom | AxisPosition::Right => 1.0,
    };
    let label_distance = outward * (axis.tick_size + axis.tick_padding);

    for value in scale.tick_values(axis.tick_values.as_ref()) {
        let Some(offset) = scale.map(&value) else {
            continue;
        };
        let label = tick_label(axis.format.as_ref(), &value);
        let text = if position.is_horizontal() {
            let x = origin_x + offset;
            if ticks.line.is_visible() {
                out.push(ticks.line.line(x, origin_y, x, origin_y + outward * axis.tick_size));
            }
            let v_align = if outward > 0.0 {
                TextVAlign::Top
            } else {
                TextVAlign::Alphabetic
            };
            ticks
                .text
                .text(label, x, origin_y + label_distance, TextHAlign::Center)
                .with_v_align(v_align)
        } else {
            let y = origin_y + offset;
            if ticks.line.is_visible() {
                out.push(ticks.line.line(origin_x, y, origin_x + outward * axis.tick_size, y));
            }
            let h_align = if outward > 0.0 {
                TextHAlign::Left
            } else {
                TextHAlign::Right
            };
            ticks.text.text(label, origin_x + label_distance, y, h_align)
        };
        out.push(text.rotated(axis.tick_rotation));
    }

    if let Some(legend) = axis.legend.as_deref().filter(|legend| !legend.is_empty()) {
        let style = theme.axis.legend.text;
        let text = if position.is_horizontal() {
            let (x, h_align) = match axis.legend_position {
                AxisLegendPosition::Start => (0.0, TextHAlign::Left),
                AxisLegendPosition::Middle => (inner.width / 2.0, TextHAlign::Center),
                AxisLegendPosition::End => (inner.width, TextHAlign::Right),
            };
            style.text(legend, x, origin_y + axis.legend_offset, h_align)
        } else {
            // Vertical legends read bottom to top, so `start` sits at the bottom.
            let (y, h_align) = match axis.legend_position {
                AxisLegendPosition::Start => (inner.height, TextHAlign::Left),
                AxisLegendPosition::Middle => (inner.height / 2.0, TextHAlign::Center),
                AxisLegendPosition::End => (0.0, TextHAlign::Right),
            };
            style
                .text(legend, origin_x + axis.legend_offset, y, h_align)
                .rotated(-90.0)
        };
        out.push(text);
    }
}

fn tick_label(format: Option<&ValueFormat>, value: &DatumValue) -> String {
    match (format, value) {
        (None, DatumValue::Date(time)) => time.format("%Y-%m-%d").to_string(),
        _ => format_value(format, value),
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisPosition, AxisProps, build_axis};
    use crate::api::Theme;
    use crate::core::{DatumValue, InnerDimensions, Scale, ScaleSpec, TicksSpec, ValueFormat};
    use crate::render::{LayerPrimitives, Primitive, TextHAlign};

    fn linear_scale() -> Scale {
        let values = vec![DatumValue::Number(0.0), DatumValue::Number(10.0)];
        Scale::compute(&ScaleSpec::linear(), &values, (100.0, 0.0)).expect("scale")
    }

    fn texts(out: &LayerPrimitives) -> Vec<(String, f64, f64, TextHAlign)> {
        out.primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Text(text) => Some((text.text.clone(), text.x, text.y, text.h_align)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn left_axis_labels_sit_outside_the_inner_area() {
        let mut out = LayerPrimitives::new();
        let axis = AxisProps {
            tick_values: Some(TicksSpec::Values(vec![
                DatumValue::Number(0.0),
                DatumValue::Number(10.0),
            ])),
            ..AxisProps::default()
        };
        let inner = InnerDimensions {
            width: 200.0,
            height: 100.0,
        };
        build_axis(&mut out, AxisPosition::Left, &axis, &linear_scale(), inner, &Theme::default());
        let labels = texts(&out);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], ("0".to_owned(), -10.0, 100.0, TextHAlign::Right));
        assert_eq!(labels[1].2, 0.0);
    }

    #[test]
    fn axis_format_and_legend_are_applied() {
        let mut out = LayerPrimitives::new();
        let axis = AxisProps {
            tick_values: Some(TicksSpec::Values(vec![DatumValue::Number(5.0)])),
            format: Some(ValueFormat::parse(".1f").expect("format")),
            legend: Some("value".to_owned()),
            legend_offset: 36.0,
            ..AxisProps::default()
        };
        let inner = InnerDimensions {
            width: 200.0,
            height: 100.0,
        };
        let scale = Scale::compute(
            &ScaleSpec::linear(),
            &[DatumValue::Number(0.0), DatumValue::Number(10.0)],
            (0.0, 200.0),
        )
        .expect("scale");
        build_axis(&mut out, AxisPosition::Bottom, &axis, &scale, inner, &Theme::default());
        let labels = texts(&out);
        assert_eq!(labels[0].0, "5.0");
        assert_eq!(labels[0].1, 100.0);
        assert_eq!(labels[0].2, 110.0);
        assert_eq!(labels[1], ("value".to_owned(), 200.0, 136.0, TextHAlign::Right));
    }
}
