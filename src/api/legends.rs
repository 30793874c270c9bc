use serde::{Deserialize, Serialize};

use crate::core::{InnerDimensions, LineCurve, PathCommand};
use crate::render::{
    CirclePrimitive, Color, LayerPrimitives, PathPrimitive, RectPrimitive, TextHAlign, TextPrimitive,
    TextVAlign,
};

use super::{ComputedSerie, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendAnchor {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    #[default]
    BottomLeft,
    Left,
    TopLeft,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendDirection {
    Row,
    #[default]
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendItemDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendSymbolShape {
    Circle,
    Diamond,
    #[default]
    Square,
    Triangle,
}

/// One legend box listing every series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendProps {
    pub anchor: LegendAnchor,
    pub direction: LegendDirection,
    pub justify: bool,
    pub translate_x: f64,
    pub translate_y: f64,
    pub items_spacing: f64,
    pub item_width: f64,
    pub item_height: f64,
    pub item_direction: LegendItemDirection,
    pub item_text_color: Option<Color>,
    pub item_opacity: f64,
    pub symbol_size: f64,
    pub symbol_spacing: f64,
    pub symbol_shape: LegendSymbolShape,
    pub padding: f64,
}

impl Default for LegendProps {
    fn default() -> Self {
        Self {
            anchor: LegendAnchor::BottomLeft,
            direction: LegendDirection::Column,
            justify: false,
            translate_x: 0.0,
            translate_y: 0.0,
            items_spacing: 0.0,
            item_width: 80.0,
            item_height: 20.0,
            item_direction: LegendItemDirection::LeftToRight,
            item_text_color: None,
            item_opacity: 1.0,
            symbol_size: 16.0,
            symbol_spacing: 8.0,
            symbol_shape: LegendSymbolShape::Square,
            padding: 0.0,
        }
    }
}

/// Entry of a legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendDatum {
    pub label: String,
    pub color: Color,
}

/// Legend entries for the series, last series first so the list reads in
/// the same order as the stacked lines.
#[must_use]
pub fn legend_data(series: &[ComputedSerie]) -> Vec<LegendDatum> {
    series
        .iter()
        .rev()
        .map(|serie| LegendDatum {
            label: serie.id.to_string(),
            color: serie.color,
        })
        .collect()
}

pub(crate) fn build_legend(
    out: &mut LayerPrimitives,
    legend: &LegendProps,
    data: &[LegendDatum],
    inner: InnerDimensions,
    theme: &Theme,
) {
    if data.is_empty() {
        return;
    }
    let count = data.len() as f64;
    let spacing_total = legend.items_spacing * (count - 1.0);
    let (box_width, box_height) = match legend.direction {
        LegendDirection::Row => (
            legend.item_width * count + spacing_total + 2.0 * legend.padding,
            legend.item_height + 2.0 * legend.padding,
        ),
        LegendDirection::Column => (
            legend.item_width + 2.0 * legend.padding,
            legend.item_height * count + spacing_total + 2.0 * legend.padding,
        ),
    };

    let free_x = inner.width - box_width;
    let free_y = inner.height - box_height;
    let (anchor_x, anchor_y) = match legend.anchor {
        LegendAnchor::TopLeft => (0.0, 0.0),
        LegendAnchor::Top => (free_x / 2.0, 0.0),
        LegendAnchor::TopRight => (free_x, 0.0),
        LegendAnchor::Right => (free_x, free_y / 2.0),
        LegendAnchor::BottomRight => (free_x, free_y),
        LegendAnchor::Bottom => (free_x / 2.0, free_y),
        LegendAnchor::BottomLeft => (0.0, free_y),
        LegendAnchor::Left => (0.0, free_y / 2.0),
        LegendAnchor::Center => (free_x / 2.0, free_y / 2.0),
    };
    let origin_x = anchor_x + legend.translate_x + legend.padding;
    let origin_y = anchor_y + legend.translate_y + legend.padding;

    let text_style = theme.legends.text;
    let text_color = legend.item_text_color.unwrap_or(text_style.fill);
    let opacity = legend.item_opacity.clamp(0.0, 1.0);

    for (index, datum) in data.iter().enumerate() {
        let step = index as f64;
        let (item_x, item_y) = match legend.direction {
            LegendDirection::Row => (
                origin_x + step * (legend.item_width + legend.items_spacing),
                origin_y,
            ),
            LegendDirection::Column => (
                origin_x,
                origin_y + step * (legend.item_height + legend.items_spacing),
            ),
        };
        let layout = item_layout(legend);
        push_symbol(
            out,
            legend.symbol_shape,
            item_x + layout.symbol_x,
            item_y + layout.symbol_y,
            legend.symbol_size,
            datum.color.with_alpha(datum.color.alpha * opacity),
        );
        out.push(
            TextPrimitive::new(
                datum.label.clone(),
                item_x + layout.label_x,
                item_y + layout.label_y,
                text_style.font_size,
                text_color.with_alpha(text_color.alpha * opacity),
                layout.label_align,
            )
            .with_v_align(layout.label_v_align),
        );
    }
}

struct ItemLayout {
    symbol_x: f64,
    symbol_y: f64,
    label_x: f64,
    label_y: f64,
    label_align: TextHAlign,
    label_v_align: TextVAlign,
}

fn item_layout(legend: &LegendProps) -> ItemLayout {
    let size = legend.symbol_size;
    let gap = legend.symbol_spacing;
    let (width, height) = (legend.item_width, legend.item_height);
    match legend.item_direction {
        LegendItemDirection::LeftToRight => ItemLayout {
            symbol_x: 0.0,
            symbol_y: (height - size) / 2.0,
            label_x: if legend.justify { width } else { size + gap },
            label_y: height / 2.0,
            label_align: if legend.justify {
                TextHAlign::Right
            } else {
                TextHAlign::Left
            },
            label_v_align: TextVAlign::Middle,
        },
        LegendItemDirection::RightToLeft => ItemLayout {
            symbol_x: width - size,
            symbol_y: (height - size) / 2.0,
            label_x: if legend.justify { 0.0 } else { width - size - gap },
            label_y: height / 2.0,
            label_align: if legend.justify {
                TextHAlign::Left
            } else {
                TextHAlign::Right
            },
            label_v_align: TextVAlign::Middle,
        },
        LegendItemDirection::TopToBottom => ItemLayout {
            symbol_x: (width - size) / 2.0,
            symbol_y: 0.0,
            label_x: width / 2.0,
            label_y: if legend.justify { height } else { size + gap },
            label_align: TextHAlign::Center,
            label_v_align: TextVAlign::Top,
        },
        LegendItemDirection::BottomToTop => ItemLayout {
            symbol_x: (width - size) / 2.0,
            symbol_y: height - size,
            label_x: width / 2.0,
            label_y: if legend.justify { 0.0 } else { height - size - gap },
            label_align: TextHAlign::Center,
            label_v_align: TextVAlign::Alphabetic,
        },
    }
}

fn push_symbol(
    out: &mut LayerPrimitives,
    shape: LegendSymbolShape,
    x: f64,
    y: f64,
    size: f64,
    color: Color,
) {
    let half = size / 2.0;
    match shape {
        LegendSymbolShape::Square => {
            out.push(RectPrimitive::new(x, y, size, size).with_fill(color));
        }
        LegendSymbolShape::Circle => {
            out.push(CirclePrimitive::new(x + half, y + half, half, color));
        }
        LegendSymbolShape::Diamond => {
            let commands = polygon(&[
                (x + half, y),
                (x + size, y + half),
                (x + half, y + size),
                (x, y + half),
            ]);
            out.push(PathPrimitive::filled(commands, color));
        }
        LegendSymbolShape::Triangle => {
            let commands = polygon(&[(x + half, y), (x + size, y + size), (x, y + size)]);
            out.push(PathPrimitive::filled(commands, color));
        }
    }
}

fn polygon(points: &[(f64, f64)]) -> Vec<PathCommand> {
    let mut commands = crate::core::LineGenerator::new(LineCurve::Linear)
        .generate(&points.iter().copied().map(Some).collect::<Vec<_>>());
    commands.push(PathCommand::ClosePath);
    commands
}
