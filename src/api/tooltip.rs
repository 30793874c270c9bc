use std::rc::Rc;

use crate::core::{Axis, Callback, ValueFormat, format_value};
use crate::render::{Color, LayerPrimitives, RectPrimitive, TextHAlign, TextPrimitive};

use super::{Point, Slice, Theme};

/// One row of a table tooltip: a color chip followed by text cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub chip: Color,
    pub cells: Vec<String>,
}

/// Content of a tooltip, independent of how a host displays it.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    Basic { chip: Option<Color>, text: String },
    Table { rows: Vec<TooltipRow> },
}

impl TooltipContent {
    /// Text of the tooltip, one entry per line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Basic { text, .. } => vec![text.clone()],
            Self::Table { rows } => rows.iter().map(|row| row.cells.join("  ")).collect(),
        }
    }

    /// Draws the tooltip as a box anchored at its top-left corner.
    ///
    /// Text width is estimated from the character count, so the box is an
    /// approximation for hosts without native tooltips.
    #[must_use]
    pub fn render(&self, x: f64, y: f64, theme: &Theme) -> LayerPrimitives {
        let style = theme.tooltip;
        let [pad_y, pad_x] = style.padding;
        let line_height = style.font_size * 1.4;
        let chip_size = style.font_size;
        let rows: Vec<(Option<Color>, String)> = match self {
            Self::Basic { chip, text } => vec![(*chip, text.clone())],
            Self::Table { rows } => rows
                .iter()
                .map(|row| (Some(row.chip), row.cells.join("  ")))
                .collect(),
        };
        let has_chips = rows.iter().any(|(chip, _)| chip.is_some());
        let text_x = if has_chips { chip_size + 7.0 } else { 0.0 };
        let widest = rows
            .iter()
            .map(|(_, text)| text.chars().count() as f64 * style.font_size * 0.6)
            .fold(0.0, f64::max);

        let mut out = LayerPrimitives::new();
        let mut frame = RectPrimitive::new(
            x,
            y,
            text_x + widest + 2.0 * pad_x,
            rows.len() as f64 * line_height + 2.0 * pad_y,
        )
        .with_fill(style.background);
        frame.corner_radius = style.corner_radius;
        out.push(frame);

        for (index, (chip, text)) in rows.into_iter().enumerate() {
            let row_middle = y + pad_y + (index as f64 + 0.5) * line_height;
            if let Some(chip) = chip {
                out.push(
                    RectPrimitive::new(x + pad_x, row_middle - chip_size / 2.0, chip_size, chip_size)
                        .with_fill(chip),
                );
            }
            out.push(TextPrimitive::new(
                text,
                x + pad_x + text_x,
                row_middle,
                style.font_size,
                style.text_color,
                TextHAlign::Left,
            ));
        }
        out
    }
}

/// Tooltip with where it should be shown, in outer chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub x: f64,
    pub y: f64,
    pub content: TooltipContent,
}

pub type PointTooltipFn = dyn Fn(&Point) -> TooltipContent;

/// What a slice tooltip is built from.
#[derive(Debug, Clone, Copy)]
pub struct SliceTooltipProps<'a> {
    pub slice: &'a Slice,
    pub axis: Axis,
}

pub type SliceTooltipFn = dyn for<'a> Fn(&SliceTooltipProps<'a>) -> TooltipContent;

#[must_use]
pub fn point_tooltip(render: impl Fn(&Point) -> TooltipContent + 'static) -> Callback<PointTooltipFn> {
    let render: Rc<PointTooltipFn> = Rc::new(render);
    Callback::from_rc(render)
}

#[must_use]
pub fn slice_tooltip(
    render: impl for<'a> Fn(&SliceTooltipProps<'a>) -> TooltipContent + 'static,
) -> Callback<SliceTooltipFn> {
    let render: Rc<SliceTooltipFn> = Rc::new(render);
    Callback::from_rc(render)
}

fn y_text(point: &Point, format: Option<&ValueFormat>) -> String {
    match format {
        Some(format) => format_value(Some(format), &point.data.y),
        None => point.data.y_formatted.clone(),
    }
}

/// `x: <x>, y: <y>` with the series color chip.
#[must_use]
pub fn default_point_tooltip(point: &Point, format: Option<&ValueFormat>) -> TooltipContent {
    TooltipContent::Basic {
        chip: Some(point.serie_color),
        text: format!("x: {}, y: {}", point.data.x_formatted, y_text(point, format)),
    }
}

/// One row per point of the slice: chip, series id and y value.
#[must_use]
pub fn default_slice_tooltip(slice: &Slice, format: Option<&ValueFormat>) -> TooltipContent {
    TooltipContent::Table {
        rows: slice
            .points
            .iter()
            .map(|point| TooltipRow {
                chip: point.serie_color,
                cells: vec![point.serie_id.to_string(), y_text(point, format)],
            })
            .collect(),
    }
}
