use serde::{Deserialize, Serialize};

use crate::render::{Color, LinePrimitive, Stroke, TextHAlign, TextPrimitive};

use super::ThemeColorKey;

const TEXT_COLOR: Color = Color::from_rgb_u32(0x333333);

/// Font size and fill of one family of labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f64,
    pub fill: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            fill: TEXT_COLOR,
        }
    }
}

impl TextStyle {
    #[must_use]
    pub fn text(self, text: impl Into<String>, x: f64, y: f64, h_align: TextHAlign) -> TextPrimitive {
        TextPrimitive::new(text, x, y, self.font_size, self.fill, h_align)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineStyle {
    pub stroke: Color,
    pub stroke_width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            stroke: Color::from_rgb_u32(0x777777),
            stroke_width: 1.0,
        }
    }
}

impl LineStyle {
    #[must_use]
    pub fn stroke(self) -> Stroke {
        Stroke::new(self.stroke, self.stroke_width)
    }

    #[must_use]
    pub fn line(self, x1: f64, y1: f64, x2: f64, y2: f64) -> LinePrimitive {
        LinePrimitive::new(x1, y1, x2, y2, self.stroke_width, self.stroke)
    }

    /// Nothing is drawn for invisible strokes.
    #[must_use]
    pub fn is_visible(self) -> bool {
        self.stroke_width > 0.0 && self.stroke.alpha > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LineElementTheme {
    pub line: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TextElementTheme {
    pub text: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AxisTicksTheme {
    pub line: LineStyle,
    pub text: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisTheme {
    pub domain: LineElementTheme,
    pub ticks: AxisTicksTheme,
    pub legend: TextElementTheme,
}

impl Default for AxisTheme {
    fn default() -> Self {
        Self {
            domain: LineElementTheme {
                line: LineStyle {
                    stroke: Color::TRANSPARENT,
                    stroke_width: 1.0,
                },
            },
            ticks: AxisTicksTheme::default(),
            legend: TextElementTheme {
                text: TextStyle {
                    font_size: 12.0,
                    fill: TEXT_COLOR,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTheme {
    pub line: LineStyle,
}

impl Default for GridTheme {
    fn default() -> Self {
        Self {
            line: LineStyle {
                stroke: Color::from_rgb_u32(0xdddddd),
                stroke_width: 1.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkersTheme {
    pub line_color: Color,
    pub line_stroke_width: f64,
    pub text: TextStyle,
}

impl Default for MarkersTheme {
    fn default() -> Self {
        Self {
            line_color: Color::BLACK,
            line_stroke_width: 1.0,
            text: TextStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrosshairLineStyle {
    pub stroke: Color,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    /// Dash on/off lengths; `None` draws a solid line.
    pub stroke_dasharray: Option<[f64; 2]>,
}

impl Default for CrosshairLineStyle {
    fn default() -> Self {
        Self {
            stroke: Color::BLACK,
            stroke_width: 1.0,
            stroke_opacity: 0.75,
            stroke_dasharray: Some([6.0, 6.0]),
        }
    }
}

impl CrosshairLineStyle {
    #[must_use]
    pub fn line(self, x1: f64, y1: f64, x2: f64, y2: f64) -> LinePrimitive {
        let color = self
            .stroke
            .with_alpha(self.stroke.alpha * self.stroke_opacity.clamp(0.0, 1.0));
        let line = LinePrimitive::new(x1, y1, x2, y2, self.stroke_width, color);
        match self.stroke_dasharray {
            Some([on, off]) => line.dashed(on, off),
            None => line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CrosshairTheme {
    pub line: CrosshairLineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipTheme {
    pub background: Color,
    pub text_color: Color,
    pub font_size: f64,
    pub corner_radius: f64,
    /// Vertical and horizontal padding.
    pub padding: [f64; 2],
}

impl Default for TooltipTheme {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            text_color: TEXT_COLOR,
            font_size: 11.0,
            corner_radius: 2.0,
            padding: [5.0, 9.0],
        }
    }
}

/// Visual theme of a chart.
///
/// Every level deserializes with defaults, so a partial theme such as
/// `{"grid": {"line": {"stroke": "#eee"}}}` only replaces what it names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    pub text: TextStyle,
    pub axis: AxisTheme,
    pub grid: GridTheme,
    pub legends: TextElementTheme,
    pub labels: TextElementTheme,
    pub markers: MarkersTheme,
    pub dots: TextElementTheme,
    pub crosshair: CrosshairTheme,
    pub tooltip: TooltipTheme,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::TRANSPARENT,
            text: TextStyle::default(),
            axis: AxisTheme::default(),
            grid: GridTheme::default(),
            legends: TextElementTheme::default(),
            labels: TextElementTheme::default(),
            markers: MarkersTheme::default(),
            dots: TextElementTheme::default(),
            crosshair: CrosshairTheme::default(),
            tooltip: TooltipTheme::default(),
        }
    }
}

impl Theme {
    #[must_use]
    pub fn color(&self, key: ThemeColorKey) -> Color {
        match key {
            ThemeColorKey::Background => self.background,
            ThemeColorKey::GridLine => self.grid.line.stroke,
            ThemeColorKey::LabelsText => self.labels.text.fill,
            ThemeColorKey::AxisTicksText => self.axis.ticks.text.fill,
            ThemeColorKey::MarkersLine => self.markers.line_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;
    use crate::render::Color;

    #[test]
    fn partial_theme_keeps_unnamed_defaults() {
        let theme: Theme =
            serde_json::from_str(r##"{"grid": {"line": {"stroke": "#eeeeee"}}, "background": "#ffffff"}"##)
                .expect("theme");
        let defaults = Theme::default();
        assert_eq!(theme.grid.line.stroke, Color::from_rgb_u32(0xeeeeee));
        assert_eq!(theme.grid.line.stroke_width, defaults.grid.line.stroke_width);
        assert_eq!(theme.axis, defaults.axis);
        assert_eq!(theme.background, Color::WHITE);
    }

    #[test]
    fn axis_domain_is_hidden_by_default() {
        assert!(!Theme::default().axis.domain.line.is_visible());
        assert!(Theme::default().axis.ticks.line.is_visible());
    }
}
