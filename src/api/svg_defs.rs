use serde::{Deserialize, Serialize};

use crate::core::SerieId;
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, in percent.
    pub offset: f64,
    pub color: Color,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

/// Reusable paint definition referenced by fill rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SvgDef {
    #[serde(rename_all = "camelCase")]
    LinearGradient { id: String, colors: Vec<GradientStop> },
    #[serde(rename_all = "camelCase")]
    PatternDots {
        id: String,
        #[serde(default = "pattern_background")]
        background: Color,
        #[serde(default = "pattern_foreground")]
        color: Color,
        #[serde(default = "default_dot_size")]
        size: f64,
        #[serde(default = "default_dot_padding")]
        padding: f64,
        #[serde(default)]
        stagger: bool,
    },
    #[serde(rename_all = "camelCase")]
    PatternLines {
        id: String,
        #[serde(default = "default_line_spacing")]
        spacing: f64,
        #[serde(default = "default_line_rotation")]
        rotation: f64,
        #[serde(default = "default_pattern_line_width")]
        line_width: f64,
        #[serde(default = "pattern_background")]
        background: Color,
        #[serde(default = "pattern_foreground")]
        color: Color,
    },
}

fn pattern_background() -> Color {
    Color::WHITE
}

fn pattern_foreground() -> Color {
    Color::BLACK
}

fn default_dot_size() -> f64 {
    4.0
}

fn default_dot_padding() -> f64 {
    4.0
}

fn default_line_spacing() -> f64 {
    5.0
}

fn default_line_rotation() -> f64 {
    0.0
}

fn default_pattern_line_width() -> f64 {
    2.0
}

impl SvgDef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::LinearGradient { id, .. }
            | Self::PatternDots { id, .. }
            | Self::PatternLines { id, .. } => id,
        }
    }

    /// Flat color standing in for the definition on backends without
    /// gradient or pattern paint: the first gradient stop or the pattern ink.
    #[must_use]
    pub fn representative_color(&self) -> Option<Color> {
        match self {
            Self::LinearGradient { colors, .. } => colors
                .first()
                .map(|stop| stop.color.with_alpha(stop.color.alpha * stop.opacity)),
            Self::PatternDots { color, .. } | Self::PatternLines { color, .. } => Some(*color),
        }
    }
}

/// Which series a fill rule applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillMatch {
    /// `"*"` matches every series.
    Any(String),
    Serie { id: SerieId },
}

impl FillMatch {
    #[must_use]
    pub fn matches(&self, serie_id: &SerieId) -> bool {
        match self {
            Self::Any(pattern) => pattern == "*",
            Self::Serie { id } => id == serie_id,
        }
    }
}

/// Assigns a definition to the areas of matching series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgFillRule {
    #[serde(rename = "match")]
    pub matcher: FillMatch,
    /// Id of the [`SvgDef`] to paint with.
    pub id: String,
}

/// Definition applying to `serie_id`: the first matching rule whose id names
/// a known definition wins.
#[must_use]
pub fn fill_for<'a>(defs: &'a [SvgDef], rules: &[SvgFillRule], serie_id: &SerieId) -> Option<&'a SvgDef> {
    rules
        .iter()
        .filter(|rule| rule.matcher.matches(serie_id))
        .find_map(|rule| defs.iter().find(|def| def.id() == rule.id))
}
