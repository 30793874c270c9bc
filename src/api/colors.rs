use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Callback, SerieId};
use crate::render::Color;

use super::Theme;

/// Named categorical palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Nivo,
    Category10,
    Accent,
    Dark2,
    Paired,
    Pastel1,
    Pastel2,
    Set1,
    Set2,
    Set3,
    Tableau10,
}

impl ColorScheme {
    #[must_use]
    pub fn colors(self) -> Vec<Color> {
        let hex: &[u32] = match self {
            Self::Nivo => &[0xe8c1a0, 0xf47560, 0xf1e15b, 0xe8a838, 0x61cdbb, 0x97e3d5],
            Self::Category10 => &[
                0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f,
                0xbcbd22, 0x17becf,
            ],
            Self::Accent => &[
                0x7fc97f, 0xbeaed4, 0xfdc086, 0xffff99, 0x386cb0, 0xf0027f, 0xbf5b17, 0x666666,
            ],
            Self::Dark2 => &[
                0x1b9e77, 0xd95f02, 0x7570b3, 0xe7298a, 0x66a61e, 0xe6ab02, 0xa6761d, 0x666666,
            ],
            Self::Paired => &[
                0xa6cee3, 0x1f78b4, 0xb2df8a, 0x33a02c, 0xfb9a99, 0xe31a1c, 0xfdbf6f, 0xff7f00,
                0xcab2d6, 0x6a3d9a, 0xffff99, 0xb15928,
            ],
            Self::Pastel1 => &[
                0xfbb4ae, 0xb3cde3, 0xccebc5, 0xdecbe4, 0xfed9a6, 0xffffcc, 0xe5d8bd, 0xfddaec,
                0xf2f2f2,
            ],
            Self::Pastel2 => &[
                0xb3e2cd, 0xfdcdac, 0xcbd5e8, 0xf4cae4, 0xe6f5c9, 0xfff2ae, 0xf1e2cc, 0xcccccc,
            ],
            Self::Set1 => &[
                0xe41a1c, 0x377eb8, 0x4daf4a, 0x984ea3, 0xff7f00, 0xffff33, 0xa65628, 0xf781bf,
                0x999999,
            ],
            Self::Set2 => &[
                0x66c2a5, 0xfc8d62, 0x8da0cb, 0xe78ac3, 0xa6d854, 0xffd92f, 0xe5c494, 0xb3b3b3,
            ],
            Self::Set3 => &[
                0x8dd3c7, 0xffffb3, 0xbebada, 0xfb8072, 0x80b1d3, 0xfdb462, 0xb3de69, 0xfccde5,
                0xd9d9d9, 0xbc80bd, 0xccebc5, 0xffed6f,
            ],
            Self::Tableau10 => &[
                0x4e79a7, 0xf28e2c, 0xe15759, 0x76b7b2, 0x59a14f, 0xedc949, 0xaf7aa1, 0xff9da7,
                0x9c755f, 0xbab0ab,
            ],
        };
        hex.iter().copied().map(Color::from_rgb_u32).collect()
    }
}

/// Picks the color of a series from its id and position.
pub type SerieColorFn = dyn Fn(&SerieId, usize) -> Color;

/// How series colors are chosen.
///
/// JSON accepts `{"scheme": "set2"}`, `{"scheme": "set2", "size": 4}`, an
/// array of colors or a single color string.
#[derive(Debug, Clone, PartialEq)]
pub enum OrdinalColorScaleConfig {
    Scheme {
        scheme: ColorScheme,
        /// Only the first `size` colors of the scheme are cycled.
        size: Option<usize>,
    },
    Colors(Vec<Color>),
    Single(Color),
    Custom(Callback<SerieColorFn>),
}

impl Default for OrdinalColorScaleConfig {
    fn default() -> Self {
        Self::Scheme {
            scheme: ColorScheme::Nivo,
            size: None,
        }
    }
}

impl OrdinalColorScaleConfig {
    pub fn custom(pick: impl Fn(&SerieId, usize) -> Color + 'static) -> Self {
        let pick: std::rc::Rc<SerieColorFn> = std::rc::Rc::new(pick);
        Self::Custom(Callback::from_rc(pick))
    }

    /// Colors for `ids`, assigned by first appearance: a repeated id keeps
    /// the color of its first occurrence.
    #[must_use]
    pub fn assign<'a>(&self, ids: impl IntoIterator<Item = &'a SerieId>) -> Vec<Color> {
        let palette = match self {
            Self::Scheme { scheme, size } => {
                let mut colors = scheme.colors();
                if let Some(size) = size.filter(|size| *size > 0) {
                    colors.truncate(size);
                }
                colors
            }
            Self::Colors(colors) if !colors.is_empty() => colors.clone(),
            Self::Colors(_) => ColorScheme::default().colors(),
            Self::Single(color) => vec![*color],
            Self::Custom(pick) => {
                return ids
                    .into_iter()
                    .enumerate()
                    .map(|(index, id)| pick(id, index))
                    .collect();
            }
        };

        let mut assigned: IndexMap<&SerieId, Color> = IndexMap::new();
        ids.into_iter()
            .map(|id| {
                let next = palette[assigned.len() % palette.len()];
                *assigned.entry(id).or_insert(next)
            })
            .collect()
    }
}

impl Serialize for OrdinalColorScaleConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct SchemeRef<'a> {
            scheme: &'a ColorScheme,
            #[serde(skip_serializing_if = "Option::is_none")]
            size: Option<usize>,
        }

        match self {
            Self::Scheme { scheme, size } => SchemeRef {
                scheme,
                size: *size,
            }
            .serialize(serializer),
            Self::Colors(colors) => colors.serialize(serializer),
            Self::Single(color) => color.serialize(serializer),
            Self::Custom(_) => Err(serde::ser::Error::custom(
                "a color function cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for OrdinalColorScaleConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct SchemeRaw {
            scheme: ColorScheme,
            #[serde(default)]
            size: Option<usize>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Scheme(SchemeRaw),
            Colors(Vec<Color>),
            Single(Color),
        }

        match Raw::deserialize(deserializer) {
            Ok(Raw::Scheme(raw)) => Ok(Self::Scheme {
                scheme: raw.scheme,
                size: raw.size,
            }),
            Ok(Raw::Colors(colors)) => Ok(Self::Colors(colors)),
            Ok(Raw::Single(color)) => Ok(Self::Single(color)),
            Err(_) => Err(D::Error::custom(
                "expected {\"scheme\": name}, an array of colors or a color",
            )),
        }
    }
}

/// Adjustment applied to an inherited color, e.g. `["darker", 0.3]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorModifier {
    Darker(f64),
    Brighter(f64),
    Opacity(f64),
}

impl ColorModifier {
    #[must_use]
    pub fn apply(self, color: Color) -> Color {
        match self {
            Self::Darker(amount) => color.darker(amount),
            Self::Brighter(amount) => color.brighter(amount),
            Self::Opacity(alpha) => color.with_alpha(alpha.clamp(0.0, 1.0)),
        }
    }
}

impl Serialize for ColorModifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (name, amount) = match self {
            Self::Darker(amount) => ("darker", amount),
            Self::Brighter(amount) => ("brighter", amount),
            Self::Opacity(amount) => ("opacity", amount),
        };
        (name, amount).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ColorModifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (name, amount) = <(String, f64)>::deserialize(deserializer)?;
        match name.as_str() {
            "darker" => Ok(Self::Darker(amount)),
            "brighter" => Ok(Self::Brighter(amount)),
            "opacity" => Ok(Self::Opacity(amount)),
            other => Err(D::Error::custom(format!("unknown color modifier `{other}`"))),
        }
    }
}

/// Theme entry an inherited color can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeColorKey {
    #[serde(rename = "background")]
    Background,
    #[serde(rename = "grid.line.stroke")]
    GridLine,
    #[serde(rename = "labels.text.fill")]
    LabelsText,
    #[serde(rename = "axis.ticks.text.fill")]
    AxisTicksText,
    #[serde(rename = "markers.lineColor")]
    MarkersLine,
}

/// Derives an element color from the series color it belongs to.
pub type InheritedColorFn = dyn Fn(&SerieId, Color) -> Color;

/// Color of an element that can inherit from its series.
///
/// JSON accepts `{"from": "color", "modifiers": [["darker", 0.3]]}`,
/// `{"theme": "background"}` or a plain color string.
#[derive(Debug, Clone, PartialEq)]
pub enum InheritedColor {
    /// The series color (`"color"` and `"serieColor"` are synonyms).
    FromSerie { modifiers: Vec<ColorModifier> },
    Theme(ThemeColorKey),
    Static(Color),
    Custom(Callback<InheritedColorFn>),
}

impl InheritedColor {
    #[must_use]
    pub fn from_serie() -> Self {
        Self::FromSerie {
            modifiers: Vec::new(),
        }
    }

    pub fn custom(derive: impl Fn(&SerieId, Color) -> Color + 'static) -> Self {
        let derive: std::rc::Rc<InheritedColorFn> = std::rc::Rc::new(derive);
        Self::Custom(Callback::from_rc(derive))
    }

    #[must_use]
    pub fn resolve(&self, serie_id: &SerieId, serie_color: Color, theme: &Theme) -> Color {
        match self {
            Self::FromSerie { modifiers } => modifiers
                .iter()
                .fold(serie_color, |color, modifier| modifier.apply(color)),
            Self::Theme(key) => theme.color(*key),
            Self::Static(color) => *color,
            Self::Custom(derive) => derive(serie_id, serie_color),
        }
    }
}

impl Serialize for InheritedColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct FromRef<'a> {
            from: &'static str,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            modifiers: &'a Vec<ColorModifier>,
        }

        #[derive(Serialize)]
        struct ThemeRef<'a> {
            theme: &'a ThemeColorKey,
        }

        match self {
            Self::FromSerie { modifiers } => FromRef {
                from: "color",
                modifiers,
            }
            .serialize(serializer),
            Self::Theme(theme) => ThemeRef { theme }.serialize(serializer),
            Self::Static(color) => color.serialize(serializer),
            Self::Custom(_) => Err(serde::ser::Error::custom(
                "a color function cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for InheritedColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct FromRaw {
            from: String,
            #[serde(default)]
            modifiers: Vec<ColorModifier>,
        }

        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ThemeRaw {
            theme: ThemeColorKey,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            From(FromRaw),
            Theme(ThemeRaw),
            Static(Color),
        }

        match Raw::deserialize(deserializer) {
            Ok(Raw::From(raw)) => match raw.from.as_str() {
                "color" | "serieColor" => Ok(Self::FromSerie {
                    modifiers: raw.modifiers,
                }),
                other => Err(D::Error::custom(format!(
                    "cannot inherit a color from `{other}`"
                ))),
            },
            Ok(Raw::Theme(raw)) => Ok(Self::Theme(raw.theme)),
            Ok(Raw::Static(color)) => Ok(Self::Static(color)),
            Err(_) => Err(D::Error::custom(
                "expected {\"from\": \"color\"}, {\"theme\": key} or a color",
            )),
        }
    }
}
