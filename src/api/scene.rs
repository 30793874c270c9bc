use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use ordered_float::OrderedFloat;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use crate::core::series::{
    compute_series_data, stack_y_values, x_domain_values, y_domain_values,
};
use crate::core::{
    Axis, Callback, ComputedDatum, DatumValue, Dimensions, InnerDimensions, LineGenerator, Scale,
    Serie, SerieId, format_value,
};
use crate::error::ChartResult;
use crate::render::{Color, Primitive};

use super::LineCommonProps;

/// Series after scale placement, with its resolved color.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedSerie {
    pub id: SerieId,
    pub color: Color,
    pub data: Vec<ComputedDatum>,
}

impl ComputedSerie {
    /// Pixel positions in data order; `None` breaks the line.
    #[must_use]
    pub fn positions(&self) -> Vec<Option<(f64, f64)>> {
        self.data
            .iter()
            .map(|datum| datum.position.map(|position| (position.x, position.y)))
            .collect()
    }
}

/// Raw and formatted values carried by a point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    pub x: DatumValue,
    pub x_formatted: String,
    pub y: DatumValue,
    pub y_formatted: String,
    pub y_stacked: Option<f64>,
}

/// A drawable datum.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// `"<serie id>.<index in serie>"`.
    pub id: String,
    /// Position in the chart-wide point list.
    pub index: usize,
    pub serie_id: SerieId,
    pub serie_color: Color,
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub border_color: Color,
    pub data: PointData,
}

/// Points sharing one x (or y) pixel, with the band of the inner area that
/// hovers them.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Pixel coordinate the points share.
    pub id: f64,
    pub x0: f64,
    pub x: f64,
    pub y0: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub points: Vec<Point>,
}

/// Inputs handed to a custom point symbol.
#[derive(Debug, Clone, Copy)]
pub struct PointSymbolProps<'a> {
    pub point: &'a Point,
    pub size: f64,
    pub color: Color,
    pub border_width: f64,
    pub border_color: Color,
}

/// Draws a point symbol centered on the origin; the chart moves it onto
/// the point.
pub type PointSymbolFn = dyn for<'a> Fn(&PointSymbolProps<'a>) -> Vec<Primitive>;

/// Field of a point shown as its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointLabelField {
    X,
    XFormatted,
    Y,
    #[default]
    YFormatted,
    SerieId,
}

impl PointLabelField {
    fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::XFormatted => "xFormatted",
            Self::Y => "y",
            Self::YFormatted => "yFormatted",
            Self::SerieId => "serieId",
        }
    }
}

pub type PointLabelFn = dyn Fn(&Point) -> String;

/// Text drawn next to each point when point labels are enabled.
///
/// JSON accepts a field name such as `"yFormatted"` or `"data.x"`.
#[derive(Debug, Clone, PartialEq)]
pub enum PointLabel {
    Field(PointLabelField),
    Custom(Callback<PointLabelFn>),
}

impl Default for PointLabel {
    fn default() -> Self {
        Self::Field(PointLabelField::YFormatted)
    }
}

impl PointLabel {
    pub fn custom(label: impl Fn(&Point) -> String + 'static) -> Self {
        let label: Rc<PointLabelFn> = Rc::new(label);
        Self::Custom(Callback::from_rc(label))
    }

    #[must_use]
    pub fn text(&self, point: &Point) -> String {
        match self {
            Self::Field(PointLabelField::X) => point.data.x.to_string(),
            Self::Field(PointLabelField::XFormatted) => point.data.x_formatted.clone(),
            Self::Field(PointLabelField::Y) => point.data.y.to_string(),
            Self::Field(PointLabelField::YFormatted) => point.data.y_formatted.clone(),
            Self::Field(PointLabelField::SerieId) => point.serie_id.to_string(),
            Self::Custom(label) => label(point),
        }
    }
}

impl Serialize for PointLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(field) => serializer.serialize_str(field.name()),
            Self::Custom(_) => Err(serde::ser::Error::custom(
                "a label function cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for PointLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        let field = name.strip_prefix("data.").unwrap_or(&name);
        [
            PointLabelField::X,
            PointLabelField::XFormatted,
            PointLabelField::Y,
            PointLabelField::YFormatted,
            PointLabelField::SerieId,
        ]
        .into_iter()
        .find(|candidate| candidate.name() == field)
        .map(Self::Field)
        .ok_or_else(|| D::Error::custom(format!("`{name}` is not a point field")))
    }
}

/// Everything the layers draw from, computed once per render.
#[derive(Debug, Clone)]
pub struct LineScene {
    pub dimensions: Dimensions,
    pub inner: InnerDimensions,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub series: Vec<ComputedSerie>,
    pub points: Vec<Point>,
    pub slices: Vec<Slice>,
    pub line_generator: LineGenerator,
    /// Pixel y of the area baseline value.
    pub area_baseline: f64,
}

impl LineScene {
    /// Places `data` on the configured scales inside `dimensions`.
    ///
    /// Series with an empty id are skipped; datums that cannot be placed keep
    /// their index but produce no point.
    pub fn compute(
        data: &[Serie],
        props: &LineCommonProps,
        dimensions: Dimensions,
    ) -> ChartResult<Self> {
        let inner = dimensions.inner(props.margin);
        let owned: Vec<Serie> = data
            .iter()
            .filter(|serie| !serie.id.is_empty())
            .cloned()
            .collect();

        let stacked = props.y_scale.is_stacked().then(|| stack_y_values(&owned));
        let x_scale = Scale::compute(&props.x_scale, &x_domain_values(&owned), (0.0, inner.width))?;
        let y_scale = Scale::compute(
            &props.y_scale,
            &y_domain_values(&owned, stacked.as_deref()),
            (inner.height, 0.0),
        )?;

        let computed = compute_series_data(&owned, &x_scale, &y_scale, stacked.as_deref());
        let colors = props.colors.assign(owned.iter().map(|serie| &serie.id));
        let series: Vec<ComputedSerie> = owned
            .into_iter()
            .zip(computed)
            .zip(colors)
            .map(|((serie, data), color)| ComputedSerie {
                id: serie.id,
                color,
                data,
            })
            .collect();

        let points = compute_points(&series, props);
        let slices = match props.enable_slices.axis() {
            Some(axis) => compute_slices(&points, axis, inner),
            None => Vec::new(),
        };
        let area_baseline = y_scale
            .map(&props.area_baseline_value)
            .unwrap_or(inner.height);

        debug!(
            series = series.len(),
            points = points.len(),
            slices = slices.len(),
            "computed line scene"
        );

        Ok(Self {
            dimensions,
            inner,
            x_scale,
            y_scale,
            series,
            points,
            slices,
            line_generator: LineGenerator::new(props.curve),
            area_baseline,
        })
    }

    #[must_use]
    pub fn point(&self, id: &str) -> Option<&Point> {
        self.points.iter().find(|point| point.id == id)
    }
}

/// Flattens series into points, last series first so earlier series are
/// drawn on top.
///
/// Point ids are `<serie>.<index>`; a repeated series id gets an occurrence
/// suffix (`<serie>#1.<index>`) so ids stay unique.
fn compute_points(series: &[ComputedSerie], props: &LineCommonProps) -> Vec<Point> {
    let mut seen: HashMap<&SerieId, usize> = HashMap::new();
    let prefixes: Vec<String> = series
        .iter()
        .map(|serie| {
            let occurrence = seen.entry(&serie.id).or_insert(0);
            let prefix = match *occurrence {
                0 => serie.id.to_string(),
                n => format!("{}#{n}", serie.id),
            };
            *occurrence += 1;
            prefix
        })
        .collect();

    let mut points = Vec::new();
    for (serie, prefix) in series.iter().zip(&prefixes).rev() {
        for datum in &serie.data {
            let Some(position) = datum.position else {
                continue;
            };
            let color = props.point_color.resolve(&serie.id, serie.color, &props.theme);
            let border_color = props
                .point_border_color
                .resolve(&serie.id, serie.color, &props.theme);
            points.push(Point {
                id: format!("{prefix}.{}", datum.index),
                index: points.len(),
                serie_id: serie.id.clone(),
                serie_color: serie.color,
                x: position.x,
                y: position.y,
                color,
                border_color,
                data: PointData {
                    x: datum.data.x.clone(),
                    x_formatted: format_value(props.x_format.as_ref(), &datum.data.x),
                    y: datum.data.y.clone(),
                    y_formatted: format_value(props.y_format.as_ref(), &datum.data.y),
                    y_stacked: datum.y_stacked,
                },
            });
        }
    }
    trace!(count = points.len(), "computed points");
    points
}

/// Groups points sharing a pixel coordinate on `axis` into hover bands.
///
/// Bands meet halfway between neighbours; the first starts at its own
/// coordinate and the last runs to the edge of the inner area. Bands are
/// clipped to the inner area and columns lying outside it get no slice.
#[must_use]
pub fn compute_slices(points: &[Point], axis: Axis, inner: InnerDimensions) -> Vec<Slice> {
    let mut groups: BTreeMap<OrderedFloat<f64>, Vec<Point>> = BTreeMap::new();
    for point in points {
        let key = match axis {
            Axis::X => point.x,
            Axis::Y => point.y,
        };
        groups.entry(OrderedFloat(key)).or_default().push(point.clone());
    }

    let coordinates: Vec<f64> = groups.keys().map(|key| key.0).collect();
    let extent = match axis {
        Axis::X => inner.width,
        Axis::Y => inner.height,
    };

    groups
        .into_values()
        .enumerate()
        .filter_map(|(index, mut slice_points)| {
            let coordinate = coordinates[index];
            if !(0.0..=extent).contains(&coordinate) {
                trace!(coordinate, extent, "slice column outside the inner area");
                return None;
            }
            let start = match index.checked_sub(1).map(|previous| coordinates[previous]) {
                Some(previous) => coordinate - (coordinate - previous) / 2.0,
                None => coordinate,
            };
            let end = match coordinates.get(index + 1) {
                Some(next) => coordinate + (next - coordinate) / 2.0,
                None => extent,
            };
            let start = start.clamp(0.0, extent);
            let length = end.clamp(0.0, extent) - start;
            slice_points.reverse();
            Some(match axis {
                Axis::X => Slice {
                    id: coordinate,
                    x0: start,
                    x: coordinate,
                    y0: 0.0,
                    y: 0.0,
                    width: length,
                    height: inner.height,
                    points: slice_points,
                },
                Axis::Y => Slice {
                    id: coordinate,
                    x0: 0.0,
                    x: 0.0,
                    y0: start,
                    y: coordinate,
                    width: inner.width,
                    height: length,
                    points: slice_points,
                },
            })
        })
        .collect()
}
