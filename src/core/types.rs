use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64};
use crate::error::ChartResult;

/// Outer pixel size of a chart, as reported by the host container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A container of zero width or height is not ready to render yet.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[must_use]
    pub fn inner(self, margin: Margin) -> InnerDimensions {
        InnerDimensions {
            width: f64::from(self.width) - margin.left - margin.right,
            height: f64::from(self.height) - margin.top - margin.bottom,
        }
    }
}

/// Margin box around the inner drawing area.
///
/// Missing sides deserialize to `0`, so `{"left": 60}` keeps the other sides.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
            && self.left.is_finite()
    }
}

/// Drawing area left once margins are subtracted from the outer dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InnerDimensions {
    pub width: f64,
    pub height: f64,
}

impl InnerDimensions {
    #[must_use]
    pub fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Raw x/y value of a datum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatumValue {
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl DatumValue {
    pub fn from_decimal(value: Decimal) -> ChartResult<Self> {
        Ok(Self::Number(decimal_to_f64(value, "datum value")?))
    }

    /// Numeric projection used by continuous scales; dates map to unix seconds.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Date(time) => Some(datetime_to_unix_seconds(*time)),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(time) => Some(*time),
            _ => None,
        }
    }
}

impl fmt::Display for DatumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Date(time) => write!(f, "{}", time.format("%Y-%m-%dT%H:%M:%SZ")),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for DatumValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for DatumValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for DatumValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for DatumValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for DatumValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// One raw input point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub x: DatumValue,
    pub y: DatumValue,
}

impl Datum {
    #[must_use]
    pub fn new(x: impl Into<DatumValue>, y: impl Into<DatumValue>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn from_decimal_time(time: DateTime<Utc>, value: Decimal) -> ChartResult<Self> {
        Ok(Self {
            x: DatumValue::Date(time),
            y: DatumValue::from_decimal(value)?,
        })
    }
}

/// Series identifier, either textual or numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerieId {
    Number(i64),
    Text(String),
}

impl SerieId {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for SerieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for SerieId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SerieId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SerieId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Named, ordered collection of points plotted as one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serie {
    pub id: SerieId,
    pub data: Vec<Datum>,
}

impl Serie {
    #[must_use]
    pub fn new(id: impl Into<SerieId>, data: Vec<Datum>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}
