use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::primitives::{
    datetime_to_unix_seconds, parse_datetime, unix_seconds_to_datetime,
};
use crate::core::ticks::{DEFAULT_TICK_COUNT, TicksSpec, nice_domain, nice_ticks};
use crate::core::DatumValue;
use crate::error::{ChartError, ChartResult};

/// Chart axis a scale, marker or slice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Domain bound of a continuous scale: explicit, or derived from data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScaleBound {
    #[default]
    Auto,
    Value(f64),
}

impl ScaleBound {
    fn resolve(self, observed: Option<f64>, fallback: f64) -> f64 {
        match self {
            Self::Value(value) => value,
            Self::Auto => observed.unwrap_or(fallback),
        }
    }

    fn validate(self, field: &str) -> ChartResult<()> {
        match self {
            Self::Value(value) if !value.is_finite() => Err(ChartError::config(
                field,
                "explicit scale bound must be finite",
            )),
            _ => Ok(()),
        }
    }
}

impl Serialize for ScaleBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::Value(value) => serializer.serialize_f64(*value),
        }
    }
}

impl<'de> Deserialize<'de> for ScaleBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Value(f64),
            Keyword(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Value(value) => Ok(Self::Value(value)),
            Raw::Keyword(keyword) if keyword == "auto" => Ok(Self::Auto),
            Raw::Keyword(other) => Err(D::Error::custom(format!(
                "expected a number or \"auto\", got \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinearScaleSpec {
    pub min: ScaleBound,
    pub max: ScaleBound,
    pub stacked: bool,
    pub reverse: bool,
    pub clamp: bool,
    pub nice: bool,
}

impl Default for LinearScaleSpec {
    fn default() -> Self {
        Self {
            min: ScaleBound::Value(0.0),
            max: ScaleBound::Auto,
            stacked: false,
            reverse: false,
            clamp: false,
            nice: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogScaleSpec {
    pub base: f64,
    pub min: ScaleBound,
    pub max: ScaleBound,
    pub reverse: bool,
}

impl Default for LogScaleSpec {
    fn default() -> Self {
        Self {
            base: 10.0,
            min: ScaleBound::Auto,
            max: ScaleBound::Auto,
            reverse: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointScaleSpec {}

/// Truncation applied to time values before they are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePrecision {
    #[default]
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeScaleSpec {
    /// `"native"` expects dates (or unix seconds); any other value is an
    /// strftime pattern used to parse textual x values.
    pub format: String,
    pub precision: TimePrecision,
    pub min: ScaleBound,
    pub max: ScaleBound,
    pub nice: bool,
}

impl Default for TimeScaleSpec {
    fn default() -> Self {
        Self {
            format: "native".to_owned(),
            precision: TimePrecision::Millisecond,
            min: ScaleBound::Auto,
            max: ScaleBound::Auto,
            nice: false,
        }
    }
}

/// Declarative description of how data values map to pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScaleSpec {
    Linear(LinearScaleSpec),
    Log(LogScaleSpec),
    Point(PointScaleSpec),
    Time(TimeScaleSpec),
}

impl ScaleSpec {
    #[must_use]
    pub fn point() -> Self {
        Self::Point(PointScaleSpec {})
    }

    #[must_use]
    pub fn linear() -> Self {
        Self::Linear(LinearScaleSpec::default())
    }

    #[must_use]
    pub fn linear_range(min: ScaleBound, max: ScaleBound) -> Self {
        Self::Linear(LinearScaleSpec {
            min,
            max,
            ..LinearScaleSpec::default()
        })
    }

    #[must_use]
    pub fn is_stacked(&self) -> bool {
        matches!(self, Self::Linear(spec) if spec.stacked)
    }
}

/// Hashable identity of a datum value, used for ordinal domains and stacking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum DomainKey {
    Number(OrderedFloat<f64>),
    Date(i64),
    Text(String),
}

impl From<&DatumValue> for DomainKey {
    fn from(value: &DatumValue) -> Self {
        match value {
            DatumValue::Number(number) => Self::Number(OrderedFloat(*number)),
            DatumValue::Date(time) => Self::Date(time.timestamp_millis()),
            DatumValue::Text(text) => Self::Text(text.clone()),
        }
    }
}

/// Continuous linear mapping from a numeric domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start: 0.0,
            range_end: 1.0,
            clamp: false,
        })
    }

    #[must_use]
    pub fn with_range(mut self, range_start: f64, range_end: f64) -> Self {
        self.range_start = range_start;
        self.range_end = range_end;
        self
    }

    #[must_use]
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Degenerate domains place every value at the middle of the range.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        if span == 0.0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let mut normalized = (value - self.domain_start) / span;
        if self.clamp {
            normalized = normalized.clamp(0.0, 1.0);
        }
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> Option<f64> {
        let span = self.range_end - self.range_start;
        if span == 0.0 || !pixel.is_finite() {
            return None;
        }
        let normalized = (pixel - self.range_start) / span;
        Some(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }

    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain_start, self.domain_end, count)
    }
}

/// Logarithmic mapping; values with a sign opposite to the domain are unmappable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogScale {
    base: f64,
    linear: LinearScale,
    negative: bool,
}

impl LogScale {
    pub fn new(base: f64, domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !base.is_finite() || base <= 0.0 || base == 1.0 {
            return Err(ChartError::config("base", "log base must be finite, > 0 and != 1"));
        }
        if domain_start == 0.0
            || domain_end == 0.0
            || (domain_start < 0.0) != (domain_end < 0.0)
        {
            return Err(ChartError::InvalidData(
                "a log scale domain must be strictly-positive or strictly-negative".to_owned(),
            ));
        }
        let negative = domain_start < 0.0;
        let linear = LinearScale::new(
            log_abs(domain_start, base),
            log_abs(domain_end, base),
        )?;
        Ok(Self {
            base,
            linear,
            negative,
        })
    }

    #[must_use]
    pub fn with_range(mut self, range_start: f64, range_end: f64) -> Self {
        self.linear = self.linear.with_range(range_start, range_end);
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        let (start, end) = self.linear.domain();
        let sign = if self.negative { -1.0 } else { 1.0 };
        (sign * self.base.powf(start), sign * self.base.powf(end))
    }

    #[must_use]
    pub fn map(self, value: f64) -> Option<f64> {
        if value == 0.0 || (value < 0.0) != self.negative {
            return None;
        }
        Some(self.linear.map(log_abs(value, self.base)))
    }

    /// Whole powers of the base inside the domain.
    #[must_use]
    pub fn ticks(self) -> Vec<f64> {
        let (start, end) = self.linear.domain();
        let (low, high) = (start.min(end).floor() as i32, start.max(end).ceil() as i32);
        let sign = if self.negative { -1.0 } else { 1.0 };
        let (domain_low, domain_high) = {
            let (a, b) = self.domain();
            (a.min(b), a.max(b))
        };
        (low..=high)
            .map(|exponent| sign * self.base.powi(exponent))
            .filter(|value| *value >= domain_low && *value <= domain_high)
            .collect()
    }
}

fn log_abs(value: f64, base: f64) -> f64 {
    value.abs().ln() / base.ln()
}

/// Ordinal placement of distinct values at evenly spaced positions.
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    domain: IndexMap<DomainKey, DatumValue>,
    range_start: f64,
    range_end: f64,
}

impl PointScale {
    #[must_use]
    pub fn new<'a>(values: impl IntoIterator<Item = &'a DatumValue>) -> Self {
        let mut domain = IndexMap::new();
        for value in values {
            domain
                .entry(DomainKey::from(value))
                .or_insert_with(|| value.clone());
        }
        Self {
            domain,
            range_start: 0.0,
            range_end: 1.0,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range_start: f64, range_end: f64) -> Self {
        self.range_start = range_start;
        self.range_end = range_end;
        self
    }

    #[must_use]
    pub fn domain(&self) -> Vec<DatumValue> {
        self.domain.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Distance between two adjacent domain positions.
    #[must_use]
    pub fn step(&self) -> f64 {
        let n = self.domain.len();
        (self.range_end - self.range_start) / (n.saturating_sub(1)).max(1) as f64
    }

    #[must_use]
    pub fn map(&self, value: &DatumValue) -> Option<f64> {
        let index = self.domain.get_index_of(&DomainKey::from(value))?;
        if self.domain.len() == 1 {
            return Some((self.range_start + self.range_end) / 2.0);
        }
        Some(self.range_start + self.step() * index as f64)
    }
}

/// Linear placement of dates, truncated to a precision.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScale {
    linear: LinearScale,
    precision: TimePrecision,
    format: Option<String>,
}

impl TimeScale {
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.linear.domain()
    }

    #[must_use]
    pub fn precision(&self) -> TimePrecision {
        self.precision
    }

    /// Seconds since the epoch for a value, truncated to the scale precision.
    #[must_use]
    pub fn seconds_of(&self, value: &DatumValue) -> Option<f64> {
        time_seconds(value, self.format.as_deref(), self.precision)
    }

    #[must_use]
    pub fn map(&self, value: &DatumValue) -> Option<f64> {
        self.seconds_of(value).map(|seconds| self.linear.map(seconds))
    }
}

fn time_seconds(value: &DatumValue, format: Option<&str>, precision: TimePrecision) -> Option<f64> {
    let seconds = match value {
        DatumValue::Date(time) => datetime_to_unix_seconds(*time),
        DatumValue::Number(seconds) => *seconds,
        DatumValue::Text(text) => datetime_to_unix_seconds(parse_datetime(text, format?)?),
    };
    truncate_seconds(seconds, precision)
}

fn truncate_seconds(seconds: f64, precision: TimePrecision) -> Option<f64> {
    if !seconds.is_finite() {
        return None;
    }
    let floor_to = |unit: f64| (seconds / unit).floor() * unit;
    let truncated = match precision {
        TimePrecision::Millisecond => seconds,
        TimePrecision::Second => floor_to(1.0),
        TimePrecision::Minute => floor_to(60.0),
        TimePrecision::Hour => floor_to(3_600.0),
        TimePrecision::Day => floor_to(86_400.0),
        TimePrecision::Month | TimePrecision::Year => {
            let time = unix_seconds_to_datetime(seconds)?;
            let month = if precision == TimePrecision::Month {
                time.month()
            } else {
                1
            };
            let date = NaiveDate::from_ymd_opt(time.year(), month, 1)?;
            datetime_to_unix_seconds(date.and_hms_opt(0, 0, 0)?.and_utc())
        }
    };
    Some(truncated)
}

/// Resolved data-to-pixel mapping for one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    Linear(LinearScale),
    Log(LogScale),
    Point(PointScale),
    Time(TimeScale),
}

impl Scale {
    /// Computes a scale from its spec, the axis values and the pixel range.
    ///
    /// `values` are the raw values for the axis (stacked sums for stacked
    /// linear scales). Unmappable values are ignored when deriving `auto`
    /// bounds.
    pub fn compute(
        spec: &ScaleSpec,
        values: &[DatumValue],
        range: (f64, f64),
    ) -> ChartResult<Self> {
        match spec {
            ScaleSpec::Linear(spec) => {
                spec.min.validate("min")?;
                spec.max.validate("max")?;
                let (observed_min, observed_max) =
                    numeric_extent(values.iter().filter_map(DatumValue::as_f64));
                let min = spec.min.resolve(observed_min, 0.0);
                let max = spec.max.resolve(observed_max, min);
                let (min, max) = if spec.nice {
                    nice_domain(min, max, DEFAULT_TICK_COUNT)
                } else {
                    (min, max)
                };
                let (start, end) = oriented_range(range, spec.reverse);
                Ok(Self::Linear(
                    LinearScale::new(min, max)?
                        .with_range(start, end)
                        .with_clamp(spec.clamp),
                ))
            }
            ScaleSpec::Log(spec) => {
                spec.min.validate("min")?;
                spec.max.validate("max")?;
                let (observed_min, observed_max) = numeric_extent(
                    values
                        .iter()
                        .filter_map(DatumValue::as_f64)
                        .filter(|value| *value != 0.0),
                );
                let min = spec.min.resolve(observed_min, 1.0);
                let max = spec.max.resolve(observed_max, spec.base);
                let (start, end) = oriented_range(range, spec.reverse);
                Ok(Self::Log(
                    LogScale::new(spec.base, min, max)?.with_range(start, end),
                ))
            }
            ScaleSpec::Point(_) => Ok(Self::Point(
                PointScale::new(values).with_range(range.0, range.1),
            )),
            ScaleSpec::Time(spec) => {
                spec.min.validate("min")?;
                spec.max.validate("max")?;
                let format = (spec.format != "native").then(|| spec.format.clone());
                let (observed_min, observed_max) = numeric_extent(
                    values
                        .iter()
                        .filter_map(|value| time_seconds(value, format.as_deref(), spec.precision)),
                );
                let min = spec.min.resolve(observed_min, 0.0);
                let max = spec.max.resolve(observed_max, min);
                let (min, max) = if spec.nice {
                    nice_domain(min, max, DEFAULT_TICK_COUNT)
                } else {
                    (min, max)
                };
                Ok(Self::Time(TimeScale {
                    linear: LinearScale::new(min, max)?.with_range(range.0, range.1),
                    precision: spec.precision,
                    format,
                }))
            }
        }
    }

    /// Pixel position of a value, `None` when the value cannot be placed.
    #[must_use]
    pub fn map(&self, value: &DatumValue) -> Option<f64> {
        let mapped = match self {
            Self::Linear(scale) => value.as_f64().map(|v| scale.map(v)),
            Self::Log(scale) => value.as_f64().and_then(|v| scale.map(v)),
            Self::Point(scale) => scale.map(value),
            Self::Time(scale) => scale.map(value),
        }?;
        mapped.is_finite().then_some(mapped)
    }

    #[must_use]
    pub fn map_number(&self, value: f64) -> Option<f64> {
        self.map(&DatumValue::Number(value))
    }

    /// Numeric domain of continuous scales.
    #[must_use]
    pub fn domain_bounds(&self) -> Option<(f64, f64)> {
        match self {
            Self::Linear(scale) => Some(scale.domain()),
            Self::Log(scale) => Some(scale.domain()),
            Self::Time(scale) => Some(scale.domain()),
            Self::Point(_) => None,
        }
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Linear(scale) => scale.range(),
            Self::Log(scale) => scale.linear.range(),
            Self::Point(scale) => (scale.range_start, scale.range_end),
            Self::Time(scale) => scale.linear.range(),
        }
    }

    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<DatumValue> {
        match self {
            Self::Linear(scale) => scale
                .ticks(count)
                .into_iter()
                .map(DatumValue::Number)
                .collect(),
            Self::Log(scale) => scale.ticks().into_iter().map(DatumValue::Number).collect(),
            Self::Point(scale) => scale.domain(),
            Self::Time(scale) => scale
                .linear
                .ticks(count)
                .into_iter()
                .filter_map(unix_seconds_to_datetime)
                .map(DatumValue::Date)
                .collect(),
        }
    }

    /// Tick values for an axis or grid, honoring an explicit selection.
    #[must_use]
    pub fn tick_values(&self, spec: Option<&TicksSpec>) -> Vec<DatumValue> {
        match spec {
            None => self.ticks(DEFAULT_TICK_COUNT),
            Some(TicksSpec::Count(count)) => self.ticks(*count),
            Some(TicksSpec::Values(values)) => values.clone(),
        }
    }
}

fn numeric_extent(values: impl Iterator<Item = f64>) -> (Option<f64>, Option<f64>) {
    values
        .filter(|value| value.is_finite())
        .fold((None, None), |(min, max), value| {
            (
                Some(min.map_or(value, |current: f64| current.min(value))),
                Some(max.map_or(value, |current: f64| current.max(value))),
            )
        })
}

fn oriented_range(range: (f64, f64), reverse: bool) -> (f64, f64) {
    if reverse { (range.1, range.0) } else { range }
}

#[cfg(test)]
mod tests {
    use super::{LinearScaleSpec, PointScale, Scale, ScaleBound, ScaleSpec};
    use crate::core::DatumValue;

    #[test]
    fn scale_bound_accepts_auto_and_numbers() {
        let bounds: Vec<ScaleBound> = serde_json::from_str(r#"["auto", 12.5]"#).expect("bounds");
        assert_eq!(bounds, vec![ScaleBound::Auto, ScaleBound::Value(12.5)]);
        assert!(serde_json::from_str::<ScaleBound>(r#""max""#).is_err());
    }

    #[test]
    fn point_scale_spreads_distinct_values_in_first_seen_order() {
        let values: Vec<DatumValue> = ["b", "a", "b", "c"]
            .into_iter()
            .map(DatumValue::from)
            .collect();
        let scale = PointScale::new(&values).with_range(0.0, 100.0);
        assert_eq!(scale.len(), 3);
        assert_eq!(scale.map(&DatumValue::from("b")), Some(0.0));
        assert_eq!(scale.map(&DatumValue::from("a")), Some(50.0));
        assert_eq!(scale.map(&DatumValue::from("c")), Some(100.0));
        assert_eq!(scale.map(&DatumValue::from("z")), None);
    }

    #[test]
    fn degenerate_linear_domain_maps_to_range_midpoint() {
        let spec = ScaleSpec::Linear(LinearScaleSpec {
            min: ScaleBound::Auto,
            nice: false,
            ..LinearScaleSpec::default()
        });
        let values = vec![DatumValue::Number(3.0), DatumValue::Number(3.0)];
        let scale = Scale::compute(&spec, &values, (0.0, 200.0)).expect("scale");
        assert_eq!(scale.map_number(3.0), Some(100.0));
    }

    #[test]
    fn log_scale_rejects_domains_crossing_zero() {
        let spec: ScaleSpec =
            serde_json::from_str(r#"{"type": "log", "min": -1, "max": 100}"#).expect("spec");
        assert!(Scale::compute(&spec, &[], (0.0, 100.0)).is_err());
    }
}
