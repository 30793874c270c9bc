//! Value formatting for axis ticks, tooltips and point labels.
//!
//! Patterns follow the d3-format mini-language
//! (`[[fill]align][sign][symbol][0][width][,][.precision][~][type]`) for
//! numbers and `time:<strftime>` for dates.

use std::fmt::Write as _;
use std::rc::Rc;

use chrono::format::{Item, StrftimeItems};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::callback::Callback;
use crate::core::primitives::unix_seconds_to_datetime;
use crate::core::DatumValue;
use crate::error::{ChartError, ChartResult};

pub type FormatFn = dyn Fn(&DatumValue) -> String;

const TIME_PREFIX: &str = "time:";
const MAX_PRECISION: usize = 20;
const MAX_WIDTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignMode {
    NegativeOnly,
    Always,
    Space,
    Parentheses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberKind {
    Fixed,
    Integer,
    Percent,
    Exponent,
    SiPrefix,
    Shortest,
}

/// Parsed numeric pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pattern: String,
    fill: char,
    align: Align,
    sign: SignMode,
    currency: bool,
    width: usize,
    grouping: bool,
    precision: Option<usize>,
    trim: bool,
    kind: NumberKind,
}

impl NumberFormat {
    pub fn parse(pattern: &str) -> ChartResult<Self> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut format = Self {
            pattern: pattern.to_owned(),
            fill: ' ',
            align: Align::Right,
            sign: SignMode::NegativeOnly,
            currency: false,
            width: 0,
            grouping: false,
            precision: None,
            trim: false,
            kind: NumberKind::Shortest,
        };
        let mut i = 0;

        if chars.len() >= 2 && align_of(chars[1]).is_some() {
            format.fill = chars[0];
            format.align = align_of(chars[1]).unwrap_or(Align::Right);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(align_of) {
            format.align = align;
            i = 1;
        }

        if let Some(sign) = chars.get(i).and_then(|c| match c {
            '-' => Some(SignMode::NegativeOnly),
            '+' => Some(SignMode::Always),
            ' ' => Some(SignMode::Space),
            '(' => Some(SignMode::Parentheses),
            _ => None,
        }) {
            format.sign = sign;
            i += 1;
        }

        if chars.get(i) == Some(&'$') {
            format.currency = true;
            i += 1;
        }

        if chars.get(i) == Some(&'0') {
            format.fill = '0';
            format.align = Align::AfterSign;
            i += 1;
        }

        let width_start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i > width_start {
            format.width = digits_to_usize(&chars[width_start..i], pattern)?;
            if format.width > MAX_WIDTH {
                return Err(invalid_pattern(
                    pattern,
                    &format!("width must be at most {MAX_WIDTH}"),
                ));
            }
        }

        if chars.get(i) == Some(&',') {
            format.grouping = true;
            i += 1;
        }

        if chars.get(i) == Some(&'.') {
            i += 1;
            let precision_start = i;
            while chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
            if i == precision_start {
                return Err(invalid_pattern(pattern, "precision requires digits after `.`"));
            }
            format.precision = Some(digits_to_usize(&chars[precision_start..i], pattern)?);
        }

        if chars.get(i) == Some(&'~') {
            format.trim = true;
            i += 1;
        }

        if let Some(kind) = chars.get(i) {
            format.kind = match kind {
                'f' => NumberKind::Fixed,
                'd' => NumberKind::Integer,
                '%' => NumberKind::Percent,
                'e' => NumberKind::Exponent,
                's' => NumberKind::SiPrefix,
                other => {
                    return Err(invalid_pattern(
                        pattern,
                        &format!("unsupported format type `{other}`"),
                    ));
                }
            };
            i += 1;
        }

        if i != chars.len() {
            return Err(invalid_pattern(pattern, "unexpected trailing characters"));
        }
        if let Some(precision) = format.precision {
            // Significant-digit kinds count from 1, fixed-point kinds from 0.
            let (min, max) = match format.kind {
                NumberKind::SiPrefix | NumberKind::Shortest => (1, MAX_PRECISION + 1),
                _ => (0, MAX_PRECISION),
            };
            if !(min..=max).contains(&precision) {
                return Err(invalid_pattern(
                    pattern,
                    &format!("precision must be within {min}..={max}"),
                ));
            }
        }
        Ok(format)
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }

        let magnitude = value.abs();
        let (mut body, suffix) = match self.kind {
            NumberKind::Fixed => (format!("{magnitude:.*}", self.precision.unwrap_or(6)), String::new()),
            NumberKind::Integer => (format!("{}", magnitude.round()), String::new()),
            NumberKind::Percent => (
                format!("{:.*}", self.precision.unwrap_or(6), magnitude * 100.0),
                "%".to_owned(),
            ),
            NumberKind::Exponent => (format_exponent(magnitude, self.precision.unwrap_or(6)), String::new()),
            NumberKind::SiPrefix => format_si(magnitude, self.precision.unwrap_or(6)),
            NumberKind::Shortest => match self.precision {
                Some(precision) => (format_significant(magnitude, precision.max(1)), String::new()),
                None => (format!("{magnitude}"), String::new()),
            },
        };

        if self.trim || (self.kind == NumberKind::Shortest && self.precision.is_some()) {
            body = trim_fraction(&body);
        }
        if self.grouping {
            body = group_thousands(&body);
        }
        let negative = value < 0.0 && body.chars().any(|c| ('1'..='9').contains(&c));

        let (sign_prefix, sign_suffix) = match (self.sign, negative) {
            (SignMode::Parentheses, true) => ("(", ")"),
            (_, true) => ("-", ""),
            (SignMode::Always, false) => ("+", ""),
            (SignMode::Space, false) => (" ", ""),
            _ => ("", ""),
        };
        let prefix = format!("{sign_prefix}{}", if self.currency { "$" } else { "" });
        let suffix = format!("{suffix}{sign_suffix}");

        let length = prefix.chars().count() + body.chars().count() + suffix.chars().count();
        let padding = self.width.saturating_sub(length);
        let pad = |count: usize| std::iter::repeat_n(self.fill, count).collect::<String>();
        match self.align {
            Align::Left => format!("{prefix}{body}{suffix}{}", pad(padding)),
            Align::Right => format!("{}{prefix}{body}{suffix}", pad(padding)),
            Align::Center => {
                let left = padding / 2;
                format!("{}{prefix}{body}{suffix}{}", pad(left), pad(padding - left))
            }
            Align::AfterSign => format!("{prefix}{}{body}{suffix}", pad(padding)),
        }
    }
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

fn digits_to_usize(digits: &[char], pattern: &str) -> ChartResult<usize> {
    digits
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| invalid_pattern(pattern, "numeric field is out of range"))
}

fn invalid_pattern(pattern: &str, reason: &str) -> ChartError {
    ChartError::config("format", format!("invalid format `{pattern}`: {reason}"))
}

fn format_exponent(magnitude: f64, precision: usize) -> String {
    let raw = format!("{magnitude:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => raw,
    }
}

fn format_significant(magnitude: f64, digits: usize) -> String {
    if magnitude == 0.0 {
        return format!("{:.*}", digits.saturating_sub(1), 0.0);
    }
    let exponent = magnitude.log10().floor() as i64;
    let decimals = (digits as i64 - 1 - exponent).max(0) as usize;
    format!("{magnitude:.decimals$}")
}

fn format_si(magnitude: f64, digits: usize) -> (String, String) {
    const PREFIXES: [&str; 17] = [
        "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
    ];
    if magnitude == 0.0 {
        return (format_significant(0.0, digits), String::new());
    }
    let exponent = ((magnitude.log10() / 3.0).floor() as i64).clamp(-8, 8);
    let scaled = magnitude / 10f64.powi((exponent * 3) as i32);
    let prefix = PREFIXES[(exponent + 8) as usize];
    (format_significant(scaled, digits.max(1)), prefix.to_owned())
}

fn trim_fraction(body: &str) -> String {
    let (number, exponent) = match body.find('e') {
        Some(index) => body.split_at(index),
        None => (body, ""),
    };
    if !number.contains('.') {
        return body.to_owned();
    }
    let trimmed = number.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}{exponent}")
}

fn group_thousands(body: &str) -> String {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (integer, rest) = body.split_at(split);
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push_str(rest);
    grouped
}

/// Formatter applied to x/y values before display.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueFormat {
    Number(NumberFormat),
    Time(String),
    Custom(Callback<FormatFn>),
}

impl ValueFormat {
    /// Parses a d3-style number pattern or a `time:`-prefixed strftime pattern.
    pub fn parse(pattern: &str) -> ChartResult<Self> {
        if let Some(time_pattern) = pattern.strip_prefix(TIME_PREFIX) {
            if StrftimeItems::new(time_pattern).any(|item| matches!(item, Item::Error)) {
                return Err(invalid_pattern(pattern, "invalid strftime pattern"));
            }
            return Ok(Self::Time(time_pattern.to_owned()));
        }
        NumberFormat::parse(pattern).map(Self::Number)
    }

    #[must_use]
    pub fn custom(format: impl Fn(&DatumValue) -> String + 'static) -> Self {
        let format: Rc<FormatFn> = Rc::new(format);
        Self::Custom(Callback::from_rc(format))
    }

    #[must_use]
    pub fn format(&self, value: &DatumValue) -> String {
        match self {
            Self::Number(format) => match value {
                DatumValue::Number(number) => format.format(*number),
                other => other.to_string(),
            },
            Self::Time(pattern) => {
                let time = match value {
                    DatumValue::Date(time) => Some(*time),
                    DatumValue::Number(seconds) => unix_seconds_to_datetime(*seconds),
                    DatumValue::Text(_) => None,
                };
                match time {
                    Some(time) => {
                        let mut out = String::new();
                        // Pattern validity is checked when the format is parsed.
                        let _ = write!(out, "{}", time.format(pattern));
                        out
                    }
                    None => value.to_string(),
                }
            }
            Self::Custom(format) => format(value),
        }
    }
}

/// Formats a value with an optional formatter, falling back to its display form.
#[must_use]
pub fn format_value(format: Option<&ValueFormat>, value: &DatumValue) -> String {
    match format {
        Some(format) => format.format(value),
        None => value.to_string(),
    }
}

impl Serialize for ValueFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(format) => serializer.serialize_str(format.pattern()),
            Self::Time(pattern) => serializer.serialize_str(&format!("{TIME_PREFIX}{pattern}")),
            Self::Custom(_) => Err(S::Error::custom("custom formatters cannot be serialized")),
        }
    }
}

impl<'de> Deserialize<'de> for ValueFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::parse(&pattern).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::ValueFormat;
    use crate::core::DatumValue;

    fn fmt(pattern: &str, value: f64) -> String {
        ValueFormat::parse(pattern)
            .expect("valid pattern")
            .format(&DatumValue::Number(value))
    }

    #[test]
    fn fixed_and_grouped_numbers() {
        assert_eq!(fmt(".2f", 3.14159), "3.14");
        assert_eq!(fmt(",d", 1_234_567.4), "1,234,567");
        assert_eq!(fmt(",.2f", -9876.5), "-9,876.50");
        assert_eq!(fmt(">-.2f", 5.0), "5.00");
    }

    #[test]
    fn percent_sign_and_currency() {
        assert_eq!(fmt(".1%", 0.256), "25.6%");
        assert_eq!(fmt("+.0f", 4.0), "+4");
        assert_eq!(fmt("$,.2f", 1500.0), "$1,500.00");
        assert_eq!(fmt("(.1f", -2.0), "(2.0)");
    }

    #[test]
    fn width_alignment_and_trim() {
        assert_eq!(fmt("08.2f", 3.5), "00003.50");
        assert_eq!(fmt("^7d", 42.0), "  42   ");
        assert_eq!(fmt(".3~f", 2.5), "2.5");
        assert_eq!(fmt(".2e", 12_345.0), "1.23e+4");
        assert_eq!(fmt(".3~s", 1_500.0), "1.5k");
    }

    #[test]
    fn time_patterns_format_dates() {
        let format = ValueFormat::parse("time:%Y-%m-%d").expect("time pattern");
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).single().expect("date");
        assert_eq!(format.format(&DatumValue::Date(date)), "2024-03-09");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(ValueFormat::parse(".q").is_err());
        assert!(ValueFormat::parse(".f").is_err());
        assert!(ValueFormat::parse("time:%Q").is_err());
    }

    #[test]
    fn precision_and_width_are_bounded() {
        assert!(ValueFormat::parse(".70000f").is_err());
        assert!(ValueFormat::parse(".21f").is_err());
        assert!(ValueFormat::parse(".0s").is_err());
        assert!(ValueFormat::parse("99999d").is_err());
        assert_eq!(fmt(".20f", 0.5).len(), 22);
        assert_eq!(fmt(".21", 1.0), "1");
    }
}
