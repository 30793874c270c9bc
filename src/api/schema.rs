//! Declarative configuration tables.
//!
//! One table lists every field with its type, default, JSON name and whether
//! it can come from JSON (`data`) or only from Rust (`code`). From it
//! [`config_table!`] generates the resolved struct, an all-optional partial
//! twin, the total `resolve` function and per-field JSON loading.

use std::fmt;

use tracing::warn;

/// What went wrong with one configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The value does not have the declared shape.
    InvalidShape(String),
    /// The field is not part of the contract.
    UnknownField,
    /// The field holds a function and cannot be set from JSON.
    CodeOnlyField,
    /// A required field is absent.
    MissingRequired,
    /// The value has the right shape but is outside the accepted range.
    OutOfRange(String),
    EmptySeriesId,
    DuplicateSeriesId,
    EmptySeries,
}

/// Development-time report about one malformed field.
///
/// Diagnostics never abort a render: the offending field falls back to its
/// default (or the offending series is skipped) and the diagnostic is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    pub field: String,
    pub kind: DiagnosticKind,
}

impl ConfigDiagnostic {
    #[must_use]
    pub fn new(field: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    #[must_use]
    pub fn invalid_shape(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(field, DiagnosticKind::InvalidShape(reason.into()))
    }

    #[must_use]
    pub fn out_of_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(field, DiagnosticKind::OutOfRange(reason.into()))
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::InvalidShape(reason) => {
                write!(f, "`{}` has an invalid shape: {reason}", self.field)
            }
            DiagnosticKind::UnknownField => write!(f, "`{}` is not a known field", self.field),
            DiagnosticKind::CodeOnlyField => {
                write!(f, "`{}` takes a function and can only be set in code", self.field)
            }
            DiagnosticKind::MissingRequired => write!(f, "`{}` is required", self.field),
            DiagnosticKind::OutOfRange(reason) => {
                write!(f, "`{}` is out of range: {reason}", self.field)
            }
            DiagnosticKind::EmptySeriesId => write!(f, "`{}` has an empty series id", self.field),
            DiagnosticKind::DuplicateSeriesId => {
                write!(f, "`{}` repeats a series id", self.field)
            }
            DiagnosticKind::EmptySeries => write!(f, "`{}` has no data points", self.field),
        }
    }
}

/// Logs every diagnostic as a warning.
pub fn log_diagnostics(diagnostics: &[ConfigDiagnostic]) {
    for diagnostic in diagnostics {
        warn!(field = %diagnostic.field, "{diagnostic}");
    }
}

/// A partial configuration loaded from JSON, with what was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonConfig<P> {
    pub partial: P,
    pub diagnostics: Vec<ConfigDiagnostic>,
}

/// Checks a numeric field against `accept`, resetting it to `default` and
/// recording a diagnostic when rejected.
pub(crate) fn check_range(
    value: &mut f64,
    default: f64,
    field: &str,
    requirement: &str,
    accept: impl Fn(f64) -> bool,
    diagnostics: &mut Vec<ConfigDiagnostic>,
) {
    if !value.is_finite() || !accept(*value) {
        diagnostics.push(ConfigDiagnostic::out_of_range(
            field,
            format!("{value} must be {requirement}"),
        ));
        *value = default;
    }
}

macro_rules! config_table {
    (
        $(#[$meta:meta])*
        pub struct $name:ident / $partial:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty = $default:expr => $json:literal as $kind:ident,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        #[doc = concat!(
            "All-optional form of [`", stringify!($name), "`]; unset fields resolve to defaults."
        )]
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $partial {
            $(pub $field: Option<$ty>,)*
        }

        impl $partial {
            /// JSON names of the fields of this table.
            pub const FIELDS: &'static [&'static str] = &[$($json),*];

            /// Fills every unset field with its declared default.
            #[must_use]
            pub fn resolve(self) -> $name {
                $name {
                    $($field: self.$field.unwrap_or_else(|| $default),)*
                }
            }

            /// Fields set in `overrides` replace the fields set here.
            #[must_use]
            pub fn merge(self, overrides: Self) -> Self {
                Self {
                    $($field: overrides.$field.or(self.$field),)*
                }
            }

            /// Applies one JSON entry; returns `false` when `key` is not a
            /// field of this table.
            pub(crate) fn apply_json_field(
                &mut self,
                key: &str,
                value: serde_json::Value,
                diagnostics: &mut Vec<$crate::api::ConfigDiagnostic>,
            ) -> bool {
                match key {
                    $(
                        $json => {
                            $crate::api::schema::config_field_from_json!(
                                $kind, self.$field, $json, value, diagnostics
                            );
                            true
                        }
                    )*
                    _ => false,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $partial::default().resolve()
            }
        }

        impl From<$name> for $partial {
            fn from(resolved: $name) -> Self {
                Self {
                    $($field: Some(resolved.$field),)*
                }
            }
        }
    };
}

macro_rules! config_field_from_json {
    (data, $target:expr, $json:literal, $value:ident, $diagnostics:ident) => {
        match serde_json::from_value($value) {
            Ok(parsed) => $target = Some(parsed),
            Err(err) => $diagnostics.push($crate::api::ConfigDiagnostic::invalid_shape(
                $json,
                err.to_string(),
            )),
        }
    };
    (code, $target:expr, $json:literal, $value:ident, $diagnostics:ident) => {{
        drop($value);
        $diagnostics.push($crate::api::ConfigDiagnostic::new(
            $json,
            $crate::api::DiagnosticKind::CodeOnlyField,
        ));
    }};
}

pub(crate) use config_field_from_json;
pub(crate) use config_table;
