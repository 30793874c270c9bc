pub mod callback;
pub mod curve;
pub mod format;
pub mod primitives;
pub mod scale;
pub mod series;
pub mod ticks;
pub mod types;

pub use callback::Callback;
pub use curve::{LineCurve, LineGenerator, PathCommand, svg_path_data};
pub use format::{FormatFn, NumberFormat, ValueFormat, format_value};
pub use scale::{
    Axis, LinearScale, LinearScaleSpec, LogScale, LogScaleSpec, PointScale, PointScaleSpec, Scale,
    ScaleBound, ScaleSpec, TimePrecision, TimeScale, TimeScaleSpec,
};
pub use series::{ComputedDatum, Position};
pub use ticks::{DEFAULT_TICK_COUNT, TicksSpec};
pub use types::{Datum, DatumValue, Dimensions, InnerDimensions, Margin, Serie, SerieId};
