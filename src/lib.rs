//! line-chart-rs: responsive line charts with typed prop contracts.
//!
//! A chart is configured through a partial prop table resolved against
//! documented defaults, computed into a [`api::LineScene`] and drawn layer by
//! layer either as a vector frame ([`api::Line`]) or on a canvas surface
//! ([`api::LineCanvas`]). The responsive adapters re-render whenever their
//! container reports a new size.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{
    Line, LineCanvas, LineCanvasConfig, LineSvgConfig, PartialLineCanvasConfig,
    PartialLineSvgConfig, ResponsiveLine, ResponsiveLineCanvas,
};
pub use error::{ChartError, ChartResult};
