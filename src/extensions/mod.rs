//! Optional chart decorations drawn by built-in layers.

pub mod markers;

pub use markers::{
    CartesianMarker, MarkerLegendOrientation, MarkerLegendPosition, MarkerLineStyle, MarkerTheme,
    build_markers,
};
