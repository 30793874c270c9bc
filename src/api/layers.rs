use std::fmt;
use std::rc::Rc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Callback, InnerDimensions, LineGenerator, Scale};
use crate::error::ChartResult;
use crate::render::{DrawingSurface, LayerPrimitives, LayerSlot, LayerStack, LineLayerType};

use super::{ComputedSerie, LineCommonProps, LineScene, Point, Slice};

/// Read-only snapshot handed to custom layers.
#[derive(Debug, Clone, Copy)]
pub struct CustomLayerProps<'a> {
    pub inner_width: f64,
    pub inner_height: f64,
    pub series: &'a [ComputedSerie],
    pub points: &'a [Point],
    pub slices: &'a [Slice],
    pub x_scale: &'a Scale,
    pub y_scale: &'a Scale,
    pub line_generator: LineGenerator,
    /// Pixel y of the area baseline.
    pub area_baseline: f64,
    pub current_point: Option<&'a Point>,
    pub current_slice: Option<&'a Slice>,
    pub props: &'a LineCommonProps,
}

impl<'a> CustomLayerProps<'a> {
    pub(crate) fn new(
        scene: &'a LineScene,
        props: &'a LineCommonProps,
        current_point: Option<&'a Point>,
        current_slice: Option<&'a Slice>,
    ) -> Self {
        Self {
            inner_width: scene.inner.width,
            inner_height: scene.inner.height,
            series: &scene.series,
            points: &scene.points,
            slices: &scene.slices,
            x_scale: &scene.x_scale,
            y_scale: &scene.y_scale,
            line_generator: scene.line_generator,
            area_baseline: scene.area_baseline,
            current_point,
            current_slice,
            props,
        }
    }

    #[must_use]
    pub fn inner(&self) -> InnerDimensions {
        InnerDimensions {
            width: self.inner_width,
            height: self.inner_height,
        }
    }
}

/// Custom vector layer: returns what to draw, in inner-area coordinates.
pub type SvgLayerFn = dyn for<'a> Fn(&CustomLayerProps<'a>) -> LayerPrimitives;

/// Custom canvas layer: draws directly on the surface, already translated
/// to the inner area.
pub type CanvasLayerFn =
    dyn for<'a> Fn(&CustomLayerProps<'a>, &mut dyn DrawingSurface) -> ChartResult<()>;

/// One entry of a layer list.
///
/// JSON accepts the built-in layer names only.
pub enum Layer<F: ?Sized> {
    Builtin(LineLayerType),
    Custom(Callback<F>),
}

pub type SvgLayer = Layer<SvgLayerFn>;
pub type CanvasLayer = Layer<CanvasLayerFn>;

impl SvgLayer {
    pub fn custom(draw: impl for<'a> Fn(&CustomLayerProps<'a>) -> LayerPrimitives + 'static) -> Self {
        let draw: Rc<SvgLayerFn> = Rc::new(draw);
        Self::Custom(Callback::from_rc(draw))
    }
}

impl CanvasLayer {
    pub fn custom(
        draw: impl for<'a> Fn(&CustomLayerProps<'a>, &mut dyn DrawingSurface) -> ChartResult<()>
        + 'static,
    ) -> Self {
        let draw: Rc<CanvasLayerFn> = Rc::new(draw);
        Self::Custom(Callback::from_rc(draw))
    }
}

/// Every built-in layer in default paint order.
#[must_use]
pub fn canonical_layers<F: ?Sized>() -> Vec<Layer<F>> {
    LineLayerType::CANONICAL
        .into_iter()
        .map(Layer::Builtin)
        .collect()
}

/// Slots of `layers`; custom layers are keyed by their list position.
#[must_use]
pub fn layer_stack<F: ?Sized>(layers: &[Layer<F>]) -> LayerStack {
    LayerStack::new(
        layers
            .iter()
            .enumerate()
            .map(|(index, layer)| match layer {
                Layer::Builtin(kind) => LayerSlot::Builtin(*kind),
                Layer::Custom(_) => LayerSlot::Custom(index),
            })
            .collect(),
    )
}

impl<F: ?Sized> Clone for Layer<F> {
    fn clone(&self) -> Self {
        match self {
            Self::Builtin(kind) => Self::Builtin(*kind),
            Self::Custom(callback) => Self::Custom(callback.clone()),
        }
    }
}

impl<F: ?Sized> PartialEq for Layer<F> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a == b,
            _ => false,
        }
    }
}

impl<F: ?Sized> fmt::Debug for Layer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(kind) => write!(f, "Builtin({kind})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<F: ?Sized> Serialize for Layer<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Builtin(kind) => serializer.serialize_str(kind.name()),
            Self::Custom(_) => Err(serde::ser::Error::custom(
                "a custom layer cannot be serialized",
            )),
        }
    }
}

impl<'de, F: ?Sized> Deserialize<'de> for Layer<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        LineLayerType::from_name(&name)
            .map(Self::Builtin)
            .ok_or_else(|| D::Error::custom(format!("`{name}` is not a built-in layer")))
    }
}
