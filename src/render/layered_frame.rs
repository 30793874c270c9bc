use crate::core::{Dimensions, Margin};

use super::{LayerSlot, LayerStack, Primitive, RenderFrame};

/// Primitives produced by one layer, in inner-area coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerPrimitives {
    pub primitives: Vec<Primitive>,
}

impl LayerPrimitives {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
    }

    #[must_use]
    pub fn with(mut self, primitive: impl Into<Primitive>) -> Self {
        self.push(primitive);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl FromIterator<Primitive> for LayerPrimitives {
    fn from_iter<T: IntoIterator<Item = Primitive>>(iter: T) -> Self {
        Self {
            primitives: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerFrame {
    pub slot: LayerSlot,
    pub content: LayerPrimitives,
}

/// Per-layer scene of one draw pass. Layers keep their list order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredRenderFrame {
    pub dimensions: Dimensions,
    pub margin: Margin,
    pub layers: Vec<LayerFrame>,
}

impl LayeredRenderFrame {
    #[must_use]
    pub fn from_stack(dimensions: Dimensions, margin: Margin, stack: &LayerStack) -> Self {
        let layers = stack
            .slots
            .iter()
            .map(|slot| LayerFrame {
                slot: *slot,
                content: LayerPrimitives::new(),
            })
            .collect();
        Self {
            dimensions,
            margin,
            layers,
        }
    }

    /// Replaces the content of the first layer occupying `slot`.
    pub fn set_layer(&mut self, slot: LayerSlot, content: LayerPrimitives) {
        if let Some(layer) = self.layers.iter_mut().find(|layer| layer.slot == slot) {
            layer.content = content;
        }
    }

    /// Replaces the content of the layer at list position `index`.
    pub fn set_layer_at(&mut self, index: usize, content: LayerPrimitives) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.content = content;
        }
    }

    #[must_use]
    pub fn layer(&self, slot: LayerSlot) -> Option<&LayerPrimitives> {
        self.layers
            .iter()
            .find(|layer| layer.slot == slot)
            .map(|layer| &layer.content)
    }

    #[must_use]
    pub fn slots(&self) -> Vec<LayerSlot> {
        self.layers.iter().map(|layer| layer.slot).collect()
    }

    /// Flattens all layers in order and moves them into outer pixel space.
    #[must_use]
    pub fn flatten(&self) -> RenderFrame {
        self.flatten_layers(|_| true)
    }

    #[must_use]
    pub fn flatten_layers(&self, include: impl Fn(LayerSlot) -> bool) -> RenderFrame {
        let mut frame = RenderFrame::new(self.dimensions);
        for layer in self.layers.iter().filter(|layer| include(layer.slot)) {
            frame.primitives.extend(
                layer
                    .content
                    .primitives
                    .iter()
                    .map(|primitive| primitive.translated(self.margin.left, self.margin.top)),
            );
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerPrimitives, LayeredRenderFrame};
    use crate::core::{Dimensions, Margin};
    use crate::render::{
        Color, LayerSlot, LayerStack, LineLayerType, LinePrimitive, Primitive, TextHAlign,
        TextPrimitive,
    };

    #[test]
    fn layered_render_frame_flattens_in_stack_order_with_margin_offset() {
        let mut layered = LayeredRenderFrame::from_stack(
            Dimensions::new(100, 50),
            Margin::new(5.0, 0.0, 0.0, 10.0),
            &LayerStack::canonical(),
        );

        layered.set_layer(
            LayerSlot::Builtin(LineLayerType::Lines),
            LayerPrimitives::new().with(LinePrimitive::new(
                0.0,
                2.0,
                5.0,
                3.0,
                1.0,
                Color::rgb(0.8, 0.2, 0.2),
            )),
        );
        layered.set_layer(
            LayerSlot::Builtin(LineLayerType::Grid),
            LayerPrimitives::new().with(LinePrimitive::new(
                0.0,
                1.0,
                5.0,
                1.0,
                1.0,
                Color::rgb(0.2, 0.2, 0.2),
            )),
        );
        layered.set_layer(
            LayerSlot::Builtin(LineLayerType::Axes),
            LayerPrimitives::new().with(TextPrimitive::new(
                "x",
                2.0,
                4.0,
                10.0,
                Color::WHITE,
                TextHAlign::Right,
            )),
        );

        let flattened = layered.flatten();
        assert_eq!(flattened.line_count(), 2);
        assert_eq!(flattened.text_count(), 1);
        // Grid comes before axes, axes before lines.
        let Primitive::Line(first) = &flattened.primitives[0] else {
            panic!("grid line expected first");
        };
        assert_eq!((first.x1, first.y1), (10.0, 6.0));
        assert!(matches!(flattened.primitives[1], Primitive::Text(_)));
        assert!(matches!(flattened.primitives[2], Primitive::Line(_)));
    }

    #[test]
    fn repeated_slots_are_filled_by_position() {
        let lines = LayerSlot::Builtin(LineLayerType::Lines);
        let mut layered = LayeredRenderFrame::from_stack(
            Dimensions::new(100, 50),
            Margin::default(),
            &LayerStack::new(vec![lines, LayerSlot::Builtin(LineLayerType::Points), lines]),
        );
        let text = |label: &str| {
            LayerPrimitives::new().with(TextPrimitive::new(
                label,
                0.0,
                0.0,
                10.0,
                Color::WHITE,
                TextHAlign::Left,
            ))
        };
        layered.set_layer_at(0, text("below"));
        layered.set_layer_at(2, text("above"));
        layered.set_layer_at(7, text("ignored"));

        let flattened = layered.flatten();
        let labels: Vec<&str> = flattened
            .primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["below", "above"]);
    }
}
