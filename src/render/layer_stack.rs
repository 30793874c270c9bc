use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in layer of a line chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineLayerType {
    Grid,
    Markers,
    Axes,
    Areas,
    Crosshair,
    Lines,
    Points,
    Slices,
    Mesh,
    Legends,
}

impl LineLayerType {
    /// Default paint order, back to front.
    pub const CANONICAL: [Self; 10] = [
        Self::Grid,
        Self::Markers,
        Self::Axes,
        Self::Areas,
        Self::Crosshair,
        Self::Lines,
        Self::Points,
        Self::Slices,
        Self::Mesh,
        Self::Legends,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Markers => "markers",
            Self::Axes => "axes",
            Self::Areas => "areas",
            Self::Crosshair => "crosshair",
            Self::Lines => "lines",
            Self::Points => "points",
            Self::Slices => "slices",
            Self::Mesh => "mesh",
            Self::Legends => "legends",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::CANONICAL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for LineLayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of one entry of a layer list: a built-in layer, or the custom
/// layer found at `index` in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerSlot {
    Builtin(LineLayerType),
    Custom(usize),
}

/// Ordered layer slots of one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStack {
    pub slots: Vec<LayerSlot>,
}

impl LayerStack {
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            slots: LineLayerType::CANONICAL
                .into_iter()
                .map(LayerSlot::Builtin)
                .collect(),
        }
    }

    #[must_use]
    pub fn new(slots: Vec<LayerSlot>) -> Self {
        Self { slots }
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerSlot, LayerStack, LineLayerType};

    #[test]
    fn canonical_stack_draws_grid_first_and_legends_last() {
        let stack = LayerStack::canonical();
        assert_eq!(stack.slots.len(), 10);
        assert_eq!(stack.slots[0], LayerSlot::Builtin(LineLayerType::Grid));
        assert_eq!(stack.slots[9], LayerSlot::Builtin(LineLayerType::Legends));
    }

    #[test]
    fn layer_names_round_trip() {
        for kind in LineLayerType::CANONICAL {
            assert_eq!(LineLayerType::from_name(kind.name()), Some(kind));
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
        assert_eq!(LineLayerType::from_name("bars"), None);
    }
}
