use crate::core::Dimensions;
use crate::error::{ChartError, ChartResult};
use crate::render::Primitive;

/// Backend-agnostic scene for one chart draw pass, in outer pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub dimensions: Dimensions,
    pub primitives: Vec<Primitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            primitives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_primitive(mut self, primitive: impl Into<Primitive>) -> Self {
        self.primitives.push(primitive.into());
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.dimensions.is_valid() {
            return Err(ChartError::InvalidDimensions {
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }

        for primitive in &self.primitives {
            primitive.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.count(|primitive| matches!(primitive, Primitive::Line(_)))
    }

    #[must_use]
    pub fn text_count(&self) -> usize {
        self.count(|primitive| matches!(primitive, Primitive::Text(_)))
    }

    #[must_use]
    pub fn path_count(&self) -> usize {
        self.count(|primitive| matches!(primitive, Primitive::Path(_)))
    }

    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.count(|primitive| matches!(primitive, Primitive::Circle(_)))
    }

    fn count(&self, predicate: impl Fn(&Primitive) -> bool) -> usize {
        self.primitives.iter().filter(|primitive| predicate(primitive)).count()
    }
}
